use indexmap::IndexMap;

pub const VISION: &str = "vision";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub provider: String,
    pub capabilities: Vec<String>,
    pub context_window: Option<u64>,
}

impl ModelSpec {
    pub fn new(
        name: &str,
        provider: &str,
        capabilities: &[&str],
        context_window: Option<u64>,
    ) -> Self {
        Self {
            name: name.to_string(),
            provider: provider.to_string(),
            capabilities: capabilities
                .iter()
                .map(|item| (*item).to_string())
                .collect(),
            context_window,
        }
    }

    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|item| item == capability)
    }
}

/// Known models in preference order; the first vision model is the default.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSpec>,
}

impl ModelRegistry {
    pub fn new(models: Option<IndexMap<String, ModelSpec>>) -> Self {
        Self {
            models: models.unwrap_or_else(default_models),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name)
    }

    pub fn list(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.values()
    }

    pub fn by_capability(&self, capability: &str) -> Vec<ModelSpec> {
        self.models
            .values()
            .filter(|model| model.supports(capability))
            .cloned()
            .collect()
    }

    pub fn ensure(&self, name: &str, capability: &str) -> Option<ModelSpec> {
        let model = self.get(name)?;
        if model.supports(capability) {
            return Some(model.clone());
        }
        None
    }
}

fn default_models() -> IndexMap<String, ModelSpec> {
    [
        ModelSpec::new("gpt-4o", "openai", &["text", VISION], Some(128000)),
        ModelSpec::new("gpt-4o-mini", "openai", &["text", VISION], Some(128000)),
        ModelSpec::new("gpt-4.1", "openai", &["text", VISION], Some(1047576)),
        ModelSpec::new("gpt-3.5-turbo", "openai", &["text"], Some(16385)),
        ModelSpec::new("dryrun-vision", "dryrun", &[VISION], None),
    ]
    .into_iter()
    .map(|spec| (spec.name.clone(), spec))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_prefers_gpt_4o_for_vision() {
        let registry = ModelRegistry::new(None);
        let vision = registry.by_capability(VISION);
        assert_eq!(vision.first().map(|spec| spec.name.as_str()), Some("gpt-4o"));
        assert!(vision.iter().all(|spec| spec.supports(VISION)));
    }

    #[test]
    fn ensure_checks_capability() {
        let registry = ModelRegistry::new(None);
        assert!(registry.ensure("gpt-4o-mini", VISION).is_some());
        assert!(registry.ensure("gpt-3.5-turbo", VISION).is_none());
        assert!(registry.ensure("missing", VISION).is_none());
        assert_eq!(
            registry.get("dryrun-vision").map(|spec| spec.provider.as_str()),
            Some("dryrun")
        );
    }
}
