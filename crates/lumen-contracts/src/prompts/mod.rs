mod templates;

use serde::{Deserialize, Serialize};

use templates::{CONTEXT_SLOT, ENHANCED_TEMPLATE, STANDARD_TEMPLATE, SYSTEM_INSTRUCTIONS};

pub const NO_CONTEXT_PLACEHOLDER: &str = "No context provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    Standard,
    Enhanced,
}

impl PromptKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PromptKind::Standard => "standard",
            PromptKind::Enhanced => "enhanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub kind: PromptKind,
    text: String,
}

impl PromptTemplate {
    /// Templates must carry exactly one `{context}` slot.
    pub fn new(kind: PromptKind, text: impl Into<String>) -> Result<Self, String> {
        let text = text.into();
        let slots = text.matches(CONTEXT_SLOT).count();
        if slots != 1 {
            return Err(format!(
                "{} template must contain exactly one {CONTEXT_SLOT} slot, found {slots}",
                kind.as_str()
            ));
        }
        Ok(Self { kind, text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn render(&self, context: &str) -> String {
        self.text.replacen(CONTEXT_SLOT, effective_context(context), 1)
    }
}

/// Immutable set of prompts handed to the review engine: one template per
/// tier plus the system instruction sent alongside every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBook {
    system_instructions: String,
    standard: PromptTemplate,
    enhanced: PromptTemplate,
}

impl PromptBook {
    pub fn new(
        system_instructions: impl Into<String>,
        standard: PromptTemplate,
        enhanced: PromptTemplate,
    ) -> Result<Self, String> {
        if standard.kind != PromptKind::Standard || enhanced.kind != PromptKind::Enhanced {
            return Err("prompt book templates are assigned to the wrong tiers".to_string());
        }
        Ok(Self {
            system_instructions: system_instructions.into(),
            standard,
            enhanced,
        })
    }

    pub fn system_instructions(&self) -> &str {
        &self.system_instructions
    }

    pub fn template(&self, kind: PromptKind) -> &PromptTemplate {
        match kind {
            PromptKind::Standard => &self.standard,
            PromptKind::Enhanced => &self.enhanced,
        }
    }

    pub fn build(&self, kind: PromptKind, context: &str) -> String {
        self.template(kind).render(context)
    }
}

impl Default for PromptBook {
    fn default() -> Self {
        Self {
            system_instructions: SYSTEM_INSTRUCTIONS.to_string(),
            standard: PromptTemplate {
                kind: PromptKind::Standard,
                text: STANDARD_TEMPLATE.to_string(),
            },
            enhanced: PromptTemplate {
                kind: PromptKind::Enhanced,
                text: ENHANCED_TEMPLATE.to_string(),
            },
        }
    }
}

pub fn effective_context(context: &str) -> &str {
    let trimmed = context.trim();
    if trimmed.is_empty() {
        NO_CONTEXT_PLACEHOLDER
    } else {
        trimmed
    }
}
