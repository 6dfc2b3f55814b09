use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use lumen_contracts::normalize::NormalizeMode;
use lumen_contracts::prompts::PromptBook;

pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_REVIEW_MODEL: &str = "gpt-4o";
pub const DEFAULT_BUYMEACOFFEE_API_BASE: &str = "https://developers.buymeacoffee.com/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Process settings, read once from the environment. CLI flags are applied
/// on top by the caller before the engine is built.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    pub review_model: String,
    pub normalize_mode: NormalizeMode,
    pub request_timeout: Duration,
    pub buymeacoffee_token: Option<String>,
    pub buymeacoffee_api_base: String,
    pub dryrun: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            review_model: DEFAULT_REVIEW_MODEL.to_string(),
            normalize_mode: NormalizeMode::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            buymeacoffee_token: None,
            buymeacoffee_api_base: DEFAULT_BUYMEACOFFEE_API_BASE.to_string(),
            dryrun: false,
        }
    }
}

impl EngineSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |keys: &[&str]| first_non_empty(&lookup, keys);
        let defaults = Self::default();

        let normalize_mode = match get(&["LUMEN_NORMALIZE_MODE"]) {
            Some(raw) => raw
                .parse::<NormalizeMode>()
                .map_err(|err| anyhow!(err))
                .context("invalid LUMEN_NORMALIZE_MODE")?,
            None => defaults.normalize_mode,
        };
        let request_timeout = match get(&["LUMEN_REQUEST_TIMEOUT_SECS"]) {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .with_context(|| format!("invalid LUMEN_REQUEST_TIMEOUT_SECS '{raw}'"))?,
            ),
            None => defaults.request_timeout,
        };

        Ok(Self {
            openai_api_key: get(&["OPENAI_API_KEY", "OPENAI_API_KEY_BACKUP"]),
            openai_api_base: get(&["OPENAI_API_BASE", "OPENAI_BASE_URL"])
                .unwrap_or(defaults.openai_api_base),
            review_model: get(&["LUMEN_REVIEW_MODEL"]).unwrap_or(defaults.review_model),
            normalize_mode,
            request_timeout,
            buymeacoffee_token: get(&["BUYMEACOFFEE_TOKEN"]),
            buymeacoffee_api_base: get(&["BUYMEACOFFEE_API_BASE"])
                .unwrap_or(defaults.buymeacoffee_api_base),
            dryrun: false,
        })
    }
}

fn first_non_empty<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter().find_map(|key| {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Immutable per-engine review configuration.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    pub prompts: PromptBook,
    pub mode: NormalizeMode,
    pub model: String,
}

impl ReviewConfig {
    pub fn new(mode: NormalizeMode, model: impl Into<String>) -> Self {
        Self {
            prompts: PromptBook::default(),
            mode,
            model: model.into(),
        }
    }
}
