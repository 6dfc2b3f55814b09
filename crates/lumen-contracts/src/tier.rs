use serde::{Deserialize, Serialize};

use crate::prompts::PromptKind;

pub const SUPPORTER_DAILY_QUOTA: u32 = 15;
pub const FREE_DAILY_QUOTA: u32 = 5;
pub const SUPPORT_URL: &str = "https://www.buymeacoffee.com/pranaysuyash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Premium,
}

impl Tier {
    pub fn from_supporter(is_supporter: bool) -> Self {
        if is_supporter {
            Tier::Premium
        } else {
            Tier::Free
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Premium => "premium",
        }
    }
}

/// Result of a supporter lookup. Only `is_supporter` drives the pipeline; the
/// remaining fields are reported back to the caller as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupporterStatus {
    pub is_supporter: bool,
    pub tier: Tier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_support_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_support: Option<f64>,
}

impl SupporterStatus {
    pub fn free() -> Self {
        Self {
            is_supporter: false,
            tier: Tier::Free,
            last_support_date: None,
            total_support: None,
        }
    }

    pub fn premium(last_support_date: impl Into<String>, total_support: f64) -> Self {
        Self {
            is_supporter: true,
            tier: Tier::Premium,
            last_support_date: Some(last_support_date.into()),
            total_support: Some(total_support),
        }
    }
}

impl Default for SupporterStatus {
    fn default() -> Self {
        Self::free()
    }
}

/// Nominal usage report. Requests are not counted, so `requests_used` is
/// always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateInfo {
    pub requests_used: u32,
    pub requests_limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPolicy {
    pub tier: Tier,
    pub prompt: PromptKind,
    pub quota: u32,
}

impl TierPolicy {
    pub fn for_supporter(is_supporter: bool) -> Self {
        let tier = Tier::from_supporter(is_supporter);
        match tier {
            Tier::Premium => Self {
                tier,
                prompt: PromptKind::Enhanced,
                quota: SUPPORTER_DAILY_QUOTA,
            },
            Tier::Free => Self {
                tier,
                prompt: PromptKind::Standard,
                quota: FREE_DAILY_QUOTA,
            },
        }
    }

    pub fn is_premium(&self) -> bool {
        self.tier == Tier::Premium
    }

    pub fn rate_info(&self) -> RateInfo {
        RateInfo {
            requests_used: 0,
            requests_limit: self.quota,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierFeatures {
    pub reviews_per_day: u32,
    pub features: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureCatalog {
    pub premium: TierFeatures,
    pub free: TierFeatures,
}

pub fn premium_features() -> FeatureCatalog {
    FeatureCatalog {
        premium: TierFeatures {
            reviews_per_day: SUPPORTER_DAILY_QUOTA,
            features: vec![
                "Detailed design analysis",
                "Implementation recommendations",
                "Technical considerations",
                "Export reviews as PDF",
                "Priority support",
            ],
        },
        free: TierFeatures {
            reviews_per_day: FREE_DAILY_QUOTA,
            features: vec![
                "Basic design feedback",
                "Core UX/UI analysis",
                "Simple recommendations",
            ],
        },
    }
}
