mod cleanup;
mod sections;
mod structured;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::review::{CleanedReview, ReviewResult, ReviewStatus};

pub use cleanup::{clean_review, FALLBACK_HEADER};
pub use sections::{
    classify_header, strip_list_marker, HeaderRule, Section, HEADER_RULES, LIST_MARKERS,
};
pub use structured::extract_sections;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMode {
    #[default]
    Cleanup,
    Structured,
}

impl NormalizeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            NormalizeMode::Cleanup => "cleanup",
            NormalizeMode::Structured => "structured",
        }
    }
}

impl fmt::Display for NormalizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalizeMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cleanup" | "clean" => Ok(NormalizeMode::Cleanup),
            "structured" | "extract" => Ok(NormalizeMode::Structured),
            other => Err(format!(
                "unknown normalize mode '{other}' (expected cleanup or structured)"
            )),
        }
    }
}

/// Turns raw model text into the payload returned to callers.
pub trait Normalizer: Send + Sync {
    fn mode(&self) -> NormalizeMode;
    fn normalize(&self, raw: &str, is_premium: bool) -> ReviewResult;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CleanupNormalizer;

impl Normalizer for CleanupNormalizer {
    fn mode(&self) -> NormalizeMode {
        NormalizeMode::Cleanup
    }

    fn normalize(&self, raw: &str, is_premium: bool) -> ReviewResult {
        ReviewResult::Cleaned(CleanedReview {
            review_content: clean_review(raw),
            is_premium,
            status: ReviewStatus::Success,
        })
    }
}

#[derive(Debug, Clone)]
pub struct StructuredNormalizer {
    rules: Vec<HeaderRule>,
    markers: Vec<&'static str>,
}

impl StructuredNormalizer {
    pub fn new(rules: Vec<HeaderRule>, markers: Vec<&'static str>) -> Self {
        Self { rules, markers }
    }
}

impl Default for StructuredNormalizer {
    fn default() -> Self {
        Self::new(HEADER_RULES.to_vec(), LIST_MARKERS.to_vec())
    }
}

impl Normalizer for StructuredNormalizer {
    fn mode(&self) -> NormalizeMode {
        NormalizeMode::Structured
    }

    fn normalize(&self, raw: &str, is_premium: bool) -> ReviewResult {
        ReviewResult::Structured(extract_sections(
            raw,
            &self.rules,
            &self.markers,
            is_premium,
        ))
    }
}

pub fn normalizer_for(mode: NormalizeMode) -> Box<dyn Normalizer> {
    match mode {
        NormalizeMode::Cleanup => Box::new(CleanupNormalizer),
        NormalizeMode::Structured => Box::new(StructuredNormalizer::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "**Overview:**\nA travel booking form.\n\n## Strengths\n- Short form\n- Clear labels\n";

    #[test]
    fn mode_parses_from_config_strings() {
        assert_eq!(
            "Structured".parse::<NormalizeMode>(),
            Ok(NormalizeMode::Structured)
        );
        assert_eq!(
            " cleanup ".parse::<NormalizeMode>(),
            Ok(NormalizeMode::Cleanup)
        );
        assert!("markdown".parse::<NormalizeMode>().is_err());
        assert_eq!(NormalizeMode::default(), NormalizeMode::Cleanup);
    }

    #[test]
    fn cleanup_normalizer_wraps_cleaned_text() {
        let result = normalizer_for(NormalizeMode::Cleanup).normalize(RAW, true);
        let ReviewResult::Cleaned(review) = result else {
            panic!("expected cleaned review");
        };
        assert_eq!(
            review.review_content,
            "# Overview\nOverview:\nA travel booking form.\n\n# Strengths\n• Short form\n• Clear labels"
        );
        assert!(review.is_premium);
        assert_eq!(review.status, ReviewStatus::Success);
    }

    #[test]
    fn structured_normalizer_splits_sections() {
        let normalizer = normalizer_for(NormalizeMode::Structured);
        assert_eq!(normalizer.mode(), NormalizeMode::Structured);
        let ReviewResult::Structured(review) = normalizer.normalize(RAW, false) else {
            panic!("expected structured review");
        };
        assert_eq!(review.overview, "A travel booking form.");
        assert_eq!(review.strengths, vec!["Short form", "Clear labels"]);
        assert!(!review.is_premium);
    }
}
