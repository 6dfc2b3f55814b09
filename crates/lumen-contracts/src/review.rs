use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tier::RateInfo;

pub const MAX_CONTEXT_CHARS: usize = 500;
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
pub const GENERATION_FAILED: &str = "Failed to generate review";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestRejection {
    #[error("No file provided")]
    EmptyImage,
    #[error("Invalid file type. Supported formats: PNG, JPG, JPEG")]
    UnsupportedFileType,
    #[error("File size exceeds 5MB limit")]
    ImageTooLarge { bytes: usize },
    #[error("Context must be less than 500 characters")]
    ContextTooLong { chars: usize },
}

pub fn is_allowed_image_name(file_name: &str) -> bool {
    let Some((_, ext)) = file_name.rsplit_once('.') else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// One review call. The context is stored trimmed; an empty context is kept
/// empty here and replaced by the placeholder at prompt build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    image: Vec<u8>,
    context: String,
    is_supporter: bool,
}

impl ReviewRequest {
    pub fn new(
        image: Vec<u8>,
        context: &str,
        is_supporter: bool,
    ) -> Result<Self, RequestRejection> {
        if image.is_empty() {
            return Err(RequestRejection::EmptyImage);
        }
        if image.len() > MAX_IMAGE_BYTES {
            return Err(RequestRejection::ImageTooLarge { bytes: image.len() });
        }
        let context = context.trim();
        let chars = context.chars().count();
        if chars > MAX_CONTEXT_CHARS {
            return Err(RequestRejection::ContextTooLong { chars });
        }
        Ok(Self {
            image,
            context: context.to_string(),
            is_supporter,
        })
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn is_supporter(&self) -> bool {
        self.is_supporter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedReview {
    pub review_content: String,
    pub is_premium: bool,
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredReview {
    pub overview: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub recommendations: String,
    pub is_premium: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedReview {
    pub error: String,
    pub message: String,
    pub is_premium: bool,
    pub status: ReviewStatus,
}

impl FailedReview {
    pub fn new(message: impl Into<String>, is_premium: bool) -> Self {
        Self {
            error: GENERATION_FAILED.to_string(),
            message: message.into(),
            is_premium,
            status: ReviewStatus::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReviewResult {
    Structured(StructuredReview),
    Cleaned(CleanedReview),
    Failed(FailedReview),
}

impl ReviewResult {
    pub fn is_premium(&self) -> bool {
        match self {
            ReviewResult::Structured(review) => review.is_premium,
            ReviewResult::Cleaned(review) => review.is_premium,
            ReviewResult::Failed(review) => review.is_premium,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ReviewResult::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub review: ReviewResult,
    pub rate_info: RateInfo,
}
