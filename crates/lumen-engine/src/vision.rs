use std::time::Duration;

use reqwest::blocking::{Client as HttpClient, Response as HttpResponse};
use reqwest::header::CONTENT_TYPE;
use serde_json::{json, Value};
use thiserror::Error;

use crate::encoder::EncodedImage;

const MAX_OUTPUT_TOKENS: u32 = 4000;
const TEMPERATURE: f64 = 0.7;
const ERROR_BODY_MAX_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("OPENAI_API_KEY is not configured")]
    MissingApiKey,
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("model returned a malformed response: {0}")]
    Malformed(String),
}

impl InvokeError {
    pub fn is_auth(&self) -> bool {
        matches!(self, InvokeError::MissingApiKey)
            || matches!(self, InvokeError::Rejected { status, .. } if *status == 401 || *status == 403)
    }
}

/// One multimodal completion: system instructions, prompt and image in, raw
/// text out. Implementations do not retry and return the text untouched.
pub trait VisionModel: Send + Sync {
    fn name(&self) -> &str;
    fn invoke(
        &self,
        system: &str,
        prompt: &str,
        image: &EncodedImage,
    ) -> Result<String, InvokeError>;
}

pub struct OpenAiVisionModel {
    model: String,
    api_base: String,
    api_key: Option<String>,
    http: HttpClient,
}

impl OpenAiVisionModel {
    pub fn new(
        model: impl Into<String>,
        api_base: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            model: model.into(),
            api_base: api_base.trim().trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }

    fn payload(&self, system: &str, prompt: &str, image: &EncodedImage) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": system,
                },
                {
                    "role": "user",
                    "content": [
                        {"type": "text", "text": prompt},
                        {"type": "image_url", "image_url": {"url": image.data_url()}},
                    ],
                },
            ],
            "max_tokens": MAX_OUTPUT_TOKENS,
            "temperature": TEMPERATURE,
        })
    }
}

impl VisionModel for OpenAiVisionModel {
    fn name(&self) -> &str {
        &self.model
    }

    fn invoke(
        &self,
        system: &str,
        prompt: &str,
        image: &EncodedImage,
    ) -> Result<String, InvokeError> {
        let api_key = self.api_key.as_deref().ok_or(InvokeError::MissingApiKey)?;
        let endpoint = format!("{}/chat/completions", self.api_base);
        let response = self
            .http
            .post(endpoint)
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(&self.payload(system, prompt, image))
            .send()?;
        let parsed = response_json_or_error(response)?;
        extract_completion_text(&parsed)
    }
}

fn response_json_or_error(response: HttpResponse) -> Result<Value, InvokeError> {
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        return Err(InvokeError::Rejected {
            status: status.as_u16(),
            body: truncate_text(&body, ERROR_BODY_MAX_CHARS),
        });
    }
    serde_json::from_str(&body).map_err(|err| InvokeError::Malformed(err.to_string()))
}

/// Reads `choices[0].message.content`, which is either a string or a list of
/// content parts whose text is concatenated. Null content reads as empty text;
/// nothing is trimmed.
pub(crate) fn extract_completion_text(response: &Value) -> Result<String, InvokeError> {
    let content = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .ok_or_else(|| InvokeError::Malformed("missing choices[0].message.content".to_string()))?;

    match content {
        Value::String(text) => Ok(text.clone()),
        Value::Array(parts) => Ok(parts
            .iter()
            .filter_map(|part| match part {
                Value::String(text) => Some(text.as_str()),
                Value::Object(obj) => obj.get("text").and_then(Value::as_str),
                _ => None,
            })
            .collect::<String>()),
        Value::Null => Ok(String::new()),
        other => Err(InvokeError::Malformed(format!(
            "unexpected content type: {other}"
        ))),
    }
}

fn truncate_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}

const DRYRUN_REVIEW: &str = "\
**Overview:**
A dry-run review of the uploaded design. The layout is read as a single screen with a clear primary action.

## Strengths
- Balanced spacing between content groups
- Primary button stands out against the background
- Headline typography is easy to scan

## Areas for Improvement
- Secondary text falls below accessible color ratios
- Form fields lack visible labels
- Footer links are crowded on narrow screens

## Recommendations
Raise the secondary text color ratio, add persistent field labels and give footer links more room on small screens.
";

/// Offline model returning a fixed review; used for `--dryrun` and tests.
#[derive(Debug, Clone, Default)]
pub struct DryrunVisionModel;

impl VisionModel for DryrunVisionModel {
    fn name(&self) -> &str {
        "dryrun-vision"
    }

    fn invoke(
        &self,
        _system: &str,
        _prompt: &str,
        _image: &EncodedImage,
    ) -> Result<String, InvokeError> {
        Ok(DRYRUN_REVIEW.to_string())
    }
}
