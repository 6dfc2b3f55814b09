pub mod config;
pub mod encoder;
pub mod supporters;
pub mod vision;

use std::time::Instant;

use anyhow::{anyhow, Result};
use lumen_contracts::events::{EventLog, ReviewEvent};
use lumen_contracts::models::{ModelSelector, VISION};
use lumen_contracts::normalize::{normalizer_for, Normalizer};
use lumen_contracts::review::{FailedReview, ReviewRequest, ReviewResponse, ReviewResult};
use lumen_contracts::tier::{RateInfo, TierPolicy};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{EngineSettings, ReviewConfig};
use crate::encoder::{encode_image, image_fingerprint};
use crate::supporters::BuyMeACoffeeClient;
use crate::vision::{DryrunVisionModel, OpenAiVisionModel, VisionModel};

const DRYRUN_PROVIDER: &str = "dryrun";
const DRYRUN_MODEL: &str = "dryrun-vision";

/// Runs one review per call: tier policy, prompt, image encoding, a single
/// model call and normalization. Model failures come back as the failure
/// shape, never as `Err`.
pub struct ReviewEngine {
    config: ReviewConfig,
    model: Box<dyn VisionModel>,
    normalizer: Box<dyn Normalizer>,
    events: Option<EventLog>,
}

impl ReviewEngine {
    pub fn new(config: ReviewConfig, model: Box<dyn VisionModel>) -> Self {
        let normalizer = normalizer_for(config.mode);
        Self {
            config,
            model,
            normalizer,
            events: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Box<dyn Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_event_log(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn rate_info(&self, is_supporter: bool) -> RateInfo {
        TierPolicy::for_supporter(is_supporter).rate_info()
    }

    pub fn review(&self, request: &ReviewRequest) -> ReviewResponse {
        let policy = TierPolicy::for_supporter(request.is_supporter());
        let is_premium = policy.is_premium();
        let prompt = self.config.prompts.build(policy.prompt, request.context());
        let image = encode_image(request.image());
        let review_id = Uuid::new_v4().to_string();
        let started = Instant::now();

        self.record(&ReviewEvent::ReviewStarted {
            review_id: review_id.clone(),
            tier: policy.tier,
            prompt: policy.prompt,
            model: self.model.name().to_string(),
            image_bytes: request.image().len(),
            image_sha256: image_fingerprint(request.image()),
            context_chars: request.context().chars().count(),
        });
        debug!(
            review_id = %review_id,
            tier = policy.tier.as_str(),
            prompt = policy.prompt.as_str(),
            mime = image.mime,
            "invoking vision model"
        );

        let review = match self
            .model
            .invoke(self.config.prompts.system_instructions(), &prompt, &image)
        {
            Ok(raw) => {
                let latency_ms = elapsed_ms(started);
                info!(review_id = %review_id, latency_ms, "review generated");
                self.record(&ReviewEvent::ReviewCompleted {
                    review_id,
                    mode: self.normalizer.mode(),
                    raw_chars: raw.chars().count(),
                    latency_ms,
                });
                self.normalizer.normalize(&raw, is_premium)
            }
            Err(err) => {
                let latency_ms = elapsed_ms(started);
                let message = err.to_string();
                warn!(review_id = %review_id, auth = err.is_auth(), error = %message, "review failed");
                self.record(&ReviewEvent::ReviewFailed {
                    review_id,
                    message: message.clone(),
                    latency_ms,
                });
                ReviewResult::Failed(FailedReview::new(message, is_premium))
            }
        };

        ReviewResponse {
            review,
            rate_info: policy.rate_info(),
        }
    }

    fn record(&self, event: &ReviewEvent) {
        let Some(events) = self.events.as_ref() else {
            return;
        };
        if let Err(err) = events.record(event) {
            warn!(path = %events.path().display(), error = %format!("{err:#}"), "event log write failed");
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Builds an engine from settings. An unknown model falls back to the
/// registry default with a warning; the dryrun provider never touches the
/// network.
pub fn build_engine(settings: &EngineSettings) -> Result<ReviewEngine> {
    let requested = if settings.dryrun {
        DRYRUN_MODEL
    } else {
        settings.review_model.as_str()
    };
    let selection = ModelSelector::new(None)
        .select(Some(requested), VISION)
        .map_err(|err| anyhow!(err))?;
    if let Some(reason) = selection.fallback_reason.as_deref() {
        warn!(model = %selection.model.name, "{reason}");
    }

    let model: Box<dyn VisionModel> = if selection.model.provider == DRYRUN_PROVIDER {
        Box::new(DryrunVisionModel)
    } else {
        Box::new(OpenAiVisionModel::new(
            selection.model.name.clone(),
            &settings.openai_api_base,
            settings.openai_api_key.clone(),
            settings.request_timeout,
        )?)
    };
    let config = ReviewConfig::new(settings.normalize_mode, selection.model.name);
    Ok(ReviewEngine::new(config, model))
}

pub fn build_supporter_lookup(settings: &EngineSettings) -> Result<BuyMeACoffeeClient> {
    BuyMeACoffeeClient::new(
        &settings.buymeacoffee_api_base,
        settings.buymeacoffee_token.clone(),
        settings.request_timeout,
    )
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::{Arc, Mutex};

    use lumen_contracts::normalize::{NormalizeMode, StructuredNormalizer};
    use lumen_contracts::review::{ReviewStatus, GENERATION_FAILED};
    use serde_json::Value;

    use super::*;
    use crate::encoder::EncodedImage;
    use crate::vision::InvokeError;

    type Calls = Arc<Mutex<Vec<(String, String, String)>>>;

    struct RecordingModel {
        calls: Calls,
    }

    impl VisionModel for RecordingModel {
        fn name(&self) -> &str {
            "recording"
        }

        fn invoke(
            &self,
            system: &str,
            prompt: &str,
            image: &EncodedImage,
        ) -> Result<String, InvokeError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((system.to_string(), prompt.to_string(), image.data_url()));
            }
            Ok("## Strengths\n- Clear grid".to_string())
        }
    }

    struct FixedModel(&'static str);

    impl VisionModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        fn invoke(
            &self,
            _system: &str,
            _prompt: &str,
            _image: &EncodedImage,
        ) -> Result<String, InvokeError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingModel;

    impl VisionModel for FailingModel {
        fn name(&self) -> &str {
            "failing"
        }

        fn invoke(
            &self,
            _system: &str,
            _prompt: &str,
            _image: &EncodedImage,
        ) -> Result<String, InvokeError> {
            Err(InvokeError::Rejected {
                status: 429,
                body: "quota exceeded".to_string(),
            })
        }
    }

    fn dryrun_engine(mode: NormalizeMode) -> Result<ReviewEngine> {
        let settings = EngineSettings {
            dryrun: true,
            normalize_mode: mode,
            ..EngineSettings::default()
        };
        build_engine(&settings)
    }

    #[test]
    fn supporter_gets_enhanced_prompt_and_higher_quota() -> Result<()> {
        let calls = Calls::default();
        let engine = ReviewEngine::new(
            ReviewConfig::new(NormalizeMode::Cleanup, "recording"),
            Box::new(RecordingModel {
                calls: calls.clone(),
            }),
        );

        let premium = engine.review(&ReviewRequest::new(b"img".to_vec(), " pricing page ", true)?);
        let free = engine.review(&ReviewRequest::new(b"img".to_vec(), "", false)?);

        assert_eq!(premium.rate_info.requests_limit, 15);
        assert_eq!(free.rate_info.requests_limit, 5);
        assert!(premium.review.is_premium());
        assert!(!free.review.is_premium());

        let calls = calls.lock().map_err(|_| anyhow!("poisoned"))?;
        assert_eq!(calls.len(), 2);
        let (system, prompt, data_url) = &calls[0];
        assert!(system.starts_with("You are a professional design expert"));
        assert!(prompt.contains("5-6 detailed points"));
        assert!(prompt.contains("Context: pricing page"));
        assert_eq!(data_url, "data:image/jpeg;base64,aW1n");
        assert!(calls[1].1.contains("3-4 specific points"));
        assert!(calls[1].1.contains("Context: No context provided"));
        Ok(())
    }

    #[test]
    fn model_failure_becomes_failed_review_with_tier_flag() -> Result<()> {
        let engine = ReviewEngine::new(
            ReviewConfig::new(NormalizeMode::Cleanup, "failing"),
            Box::new(FailingModel),
        );
        let response = engine.review(&ReviewRequest::new(b"img".to_vec(), "", true)?);
        let ReviewResult::Failed(failed) = &response.review else {
            panic!("expected failed review");
        };
        assert_eq!(failed.error, GENERATION_FAILED);
        assert_eq!(failed.message, "model request rejected (429): quota exceeded");
        assert!(failed.is_premium);
        assert_eq!(failed.status, ReviewStatus::Error);
        assert_eq!(response.rate_info.requests_limit, 15);
        Ok(())
    }

    #[test]
    fn blank_model_text_is_normalized_not_failed() -> Result<()> {
        for raw in ["", " \n\t"] {
            let cleanup = ReviewEngine::new(
                ReviewConfig::new(NormalizeMode::Cleanup, "fixed"),
                Box::new(FixedModel(raw)),
            );
            let response = cleanup.review(&ReviewRequest::new(b"img".to_vec(), "", true)?);
            let ReviewResult::Cleaned(review) = response.review else {
                panic!("expected cleaned review for {raw:?}");
            };
            assert_eq!(review.review_content, "# Overview");
            assert_eq!(review.status, ReviewStatus::Success);
            assert!(review.is_premium);

            let structured = ReviewEngine::new(
                ReviewConfig::new(NormalizeMode::Structured, "fixed"),
                Box::new(FixedModel(raw)),
            );
            let response = structured.review(&ReviewRequest::new(b"img".to_vec(), "", false)?);
            let ReviewResult::Structured(review) = response.review else {
                panic!("expected structured review for {raw:?}");
            };
            assert!(review.overview.is_empty());
            assert!(review.strengths.is_empty());
            assert!(review.improvements.is_empty());
            assert!(review.recommendations.is_empty());
        }
        Ok(())
    }

    #[test]
    fn dryrun_cleanup_review_has_overview_header() -> Result<()> {
        let engine = dryrun_engine(NormalizeMode::Cleanup)?;
        assert_eq!(engine.model_name(), "dryrun-vision");
        let response = engine.review(&ReviewRequest::new(b"img".to_vec(), "", false)?);
        let ReviewResult::Cleaned(review) = response.review else {
            panic!("expected cleaned review");
        };
        assert!(review.review_content.starts_with("# Overview\n"));
        assert!(review.review_content.contains("# Strengths\n• Balanced spacing"));
        assert!(!review.review_content.contains("**"));
        Ok(())
    }

    #[test]
    fn dryrun_structured_review_splits_sections() -> Result<()> {
        let engine = dryrun_engine(NormalizeMode::Structured)?;
        let response = engine.review(&ReviewRequest::new(b"img".to_vec(), "", true)?);
        let ReviewResult::Structured(review) = response.review else {
            panic!("expected structured review");
        };
        assert!(review.overview.starts_with("A dry-run review"));
        assert_eq!(review.strengths.len(), 3);
        assert_eq!(review.improvements.len(), 3);
        assert!(review.recommendations.starts_with("Raise the secondary text"));
        assert!(review.is_premium);
        Ok(())
    }

    #[test]
    fn normalizer_can_be_replaced() -> Result<()> {
        let engine = dryrun_engine(NormalizeMode::Cleanup)?
            .with_normalizer(Box::new(StructuredNormalizer::default()));
        let response = engine.review(&ReviewRequest::new(b"img".to_vec(), "", false)?);
        assert!(matches!(response.review, ReviewResult::Structured(_)));
        Ok(())
    }

    #[test]
    fn unknown_model_falls_back_to_default() -> Result<()> {
        let settings = EngineSettings {
            review_model: "gpt-3.5-turbo".to_string(),
            ..EngineSettings::default()
        };
        let engine = build_engine(&settings)?;
        assert_eq!(engine.config().model, "gpt-4o");
        assert_eq!(engine.model_name(), "gpt-4o");
        Ok(())
    }

    #[test]
    fn review_lifecycle_is_logged() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("events.jsonl");
        let engine = dryrun_engine(NormalizeMode::Structured)?
            .with_event_log(EventLog::new(&path, "session-1"));
        engine.review(&ReviewRequest::new(b"img".to_vec(), "checkout", false)?);

        let failing = ReviewEngine::new(
            ReviewConfig::new(NormalizeMode::Cleanup, "failing"),
            Box::new(FailingModel),
        )
        .with_event_log(EventLog::new(&path, "session-1"));
        failing.review(&ReviewRequest::new(b"img".to_vec(), "", false)?);

        let rows: Vec<Value> = fs::read_to_string(&path)?
            .lines()
            .map(serde_json::from_str::<Value>)
            .collect::<Result<_, _>>()?;
        let types: Vec<&str> = rows
            .iter()
            .filter_map(|row| row["type"].as_str())
            .collect();
        assert_eq!(
            types,
            vec!["review_started", "review_completed", "review_started", "review_failed"]
        );
        assert_eq!(rows[0]["tier"], Value::from("free"));
        assert_eq!(rows[0]["prompt"], Value::from("standard"));
        assert_eq!(rows[0]["context_chars"], Value::from(8));
        assert_eq!(rows[0]["review_id"], rows[1]["review_id"]);
        assert_eq!(rows[1]["mode"], Value::from("structured"));
        Ok(())
    }

    #[test]
    fn unwritable_event_log_does_not_fail_review() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "file")?;
        let engine = dryrun_engine(NormalizeMode::Cleanup)?
            .with_event_log(EventLog::new(blocker.join("events.jsonl"), "s"));
        let response = engine.review(&ReviewRequest::new(b"img".to_vec(), "", false)?);
        assert!(!response.review.is_error());
        Ok(())
    }

    #[test]
    fn rate_info_reports_quota_without_usage() -> Result<()> {
        let engine = dryrun_engine(NormalizeMode::Cleanup)?;
        assert_eq!(engine.rate_info(true).requests_limit, 15);
        assert_eq!(engine.rate_info(false).requests_used, 0);
        Ok(())
    }
}
