use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::normalize::NormalizeMode;
use crate::prompts::PromptKind;
use crate::tier::Tier;

/// Review lifecycle records. Serialized with the variant name as `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReviewEvent {
    ReviewStarted {
        review_id: String,
        tier: Tier,
        prompt: PromptKind,
        model: String,
        image_bytes: usize,
        image_sha256: String,
        context_chars: usize,
    },
    ReviewCompleted {
        review_id: String,
        mode: NormalizeMode,
        raw_chars: usize,
        latency_ms: u64,
    },
    ReviewFailed {
        review_id: String,
        message: String,
        latency_ms: u64,
    },
}

/// Append-only JSONL event log. Each line is the event's own fields plus
/// `session_id` and `ts`; clones share one file lock.
#[derive(Debug, Clone)]
pub struct EventLog {
    inner: Arc<EventLogInner>,
}

#[derive(Debug)]
struct EventLogInner {
    path: PathBuf,
    session_id: String,
    lock: Mutex<()>,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(EventLogInner {
                path: path.into(),
                session_id: session_id.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn record(&self, event: &ReviewEvent) -> anyhow::Result<Value> {
        let mut row = serde_json::to_value(event)?;
        let Some(fields) = row.as_object_mut() else {
            anyhow::bail!("review event did not serialize to an object");
        };
        fields.insert("session_id".into(), Value::from(self.inner.session_id.as_str()));
        fields.insert("ts".into(), Value::from(now_utc_iso()));
        let line = serde_json::to_string(&row)?;

        if let Some(parent) = self.inner.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let _guard = self
            .inner
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("event log lock poisoned"))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.inner.path)?;
        writeln!(file, "{line}")?;
        Ok(row)
    }
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
