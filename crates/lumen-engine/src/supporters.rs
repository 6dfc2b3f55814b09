use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use lumen_contracts::tier::{SupporterStatus, Tier};
use reqwest::blocking::Client as HttpClient;
use serde_json::Value;
use tracing::{debug, warn};

const SUPPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SUPPORT_WINDOW_DAYS: i64 = 30;
const TEST_ACCOUNT_SUPPORT_TOTAL: f64 = 20.0;

/// Maps a caller identifier (an email address) to a supporter status.
/// Lookups never fail; any problem yields the free tier.
pub trait SupporterLookup: Send + Sync {
    fn lookup(&self, identifier: &str) -> SupporterStatus;
}

#[derive(Debug, Clone)]
pub struct TestAccounts {
    premium: Vec<String>,
    free: Vec<String>,
}

impl TestAccounts {
    pub fn new(premium: &[&str], free: &[&str]) -> Self {
        let lower = |items: &[&str]| -> Vec<String> {
            items.iter().map(|item| item.to_lowercase()).collect()
        };
        Self {
            premium: lower(premium),
            free: lower(free),
        }
    }

    pub fn tier_for(&self, identifier: &str) -> Option<Tier> {
        let identifier = identifier.to_lowercase();
        if self.premium.contains(&identifier) {
            return Some(Tier::Premium);
        }
        if self.free.contains(&identifier) {
            return Some(Tier::Free);
        }
        None
    }
}

impl Default for TestAccounts {
    fn default() -> Self {
        Self::new(
            &[
                "premium@test.com",
                "test.premium@gmail.com",
                "premium.test@gmail.com",
            ],
            &["free@test.com", "test.free@gmail.com", "free.test@gmail.com"],
        )
    }
}

/// Supporter lookup backed by the Buy Me a Coffee supporters endpoint.
pub struct BuyMeACoffeeClient {
    api_base: String,
    token: Option<String>,
    http: HttpClient,
    test_accounts: TestAccounts,
}

impl BuyMeACoffeeClient {
    pub fn new(api_base: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("buymeacoffee http client build failed")?;
        Ok(Self {
            api_base: api_base.trim().trim_end_matches('/').to_string(),
            token,
            http,
            test_accounts: TestAccounts::default(),
        })
    }

    pub fn with_test_accounts(mut self, test_accounts: TestAccounts) -> Self {
        self.test_accounts = test_accounts;
        self
    }

    fn fetch_supporters(&self) -> Result<Vec<Value>> {
        let Some(token) = self.token.as_deref() else {
            bail!("BUYMEACOFFEE_TOKEN is not configured");
        };
        let response = self
            .http
            .get(format!("{}/supporters", self.api_base))
            .bearer_auth(token)
            .send()
            .context("buymeacoffee supporters request failed")?;
        let status = response.status();
        if !status.is_success() {
            bail!("buymeacoffee supporters request failed ({})", status.as_u16());
        }
        let parsed: Value = response
            .json()
            .context("buymeacoffee returned invalid JSON payload")?;
        Ok(parsed
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    fn remote_status(&self, identifier: &str) -> Result<SupporterStatus> {
        let supporters = self.fetch_supporters()?;
        let Some(record) = find_supporter(&supporters, identifier) else {
            debug!(identifier, "no supporter record found");
            return Ok(SupporterStatus::free());
        };
        Ok(status_from_record(record, Utc::now()))
    }
}

impl SupporterLookup for BuyMeACoffeeClient {
    fn lookup(&self, identifier: &str) -> SupporterStatus {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return SupporterStatus::free();
        }
        if let Some(tier) = self.test_accounts.tier_for(identifier) {
            debug!(identifier, tier = tier.as_str(), "test account detected");
            return test_account_status(tier, Utc::now());
        }
        match self.remote_status(identifier) {
            Ok(status) => status,
            Err(err) => {
                warn!(identifier, error = %format!("{err:#}"), "supporter lookup failed");
                SupporterStatus::free()
            }
        }
    }
}

fn test_account_status(tier: Tier, now: DateTime<Utc>) -> SupporterStatus {
    match tier {
        Tier::Premium => SupporterStatus::premium(
            now.format(SUPPORT_DATE_FORMAT).to_string(),
            TEST_ACCOUNT_SUPPORT_TOTAL,
        ),
        Tier::Free => SupporterStatus::free(),
    }
}

fn find_supporter<'a>(supporters: &'a [Value], identifier: &str) -> Option<&'a Value> {
    let wanted = identifier.to_lowercase();
    supporters.iter().find(|row| {
        row.get("email")
            .and_then(Value::as_str)
            .map(|email| email.to_lowercase() == wanted)
            .unwrap_or(false)
    })
}

/// Support counts for 30 whole days after `support_created_on`.
pub fn status_from_record(record: &Value, now: DateTime<Utc>) -> SupporterStatus {
    let Some(created_raw) = record.get("support_created_on").and_then(Value::as_str) else {
        return SupporterStatus::free();
    };
    let Ok(created) = NaiveDateTime::parse_from_str(created_raw, SUPPORT_DATE_FORMAT) else {
        warn!(value = created_raw, "unparsable support_created_on");
        return SupporterStatus::free();
    };
    if (now - created.and_utc()).num_days() > SUPPORT_WINDOW_DAYS {
        return SupporterStatus::free();
    }
    let total = record
        .get("support_coffee_price")
        .and_then(value_as_f64)
        .unwrap_or(0.0);
    SupporterStatus::premium(created_raw, total)
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Fixed statuses keyed by lowercase identifier; unknown identifiers are free.
#[derive(Debug, Clone, Default)]
pub struct StaticSupporterLookup {
    statuses: HashMap<String, SupporterStatus>,
}

impl StaticSupporterLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, identifier: &str, status: SupporterStatus) -> Self {
        self.statuses.insert(identifier.to_lowercase(), status);
        self
    }
}

impl SupporterLookup for StaticSupporterLookup {
    fn lookup(&self, identifier: &str) -> SupporterStatus {
        self.statuses
            .get(&identifier.trim().to_lowercase())
            .cloned()
            .unwrap_or_default()
    }
}
