use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampingSettings {
    pub version: String,
    /// MIME types the stamping service can render a stamp onto.
    #[serde(default = "default_stampable_mimes")]
    pub stampable_mimes: Vec<String>,
    /// Application states from which attachments count as post-verdict.
    #[serde(default = "default_post_verdict_states")]
    pub post_verdict_states: Vec<String>,
    /// Language code sent with stamp requests.
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

fn default_stampable_mimes() -> Vec<String> {
    [
        "application/pdf",
        "image/jpeg",
        "image/png",
        "image/tiff",
        "image/gif",
    ]
    .iter()
    .map(|m| m.to_string())
    .collect()
}

fn default_post_verdict_states() -> Vec<String> {
    [
        "verdictGiven",
        "foremanVerdictGiven",
        "agreementPrepared",
        "agreementSigned",
        "constructionStarted",
        "inUse",
        "onHold",
        "appealed",
        "final",
        "closed",
        "ready",
        "finished",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_language() -> String {
    "fi".to_string()
}

impl Default for StampingSettings {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            stampable_mimes: default_stampable_mimes(),
            post_verdict_states: default_post_verdict_states(),
            language: default_language(),
            api: ApiConfig::default(),
            polling: PollingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// No request timeout unless configured; a stalled poll keeps waiting.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStrategy {
    /// Re-issue the poll as soon as the previous response arrives.
    #[default]
    Immediate,
    Fixed,
    Exponential,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingConfig {
    #[serde(default)]
    pub strategy: PollStrategy,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,
    /// Consecutive transport failures tolerated before polling is interrupted.
    #[serde(default = "default_max_failures")]
    pub max_consecutive_failures: u32,
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_max_interval_ms() -> u64 {
    30_000
}

fn default_max_failures() -> u32 {
    3
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            strategy: PollStrategy::default(),
            interval_ms: default_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            max_consecutive_failures: default_max_failures(),
        }
    }
}
