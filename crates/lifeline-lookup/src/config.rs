use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Base URL of the inference service; requests go to `{base_url}/process`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound for one lookup, connect through body. Default: 8 seconds,
    /// well inside the provider's webhook deadline.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LookupConfig {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs,
        }
    }
}
