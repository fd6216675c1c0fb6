//! Environment-driven configuration for provider calls

use std::collections::HashMap;
use std::time::Duration;

pub const MODEL_OVERRIDE_VAR: &str = "AI_MODEL";
pub const TIMEOUT_VAR: &str = "AI_TIMEOUT_MS";
pub const CONNECT_TIMEOUT_VAR: &str = "AI_CONNECT_TIMEOUT_MS";

/// Source of configuration variables.
///
/// The process environment in production; a plain map in tests so each test
/// gets its own configuration without touching global state.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;

    /// Value with surrounding whitespace removed, `None` when blank
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Reads `std::env`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Replaces the active provider's default model
    pub model_override: Option<String>,
    /// Whole-request timeout for completion calls
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model_override: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl AiConfig {
    pub fn from_env() -> Self {
        Self::from_source(&ProcessEnv)
    }

    /// Unparsable durations keep their defaults
    pub fn from_source(source: &dyn EnvSource) -> Self {
        let mut config = Self::default();
        config.model_override = source.non_empty(MODEL_OVERRIDE_VAR);
        if let Some(ms) = parse_millis(source, TIMEOUT_VAR) {
            config.timeout = ms;
        }
        if let Some(ms) = parse_millis(source, CONNECT_TIMEOUT_VAR) {
            config.connect_timeout = ms;
        }
        config
    }
}

fn parse_millis(source: &dyn EnvSource, key: &str) -> Option<Duration> {
    let raw = source.non_empty(key)?;
    match raw.parse::<u64>() {
        Ok(ms) if ms > 0 => Some(Duration::from_millis(ms)),
        _ => {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}
