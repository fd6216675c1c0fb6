//! Provider table and credential-driven selection

use crate::config::{AiConfig, EnvSource, ProcessEnv};
use crate::error::{AiError, Result};
use crate::types::ProviderStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Groq,
    OpenRouter,
    Together,
    OpenAi,
}

/// Static description of a chat-completion provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub kind: ProviderKind,
    pub display_name: &'static str,
    pub api_base_url: &'static str,
    pub default_model: &'static str,
    pub credential_env_var: &'static str,
    pub cost_description: &'static str,
}

impl ProviderKind {
    /// Fallback order: free tier first, default paid provider last
    pub const PRIORITY: [ProviderKind; 4] = [
        ProviderKind::Groq,
        ProviderKind::OpenRouter,
        ProviderKind::Together,
        ProviderKind::OpenAi,
    ];

    pub fn descriptor(self) -> ProviderDescriptor {
        match self {
            ProviderKind::Groq => ProviderDescriptor {
                kind: self,
                display_name: "Groq",
                api_base_url: "https://api.groq.com/openai/v1",
                default_model: "llama-3.3-70b-versatile",
                credential_env_var: "GROQ_API_KEY",
                cost_description: "Free tier",
            },
            ProviderKind::OpenRouter => ProviderDescriptor {
                kind: self,
                display_name: "OpenRouter",
                api_base_url: "https://openrouter.ai/api/v1",
                default_model: "meta-llama/llama-3.1-8b-instruct",
                credential_env_var: "OPENROUTER_API_KEY",
                cost_description: "~$0.05 per 1M tokens",
            },
            ProviderKind::Together => ProviderDescriptor {
                kind: self,
                display_name: "Together AI",
                api_base_url: "https://api.together.xyz/v1",
                default_model: "meta-llama/Llama-3.3-70B-Instruct-Turbo",
                credential_env_var: "TOGETHER_API_KEY",
                cost_description: "~$0.88 per 1M tokens",
            },
            ProviderKind::OpenAi => ProviderDescriptor {
                kind: self,
                display_name: "OpenAI",
                api_base_url: "https://api.openai.com/v1",
                default_model: "gpt-4o-mini",
                credential_env_var: "OPENAI_API_KEY",
                cost_description: "~$0.15 per 1M input tokens",
            },
        }
    }

    pub fn display_name(self) -> &'static str {
        self.descriptor().display_name
    }
}

/// A resolved provider: descriptor plus credential and effective model
#[derive(Clone)]
pub struct ActiveProvider {
    pub descriptor: ProviderDescriptor,
    pub base_url: String,
    pub model: String,
    api_key: String,
}

impl ActiveProvider {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        let descriptor = kind.descriptor();
        Self {
            descriptor,
            base_url: descriptor.api_base_url.to_string(),
            model: descriptor.default_model.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn kind(&self) -> ProviderKind {
        self.descriptor.kind
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn status(&self) -> ProviderStatus {
        ProviderStatus {
            key: self.descriptor.kind,
            name: self.descriptor.display_name,
            model: self.model.clone(),
            cost_description: self.descriptor.cost_description,
        }
    }
}

impl fmt::Debug for ActiveProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveProvider")
            .field("kind", &self.descriptor.kind)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Scan providers in priority order; the first with a non-blank credential wins.
/// Credentials come from `source`, the model override from `config`.
pub fn resolve_provider(source: &dyn EnvSource, config: &AiConfig) -> Option<ActiveProvider> {
    ProviderKind::PRIORITY.iter().find_map(|kind| {
        let api_key = source.non_empty(kind.descriptor().credential_env_var)?;
        let provider = ActiveProvider::new(*kind, api_key);
        Some(match &config.model_override {
            Some(model) => provider.with_model(model.clone()),
            None => provider,
        })
    })
}

/// Resolves the active provider once and caches it.
///
/// Only a successful resolution is cached. Once a provider is chosen it stays
/// chosen for the life of the selector, even if credentials change. Two
/// callers racing the first resolution compute the same result, so the loser
/// of `OnceLock::get_or_init` simply reads the winner's value.
pub struct ProviderSelector {
    source: Box<dyn EnvSource>,
    config: AiConfig,
    resolved: OnceLock<ActiveProvider>,
}

impl ProviderSelector {
    /// Selector whose settings are read from the same source as its credentials
    pub fn new(source: impl EnvSource + 'static) -> Self {
        let config = AiConfig::from_source(&source);
        Self::with_config(source, config)
    }

    pub fn with_config(source: impl EnvSource + 'static, config: AiConfig) -> Self {
        Self {
            source: Box::new(source),
            config,
            resolved: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Process-wide selector backed by the real environment
    pub fn global() -> Arc<ProviderSelector> {
        static GLOBAL: OnceLock<Arc<ProviderSelector>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(ProviderSelector::with_config(ProcessEnv, AiConfig::from_env())))
            .clone()
    }

    pub fn active(&self) -> Option<&ActiveProvider> {
        if let Some(provider) = self.resolved.get() {
            return Some(provider);
        }

        let provider = resolve_provider(self.source.as_ref(), &self.config)?;
        let provider = self.resolved.get_or_init(|| {
            info!(
                "Using AI provider {} (model {})",
                provider.descriptor.display_name, provider.model
            );
            provider
        });
        Some(provider)
    }

    /// Active provider, or a configuration error naming every credential variable
    pub fn require(&self) -> Result<&ActiveProvider> {
        self.active().ok_or_else(|| {
            let vars: Vec<&str> = ProviderKind::PRIORITY
                .iter()
                .map(|k| k.descriptor().credential_env_var)
                .collect();
            AiError::Configuration(vars.join(", "))
        })
    }

    pub fn is_configured(&self) -> bool {
        self.active().is_some()
    }

    pub fn status(&self) -> Option<ProviderStatus> {
        self.active().map(ActiveProvider::status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Environment that tests can mutate after the selector is built
    #[derive(Clone, Default)]
    struct SharedEnv(Arc<Mutex<HashMap<String, String>>>);

    impl SharedEnv {
        fn set(&self, key: &str, value: &str) {
            self.0.lock().unwrap().insert(key.to_string(), value.to_string());
        }
    }

    impl EnvSource for SharedEnv {
        fn var(&self, key: &str) -> Option<String> {
            self.0.lock().unwrap().get(key).cloned()
        }
    }

    #[test]
    fn test_priority_order_is_fixed() {
        let names: Vec<&str> = ProviderKind::PRIORITY
            .iter()
            .map(|k| k.display_name())
            .collect();
        assert_eq!(names, vec!["Groq", "OpenRouter", "Together AI", "OpenAI"]);
    }

    #[test]
    fn test_first_configured_provider_wins() {
        let source = env(&[("OPENROUTER_API_KEY", "or-key"), ("OPENAI_API_KEY", "oa-key")]);
        let provider = resolve_provider(&source, &AiConfig::from_source(&source)).unwrap();
        assert_eq!(provider.kind(), ProviderKind::OpenRouter);
        assert_eq!(provider.api_key(), "or-key");
    }

    #[test]
    fn test_blank_credentials_are_skipped() {
        let source = env(&[("GROQ_API_KEY", "  "), ("TOGETHER_API_KEY", " tk ")]);
        let provider = resolve_provider(&source, &AiConfig::from_source(&source)).unwrap();
        assert_eq!(provider.kind(), ProviderKind::Together);
        assert_eq!(provider.api_key(), "tk");
    }

    #[test]
    fn test_model_override_applies_to_active_provider() {
        let source = env(&[("GROQ_API_KEY", "g"), ("AI_MODEL", "mixtral-8x7b")]);
        let provider = resolve_provider(&source, &AiConfig::from_source(&source)).unwrap();
        assert_eq!(provider.model, "mixtral-8x7b");
        assert_eq!(provider.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_explicit_config_controls_model() {
        let with_override = AiConfig {
            model_override: Some("gpt-4o".to_string()),
            ..AiConfig::default()
        };
        let selector = ProviderSelector::with_config(env(&[("OPENAI_API_KEY", "k")]), with_override);
        assert_eq!(selector.active().unwrap().model, "gpt-4o");

        // AI_MODEL in the credential source is not consulted when a config is given
        let selector = ProviderSelector::with_config(
            env(&[("OPENAI_API_KEY", "k"), ("AI_MODEL", "ignored")]),
            AiConfig::default(),
        );
        assert_eq!(selector.active().unwrap().model, "gpt-4o-mini");
    }

    #[test]
    fn test_new_reads_config_from_source() {
        let selector = ProviderSelector::new(env(&[("AI_MODEL", "m"), ("AI_TIMEOUT_MS", "2500")]));
        assert_eq!(selector.config().model_override.as_deref(), Some("m"));
        assert_eq!(selector.config().timeout, std::time::Duration::from_millis(2500));
    }

    #[test]
    fn test_unconfigured_selector() {
        let selector = ProviderSelector::new(env(&[]));
        assert!(!selector.is_configured());
        assert!(selector.status().is_none());
        match selector.require() {
            Err(AiError::Configuration(vars)) => assert!(vars.contains("GROQ_API_KEY")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_resolution_is_cached_after_first_success() {
        let shared = SharedEnv::default();
        let selector = ProviderSelector::new(shared.clone());
        assert!(!selector.is_configured());

        shared.set("OPENAI_API_KEY", "oa");
        assert_eq!(selector.active().unwrap().kind(), ProviderKind::OpenAi);

        // a higher-priority key appearing later is ignored
        shared.set("GROQ_API_KEY", "g");
        assert_eq!(selector.active().unwrap().kind(), ProviderKind::OpenAi);
        assert_eq!(selector.status().unwrap().key, ProviderKind::OpenAi);
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = ActiveProvider::new(ProviderKind::Groq, "secret-value");
        let rendered = format!("{:?}", provider);
        assert!(!rendered.contains("secret-value"));
        assert!(rendered.contains("<redacted>"));
    }
}
