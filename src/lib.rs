//! youtopical - capture retrieval and answering for Personal Context Hub
//!
//! Ranks a user's saved captures against a query and answers questions with
//! the best matches as context:
//! - Keyword relevance scoring with title/content weighting and a recency bonus
//! - Recency fallback when nothing matches
//! - Credential-driven provider selection with a fixed priority order
//! - OpenAI-compatible chat completion over HTTP

pub mod types;
pub mod error;
pub mod config;
pub mod scoring;
pub mod selection;
pub mod providers;
pub mod prompt;
pub mod backends;
pub mod http_backend;
pub mod answerer;
pub mod server;

pub use types::*;
pub use error::{AiError, Result};
pub use config::{AiConfig, EnvSource, ProcessEnv};
pub use scoring::{rank, rank_at};
pub use selection::select_context;
pub use providers::{ActiveProvider, ProviderDescriptor, ProviderKind, ProviderSelector};
pub use backends::{CompletionBackend, MockBackend};
pub use http_backend::HttpCompletionBackend;
pub use answerer::{Answerer, SharedAnswerer};
