//! Completion backends for chat-style providers

use crate::error::Result;
use crate::providers::ActiveProvider;
use crate::types::*;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Sends chat messages to a provider and returns the completion text
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn complete(
        &self,
        provider: &ActiveProvider,
        request: &CompletionRequest,
    ) -> Result<String>;
}

/// Shared backends, so callers can keep a handle after boxing
#[async_trait]
impl<T: CompletionBackend + ?Sized> CompletionBackend for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn complete(
        &self,
        provider: &ActiveProvider,
        request: &CompletionRequest,
    ) -> Result<String> {
        (**self).complete(provider, request).await
    }
}

/// Mock backend for testing: replays a canned reply and records requests
pub struct MockBackend {
    reply: Box<dyn Fn() -> Result<String> + Send + Sync>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockBackend {
    pub fn replying(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::with_reply(move || Ok(text.clone()))
    }

    pub fn with_reply(reply: impl Fn() -> Result<String> + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(
        &self,
        _provider: &ActiveProvider,
        request: &CompletionRequest,
    ) -> Result<String> {
        if let Ok(mut guard) = self.requests.lock() {
            guard.push(request.clone());
        }
        (self.reply)()
    }
}
