//! Core type definitions for capture retrieval and answering

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::providers::ProviderKind;

/// A saved user artifact, supplied by the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capture {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub capture_type: CaptureType,
    #[serde(default)]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Capture {
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn content_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureType {
    Text,
    Link,
    Note,
    Quote,
    Todo,
}

impl CaptureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureType::Text => "text",
            CaptureType::Link => "link",
            CaptureType::Note => "note",
            CaptureType::Quote => "quote",
            CaptureType::Todo => "todo",
        }
    }
}

impl fmt::Display for CaptureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capture with the score it earned for one query. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCapture {
    #[serde(flatten)]
    pub capture: Capture,
    pub relevance_score: u32,
}

/// Answer plus the captures that were placed in the prompt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub answer: String,
    pub captures_used: Vec<Capture>,
}

/// Public view of the active provider, for status reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub key: ProviderKind,
    pub name: &'static str,
    pub model: String,
    pub cost_description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat message sent to a completion backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Sampling settings fixed per call type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationSettings {
    /// Interactive question answering
    pub const ASK: Self = Self { temperature: 0.7, max_tokens: 1000 };
    /// Best-effort auto-summary of a new capture
    pub const SUMMARY: Self = Self { temperature: 0.3, max_tokens: 100 };
}

/// Request handed to a completion backend
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub settings: GenerationSettings,
}
