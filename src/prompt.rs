//! Prompt assembly for question answering and summaries

use crate::types::*;

/// Characters of capture content shown to the model
pub const CONTENT_PREVIEW_CHARS: usize = 500;
/// Characters of capture content sent for summarization
pub const SUMMARY_INPUT_CHARS: usize = 2000;

const UNTITLED: &str = "Untitled";

pub const SYSTEM_PROMPT: &str = "You are a personal knowledge assistant for Personal Context Hub. \
The user saves captures (notes, links, quotes, text snippets and todos) and asks you questions about them.

Guidelines:
- Be concise and direct.
- When you use a capture, cite it by its number, e.g. [1] or [2].
- When asked about a topic, summarize the themes across the relevant captures.
- If the captures do not contain the answer, say so plainly instead of guessing.
- Use light markdown (bold, short lists) for formatting.
- Always read the captures below before saying you have no information.";

const CONTEXT_HEADER: &str = "Here are the user's saved captures:";

pub const NO_CAPTURES_MESSAGE: &str = "The user has no saved captures that match this question yet. \
Tell them you could not find anything relevant in their captures, and suggest saving notes or links about it.";

const SUMMARY_PROMPT: &str = "Summarize the following saved capture in one short sentence. \
Reply with the summary only.";

/// Numbered context block for the given captures, in order
pub fn format_context(captures: &[Capture]) -> String {
    captures
        .iter()
        .enumerate()
        .map(|(idx, capture)| format_entry(idx + 1, capture))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_entry(label: usize, capture: &Capture) -> String {
    let title = capture
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(UNTITLED);

    let mut entry = format!(
        "[{}] {} ({})\n{}",
        label,
        title,
        capture.capture_type,
        truncate_chars(capture.content_or_empty(), CONTENT_PREVIEW_CHARS)
    );
    if let Some(source) = &capture.source {
        entry.push_str("\nSource: ");
        entry.push_str(source);
    }
    entry.push_str("\nSaved: ");
    entry.push_str(&capture.created_at.format("%B %-d, %Y").to_string());
    entry
}

/// System message with the context block (or the no-captures notice)
pub fn build_system_message(captures: &[Capture]) -> String {
    if captures.is_empty() {
        format!("{}\n\n{}", SYSTEM_PROMPT, NO_CAPTURES_MESSAGE)
    } else {
        format!("{}\n\n{}\n\n{}", SYSTEM_PROMPT, CONTEXT_HEADER, format_context(captures))
    }
}

pub fn build_answer_request(question: &str, captures: &[Capture]) -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            ChatMessage::system(build_system_message(captures)),
            ChatMessage::user(question),
        ],
        settings: GenerationSettings::ASK,
    }
}

pub fn build_summary_request(content: &str) -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            ChatMessage::system(SUMMARY_PROMPT),
            ChatMessage::user(truncate_chars(content, SUMMARY_INPUT_CHARS)),
        ],
        settings: GenerationSettings::SUMMARY,
    }
}

/// First `max` chars, on a char boundary
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn capture(title: Option<&str>, content: &str, source: Option<&str>) -> Capture {
        Capture {
            id: "c".to_string(),
            title: title.map(str::to_string),
            content: Some(content.to_string()),
            capture_type: CaptureType::Quote,
            source: source.map(str::to_string),
            created_at: Utc.with_ymd_and_hms(2026, 3, 5, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_entry_layout() {
        let block = format_context(&[capture(Some("Stoic line"), "memento mori", Some("Seneca"))]);
        assert_eq!(
            block,
            "[1] Stoic line (quote)\nmemento mori\nSource: Seneca\nSaved: March 5, 2026"
        );
    }

    #[test]
    fn test_missing_title_uses_placeholder_and_source_is_optional() {
        let block = format_context(&[capture(None, "x", None)]);
        assert!(block.starts_with("[1] Untitled (quote)"));
        assert!(!block.contains("Source:"));
    }

    #[test]
    fn test_labels_follow_input_order() {
        let block = format_context(&[
            capture(Some("first"), "a", None),
            capture(Some("second"), "b", None),
        ]);
        let first = block.find("[1] first").unwrap();
        let second = block.find("[2] second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_truncate_chars_respects_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_empty_context_uses_notice() {
        let system = build_system_message(&[]);
        assert!(system.starts_with(SYSTEM_PROMPT));
        assert!(system.ends_with(NO_CAPTURES_MESSAGE));
    }

    #[test]
    fn test_answer_request_shape() {
        let request = build_answer_request("what did I save?", &[capture(Some("t"), "c", None)]);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1], ChatMessage::user("what did I save?"));
        assert_eq!(request.settings, GenerationSettings::ASK);
    }

    #[test]
    fn test_summary_request_truncates_input() {
        let long = "z".repeat(SUMMARY_INPUT_CHARS + 50);
        let request = build_summary_request(&long);
        assert_eq!(request.messages[1].content.len(), SUMMARY_INPUT_CHARS);
        assert_eq!(request.settings, GenerationSettings::SUMMARY);
    }
}
