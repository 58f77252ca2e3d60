//! Language-model backed implementations of the pipeline stages.
//!
//! Every backend degrades to the same fallback as its rule-based sibling, so
//! a missing or misbehaving model never fails a search.

mod classifier;
mod client;
mod evaluator;
mod optimizer;
pub mod prompts;
mod recommender;

pub use classifier::LlmClassifier;
pub use client::{ChatMessage, ChatRequest, LlmClient, OpenAiCompatibleClient};
pub use evaluator::LlmEvaluator;
pub use optimizer::{LlmOptimizer, APPLY_THRESHOLD};
pub use recommender::LlmRecommender;

use serde::de::DeserializeOwned;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("LLM network error: {0}")]
    Network(String),

    #[error("LLM API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("LLM authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid LLM response: {0}")]
    InvalidResponse(String),

    #[error("LLM configuration error: {0}")]
    Configuration(String),
}

impl LlmError {
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Timeout { .. } | LlmError::Network(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Authentication(_)
            | LlmError::InvalidResponse(_)
            | LlmError::Configuration(_) => false,
        }
    }
}

/// The first JSON document in a reply, ignoring code fences and any
/// prose around it
pub fn extract_json(content: &str) -> &str {
    let trimmed = content.trim();

    let body = match trimmed.find("```") {
        Some(start) => {
            let after = &trimmed[start + 3..];
            let after = after.strip_prefix("json").unwrap_or(after);
            match after.find("```") {
                Some(end) => after[..end].trim(),
                None => after.trim(),
            }
        }
        None => trimmed,
    };

    first_document(body).unwrap_or(body)
}

/// Slice of `text` from the first `{` or `[` to its matching close
fn first_document(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Send a single-prompt request and decode the reply as JSON
pub(crate) async fn complete_json<T: DeserializeOwned>(
    client: &dyn LlmClient,
    prompt: String,
    temperature: f32,
    max_tokens: u32,
) -> Result<T, LlmError> {
    let request = ChatRequest {
        messages: vec![ChatMessage::system(prompts::SYSTEM), ChatMessage::user(prompt)],
        temperature,
        max_tokens,
    };

    let content = client.complete(request).await?;
    let json = extract_json(&content);
    serde_json::from_str(json).map_err(|e| {
        LlmError::InvalidResponse(format!("{}: {}", e, truncate(json, 200)))
    })
}

/// Truncate on a char boundary
pub(crate) fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
