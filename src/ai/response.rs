use serde::{Deserialize, Serialize};

use super::error::AIError;

const FENCE: &str = "```";

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    /// Text of `choices[0].message.content`.
    pub fn into_text(self) -> Result<String, AIError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AIError::ParseError("Response contained no generated content".to_string()))
    }
}

/// Cleans up model output before it is written as a test file.
///
/// Curly quotes become straight quotes. Text that opens with a fence loses
/// its first line (the fence and any language tag) and a closing fence if one
/// is there, so output cut off mid-block still comes out clean. Anything else
/// is left as-is apart from trimming.
pub fn normalize_generated(text: &str) -> String {
    let text = text
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    match strip_code_fence(&text) {
        Some(inner) => inner.trim().to_string(),
        None => text.trim().to_string(),
    }
}

fn strip_code_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(FENCE)?;
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    let body = body.trim_end();
    Some(body.strip_suffix(FENCE).unwrap_or(body))
}
