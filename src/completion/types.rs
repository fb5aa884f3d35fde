use crate::completion::FALLBACK_REPLY;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Serialize)]
pub struct ChatRequestMessage<'a> {
    pub role: ChatRole,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub messages: [ChatRequestMessage<'a>; 2],
    pub max_tokens: u32,
    pub temperature: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatCompletionChoice>,
}
impl ChatCompletionResponse {
    /// First choice content trimmed, or the fallback reply if there is nothing to send.
    pub fn into_reply(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| FALLBACK_REPLY.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionChoice {
    #[serde(default)]
    pub message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderErrorResponse {
    pub error: ProviderError,
}

#[derive(Debug, Deserialize)]
pub struct ProviderError {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}
