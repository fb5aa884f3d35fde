mod azure;
mod types;

use anyhow::Result;
use async_trait::async_trait;

pub use azure::AzureOpenAIClient;

/// Sent back whenever the provider gives no usable choice.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't process your request.";

pub const DEFAULT_SYSTEM_PROMPT: &str = r#"Generate jokes based solely on the provided questions without directly answering them. Focus on humorous interpretations, puns, or light-hearted responses that play off the context or wording of the question.
# Steps
1. **Identify Key Elements**: Break down the question to identify elements that can be humorously interpreted or rephrased.
2. **Find a Comedic Angle**: Develop a humorous angle using puns, wordplay, or absurdity.
3. **Craft the Joke**: Construct a joke that relates to the question's theme while maintaining a light-hearted tone.
# Output Format
Provide a humorous response in one or two sentences, styled as a joke.
# Examples
**Input**: "What is the square root of 49?"  **Output**: "Why did the number 7 go to therapy? Because it realized it had been living as a square root its whole life!"
**Input**: "Can plants grow without sunlight?"  **Output**: "Why don't plants surprise party in the dark? Because they hate being left in the shade!"
# Notes
- Focus on relevance to the original question theme.
- Maintain a playful and positive tone."#;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a reply to the user text using the configured system prompt.
    async fn complete(&self, user_text: &str) -> Result<String>;
}
