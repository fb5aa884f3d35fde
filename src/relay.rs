use crate::completion::{AzureOpenAIClient, CompletionProvider};
use crate::config::AppConfig;
use crate::sms::{MessageSid, PhoneNumber, SmsProvider, TwilioClient};
use anyhow::Result;
use tracing::log::debug;

#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    #[error("Completion provider failed: {0:#}")]
    Completion(anyhow::Error),
    #[error("SMS provider failed: {0:#}")]
    Sms(anyhow::Error),
}
impl RelayError {
    #[cfg_attr(not(feature = "sentry"), allow(dead_code))]
    pub fn source_error(&self) -> &anyhow::Error {
        match self {
            RelayError::Completion(e) | RelayError::Sms(e) => e,
        }
    }
}

/// Answers an inbound message with a completion, sent back to the sender.
pub struct Relay {
    completion: Box<dyn CompletionProvider>,
    sms: Box<dyn SmsProvider>,
    sender: PhoneNumber,
}
impl Relay {
    pub fn new(
        completion: Box<dyn CompletionProvider>,
        sms: Box<dyn SmsProvider>,
        sender: PhoneNumber,
    ) -> Self {
        Self {
            completion,
            sms,
            sender,
        }
    }

    /// Build the provider clients, failing if any credential or endpoint is unusable.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let completion = AzureOpenAIClient::new(&config.completion)?;
        let sms = TwilioClient::new(&config.sms)?;
        let sender = config.sms.sender_number()?;

        Ok(Self::new(Box::new(completion), Box::new(sms), sender))
    }

    /// The SMS is only sent once the completion has returned. Nothing is retried or deduplicated.
    pub async fn handle(&self, from: &PhoneNumber, body: &str) -> Result<MessageSid, RelayError> {
        let reply = self
            .completion
            .complete(body)
            .await
            .map_err(RelayError::Completion)?;

        debug!(
            "Generated {} character reply for {}",
            reply.chars().count(),
            from.masked()
        );
        self.sms
            .send(from, &self.sender, &reply)
            .await
            .map_err(RelayError::Sms)
    }
}
