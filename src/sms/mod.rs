mod phone;
mod twilio;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

pub use phone::PhoneNumber;
pub use twilio::TwilioClient;

/// Provider assigned identifier for an accepted outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageSid(String);
impl MessageSid {
    pub fn new(sid: impl Into<String>) -> Self {
        Self(sid.into())
    }
}
impl fmt::Display for MessageSid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait SmsProvider: Send + Sync {
    /// Hand a message to the provider. Acceptance does not mean it was delivered.
    async fn send(&self, to: &PhoneNumber, from: &PhoneNumber, body: &str) -> Result<MessageSid>;
}
