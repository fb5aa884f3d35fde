//! Fake providers and config builders shared by unit tests.

use crate::completion::CompletionProvider;
use crate::config::{CompletionConfig, SmsConfig};
use crate::relay::Relay;
use crate::sms::{MessageSid, PhoneNumber, SmsProvider};
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub const SENDER_NUMBER: &str = "+15550001111";

pub fn number(value: &str) -> PhoneNumber {
    value.parse().unwrap()
}

pub fn completion_config(endpoint: String) -> CompletionConfig {
    CompletionConfig {
        endpoint,
        api_key: "test-azure-key".to_string(),
        deployment: "jokes".to_string(),
        ..Default::default()
    }
}

pub fn sms_config(api_base: String) -> SmsConfig {
    SmsConfig {
        account_sid: "ACtest".to_string(),
        auth_token: "test-auth-token".to_string(),
        phone_number: SENDER_NUMBER.to_string(),
        api_base,
        ..Default::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Complete(String),
    Send {
        to: String,
        from: String,
        body: String,
    },
}

/// Ordered record of every provider call, shared between fakes.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<ProviderCall>>>);
impl CallLog {
    fn push(&self, call: ProviderCall) -> usize {
        let mut calls = self.0.lock().unwrap();
        calls.push(call);
        calls.len()
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.0.lock().unwrap().clone()
    }

    pub fn sends(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ProviderCall::Send { .. }))
            .count()
    }
}

pub struct FakeCompletion {
    reply: Option<String>,
    log: CallLog,
}
impl FakeCompletion {
    pub fn replying(reply: &str, log: &CallLog) -> Self {
        Self {
            reply: Some(reply.to_string()),
            log: log.clone(),
        }
    }

    pub fn failing(log: &CallLog) -> Self {
        Self {
            reply: None,
            log: log.clone(),
        }
    }
}

#[async_trait]
impl CompletionProvider for FakeCompletion {
    async fn complete(&self, user_text: &str) -> Result<String> {
        self.log.push(ProviderCall::Complete(user_text.to_string()));
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => bail!("connection refused (api-key=test-azure-key)"),
        }
    }
}

pub struct FakeSms {
    accept: bool,
    log: CallLog,
}
impl FakeSms {
    pub fn accepting(log: &CallLog) -> Self {
        Self {
            accept: true,
            log: log.clone(),
        }
    }

    pub fn failing(log: &CallLog) -> Self {
        Self {
            accept: false,
            log: log.clone(),
        }
    }
}

#[async_trait]
impl SmsProvider for FakeSms {
    async fn send(&self, to: &PhoneNumber, from: &PhoneNumber, body: &str) -> Result<MessageSid> {
        let position = self.log.push(ProviderCall::Send {
            to: to.to_string(),
            from: from.to_string(),
            body: body.to_string(),
        });

        if !self.accept {
            bail!("SMS provider returned 401 Unauthorized: Authenticate (code 20003)");
        }
        Ok(MessageSid::new(format!("SM{position:032}")))
    }
}

pub fn fake_relay(completion: FakeCompletion, sms: FakeSms) -> Relay {
    Relay::new(Box::new(completion), Box::new(sms), number(SENDER_NUMBER))
}
