use crate::config::SmsConfig;
use crate::sms::{MessageSid, PhoneNumber, SmsProvider};
use anyhow::{anyhow, bail, ensure, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::log::debug;

const MESSAGES_API_VERSION: &str = "2010-04-01";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreateMessageForm<'a> {
    to: &'a str,
    from: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    sid: String,

    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize)]
struct TwilioErrorResponse {
    #[serde(default)]
    code: Option<u32>,
    message: String,
}

/// Sends messages through the Twilio Programmable Messaging REST API.
pub struct TwilioClient {
    client: Client,
    messages_url: Url,
    account_sid: String,
    auth_token: String,
}
impl TwilioClient {
    pub fn new(config: &SmsConfig) -> Result<Self> {
        let account_sid = config.account_sid.trim();
        ensure!(!account_sid.is_empty(), "SMS account SID must not be empty!");
        ensure!(
            !config.auth_token.trim().is_empty(),
            "SMS auth token must not be empty!"
        );

        let messages_url = messages_url(&config.api_base, account_sid)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build SMS Reqwest client!")?;

        Ok(Self {
            client,
            messages_url,
            account_sid: account_sid.to_string(),
            auth_token: config.auth_token.clone(),
        })
    }
}

#[async_trait]
impl SmsProvider for TwilioClient {
    async fn send(&self, to: &PhoneNumber, from: &PhoneNumber, body: &str) -> Result<MessageSid> {
        let form = CreateMessageForm {
            to: to.as_str(),
            from: from.as_str(),
            body,
        };

        let response = self
            .client
            .post(self.messages_url.clone())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .context("Failed to reach SMS provider")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let detail = match serde_json::from_str::<TwilioErrorResponse>(&error_text) {
                Ok(TwilioErrorResponse {
                    code: Some(code),
                    message,
                }) => format!("{message} (code {code})"),
                Ok(TwilioErrorResponse { message, .. }) => message,
                Err(_) => error_text,
            };
            bail!("SMS provider returned {status}: {detail}");
        }

        let created = response
            .json::<CreateMessageResponse>()
            .await
            .context("Failed to parse SMS provider response")?;

        if created.sid.trim().is_empty() {
            bail!("SMS provider accepted message without a sid!");
        }

        debug!(
            "SMS provider accepted message {} with status {}",
            created.sid,
            created.status.as_deref().unwrap_or("unknown")
        );
        Ok(MessageSid::new(created.sid))
    }
}

/// {api_base}/2010-04-01/Accounts/{account_sid}/Messages.json
fn messages_url(api_base: &str, account_sid: &str) -> Result<Url> {
    let mut url = Url::parse(api_base.trim())
        .with_context(|| format!("Invalid SMS API base URL: {api_base}"))?;

    if !matches!(url.scheme(), "http" | "https") {
        bail!("SMS API base must be an http(s) URL, got {url}");
    }

    url.path_segments_mut()
        .map_err(|_| anyhow!("SMS API base cannot be used as a base URL: {api_base}"))?
        .pop_if_empty()
        .extend([MESSAGES_API_VERSION, "Accounts", account_sid, "Messages.json"]);

    Ok(url)
}
