use crate::completion::DEFAULT_SYSTEM_PROMPT;
use crate::sms::PhoneNumber;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use tracing::log::debug;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const ENV_COMPLETION_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
pub const ENV_COMPLETION_KEY: &str = "AZURE_OPENAI_KEY";
pub const ENV_COMPLETION_DEPLOYMENT: &str = "AZURE_OPENAI_DEPLOYMENT";
pub const ENV_SMS_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
pub const ENV_SMS_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const ENV_SMS_PHONE_NUMBER: &str = "TWILIO_PHONE_NUMBER";

/// Secrets are never read from the config file, only from the environment.
#[derive(Default, Deserialize)]
pub struct AppConfig {
    #[cfg(feature = "sentry")]
    pub sentry: Option<SentryConfig>,

    #[serde(default)]
    pub http: HTTPConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub sms: SmsConfig,
}
impl AppConfig {
    /// Load the optional TOML file, merge the environment on top and validate.
    pub fn load(config_filepath: Option<PathBuf>) -> Result<Self> {
        Self::load_with(
            config_filepath,
            Path::new(DEFAULT_CONFIG_PATH),
            |key| std::env::var(key).ok(),
        )
    }

    /// An explicit config path must exist, the default path is only read if present.
    fn load_with(
        config_filepath: Option<PathBuf>,
        default_path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = match config_filepath {
            Some(path) => Self::from_file(&path)?,
            None if default_path.exists() => Self::from_file(default_path)?,
            None => {
                debug!("No {default_path:?} found, using environment only");
                Self::default()
            }
        };

        config.apply_env(lookup);
        config.validate()?;
        Ok(config)
    }

    fn from_file(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {config_path:?}"))?;

        toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse TOML config file: {config_path:?}"))
    }

    /// Environment values take priority over anything in the config file.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fields = [
            (ENV_COMPLETION_ENDPOINT, &mut self.completion.endpoint),
            (ENV_COMPLETION_KEY, &mut self.completion.api_key),
            (ENV_COMPLETION_DEPLOYMENT, &mut self.completion.deployment),
            (ENV_SMS_ACCOUNT_SID, &mut self.sms.account_sid),
            (ENV_SMS_AUTH_TOKEN, &mut self.sms.auth_token),
            (ENV_SMS_PHONE_NUMBER, &mut self.sms.phone_number),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key) {
                *field = value;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        require(&self.completion.endpoint, ENV_COMPLETION_ENDPOINT)?;
        require(&self.completion.api_key, ENV_COMPLETION_KEY)?;
        require(&self.completion.deployment, ENV_COMPLETION_DEPLOYMENT)?;
        require(&self.sms.account_sid, ENV_SMS_ACCOUNT_SID)?;
        require(&self.sms.auth_token, ENV_SMS_AUTH_TOKEN)?;
        require(&self.sms.phone_number, ENV_SMS_PHONE_NUMBER)?;

        self.sms.sender_number()?;

        if !(0.0..=2.0).contains(&self.completion.temperature) {
            bail!(
                "Completion temperature must be between 0 and 2, got {}",
                self.completion.temperature
            );
        }
        if self.completion.max_tokens == 0 {
            bail!("Completion max_tokens must be greater than 0!");
        }

        Ok(())
    }
}

fn require(value: &str, env_key: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("Missing required {env_key} environment variable!");
    }
    Ok(())
}

#[derive(Clone, Deserialize)]
pub struct CompletionConfig {
    #[serde(default)]
    pub endpoint: String,

    #[serde(skip)]
    pub api_key: String,

    #[serde(default)]
    pub deployment: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}
impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            deployment: String::new(),
            api_version: default_api_version(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct SmsConfig {
    #[serde(default)]
    pub account_sid: String,

    #[serde(skip)]
    pub auth_token: String,

    /// The number replies are sent from.
    #[serde(default)]
    pub phone_number: String,

    #[serde(default = "default_sms_api_base")]
    pub api_base: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}
impl SmsConfig {
    pub fn sender_number(&self) -> Result<PhoneNumber> {
        self.phone_number
            .parse()
            .with_context(|| format!("Invalid sender phone number in {ENV_SMS_PHONE_NUMBER}"))
    }
}
impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            phone_number: String::new(),
            api_base: default_sms_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[cfg(feature = "sentry")]
#[derive(Debug, Deserialize)]
pub struct SentryConfig {
    pub dsn: String,

    #[serde(default)]
    pub environment: Option<String>,

    #[serde(default)]
    pub server_name: Option<String>,

    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HTTPConfig {
    #[serde(default = "default_http_address")]
    pub address: SocketAddr,

    /// Reject inbound senders that are not `+` prefixed.
    #[serde(default = "default_true")]
    pub international_format_only: bool,

    #[serde(default)]
    pub tls: Option<TLSConfig>,
}
impl Default for HTTPConfig {
    fn default() -> Self {
        Self {
            address: default_http_address(),
            international_format_only: default_true(),
            tls: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TLSConfig {
    #[serde(deserialize_with = "deserialize_existing_file")]
    pub certificate_path: PathBuf,

    #[serde(deserialize_with = "deserialize_existing_file")]
    pub key_path: PathBuf,
}

fn default_api_version() -> String {
    "2024-02-01".to_string()
}
fn default_max_tokens() -> u32 {
    75
}
fn default_temperature() -> f32 {
    0.7
}
fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_sms_api_base() -> String {
    "https://api.twilio.com".to_string()
}
fn default_true() -> bool {
    true
}
fn default_http_address() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 3000)
}

fn deserialize_existing_file<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let path = PathBuf::deserialize(deserializer)?;
    if !path.is_file() {
        return Err(serde::de::Error::custom(format!(
            "File does not exist: {}",
            path.display()
        )));
    }
    Ok(path)
}
