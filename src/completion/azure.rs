use crate::completion::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatRequestMessage, ChatRole,
    ProviderErrorResponse,
};
use crate::completion::CompletionProvider;
use crate::config::CompletionConfig;
use anyhow::{anyhow, bail, ensure, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::log::debug;

/// Chat completions against an Azure OpenAI deployment.
pub struct AzureOpenAIClient {
    client: Client,
    completions_url: Url,
    api_key: String,
    system_prompt: String,
    max_tokens: u32,
    temperature: f32,
}
impl AzureOpenAIClient {
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        ensure!(
            !config.api_key.trim().is_empty(),
            "Completion API key must not be empty!"
        );
        ensure!(
            !config.deployment.trim().is_empty(),
            "Completion deployment must not be empty!"
        );

        let completions_url = completions_url(config)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build completion Reqwest client!")?;

        Ok(Self {
            client,
            completions_url,
            api_key: config.api_key.clone(),
            system_prompt: config.system_prompt.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl CompletionProvider for AzureOpenAIClient {
    async fn complete(&self, user_text: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            messages: [
                ChatRequestMessage {
                    role: ChatRole::System,
                    content: &self.system_prompt,
                },
                ChatRequestMessage {
                    role: ChatRole::User,
                    content: user_text,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        };

        debug!(
            "Requesting completion for {} character message",
            user_text.chars().count()
        );
        let response = self
            .client
            .post(self.completions_url.clone())
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach completion provider")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let detail = match serde_json::from_str::<ProviderErrorResponse>(&error_text) {
                Ok(ProviderErrorResponse { error }) => match error.code {
                    Some(code) => format!("{} ({code})", error.message),
                    None => error.message,
                },
                Err(_) => error_text,
            };
            bail!("Completion provider returned {status}: {detail}");
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .context("Failed to parse completion provider response")?;

        Ok(completion.into_reply())
    }
}

/// {endpoint}/openai/deployments/{deployment}/chat/completions?api-version={version}
fn completions_url(config: &CompletionConfig) -> Result<Url> {
    let mut url = Url::parse(config.endpoint.trim())
        .with_context(|| format!("Invalid completion endpoint URL: {}", config.endpoint))?;

    if !matches!(url.scheme(), "http" | "https") {
        bail!("Completion endpoint must be an http(s) URL, got {url}");
    }

    url.path_segments_mut()
        .map_err(|_| anyhow!("Completion endpoint cannot be used as a base URL: {}", config.endpoint))?
        .pop_if_empty()
        .extend([
            "openai",
            "deployments",
            config.deployment.trim(),
            "chat",
            "completions",
        ]);
    url.query_pairs_mut()
        .clear()
        .append_pair("api-version", &config.api_version);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{DEFAULT_SYSTEM_PROMPT, FALLBACK_REPLY};
    use crate::testing::completion_config as test_config;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DEPLOYMENT_PATH: &str = "/openai/deployments/jokes/chat/completions";

    async fn setup_mock_server(response: ResponseTemplate) -> (MockServer, AzureOpenAIClient) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(DEPLOYMENT_PATH))
            .and(query_param("api-version", "2024-02-01"))
            .and(header("api-key", "test-azure-key"))
            .respond_with(response)
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = AzureOpenAIClient::new(&test_config(mock_server.uri())).unwrap();
        (mock_server, client)
    }

    #[tokio::test]
    async fn test_complete_basic() -> Result<()> {
        let (_server, client) = setup_mock_server(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": " Why did 7 go to therapy? It had square root issues. "
                },
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 220, "completion_tokens": 14, "total_tokens": 234}
        })))
        .await;

        let reply = client.complete("What is the square root of 49?").await?;
        assert_eq!(reply, "Why did 7 go to therapy? It had square root issues.");
        Ok(())
    }

    #[tokio::test]
    async fn test_request_payload() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(DEPLOYMENT_PATH))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "system", "content": DEFAULT_SYSTEM_PROMPT},
                    {"role": "user", "content": "Can plants grow without sunlight?"}
                ],
                "max_tokens": 75,
                "temperature": 0.7,
                "frequency_penalty": 0.0,
                "presence_penalty": 0.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Shady business."}}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = AzureOpenAIClient::new(&test_config(mock_server.uri()))?;
        assert_eq!(
            client.complete("Can plants grow without sunlight?").await?,
            "Shady business."
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_no_choices_fallback() -> Result<()> {
        let (_server, client) =
            setup_mock_server(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
                .await;

        assert_eq!(client.complete("Anything?").await?, FALLBACK_REPLY);
        Ok(())
    }

    #[tokio::test]
    async fn test_provider_error() {
        let (_server, client) = setup_mock_server(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "code": "401",
                "message": "Access denied due to invalid subscription key."
            }
        })))
        .await;

        let error = client.complete("Hello").await.unwrap_err().to_string();
        assert!(error.contains("401"), "{error}");
        assert!(error.contains("Access denied"), "{error}");
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let (_server, client) =
            setup_mock_server(ResponseTemplate::new(200).set_body_string("not json")).await;

        assert!(client.complete("Hello").await.is_err());
    }

    #[test]
    fn test_completions_url() {
        let url = completions_url(&test_config(
            "https://example.openai.azure.com/".to_string(),
        ))
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.openai.azure.com/openai/deployments/jokes/chat/completions?api-version=2024-02-01"
        );

        let url = completions_url(&test_config("https://example.openai.azure.com".to_string()))
            .unwrap();
        assert_eq!(url.path(), DEPLOYMENT_PATH);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(AzureOpenAIClient::new(&test_config(String::new())).is_err());
        assert!(AzureOpenAIClient::new(&test_config("not a url".to_string())).is_err());
        assert!(AzureOpenAIClient::new(&test_config("ftp://example.com".to_string())).is_err());
        assert!(AzureOpenAIClient::new(&test_config("mailto:jokes@example.com".to_string())).is_err());

        let mut config = test_config("https://example.openai.azure.com/".to_string());
        config.api_key = " ".to_string();
        assert!(AzureOpenAIClient::new(&config).is_err());
    }
}
