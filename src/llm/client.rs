use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::config::EqgenConfig;
use crate::state_machine::Provider;

use super::TextCompleter;
use super::error::CompletionError;
use super::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, GenerateOptions, GenerateRequest,
    GenerateResponse,
};

/// Upper bound on a single completion call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// HTTP client for both completion backends.
///
/// Not `Debug`: it holds the DeepSeek key.
pub struct CompletionClient {
    client: Client,
    ollama_base_url: String,
    ollama_model: String,
    deepseek_api_url: String,
    deepseek_api_key: String,
    deepseek_model: String,
    temperature: f32,
    top_p: f32,
}

impl CompletionClient {
    pub fn new(config: &EqgenConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            ollama_base_url: config.ollama_base_url.trim_end_matches('/').to_string(),
            ollama_model: config.ollama_model.clone(),
            deepseek_api_url: config.deepseek_api_url.clone(),
            deepseek_api_key: config.deepseek_api_key.trim().to_string(),
            deepseek_model: config.deepseek_model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
        })
    }

    async fn call_ollama(&self, prompt: &str) -> Result<String, CompletionError> {
        let req = GenerateRequest {
            model: self.ollama_model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                top_p: self.top_p,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.ollama_base_url))
            .json(&req)
            .send()
            .await?;

        let body: GenerateResponse = decode("ollama", response).await?;
        body.response
            .ok_or_else(|| CompletionError::InvalidResponse {
                backend: "ollama",
                detail: "missing `response` field".into(),
            })
    }

    async fn call_deepseek(&self, prompt: &str) -> Result<String, CompletionError> {
        if self.deepseek_api_key.is_empty() {
            return Err(CompletionError::MissingApiKey);
        }

        let req = ChatCompletionRequest {
            model: self.deepseek_model.clone(),
            messages: vec![ChatMessage {
                role: "user".into(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            top_p: self.top_p,
        };

        let response = self
            .client
            .post(&self.deepseek_api_url)
            .bearer_auth(&self.deepseek_api_key)
            .json(&req)
            .send()
            .await?;

        let body: ChatCompletionResponse = decode("deepseek", response).await?;
        body.first_content()
            .ok_or_else(|| CompletionError::InvalidResponse {
                backend: "deepseek",
                detail: "missing `choices[0].message.content`".into(),
            })
    }
}

/// Check the status and decode a JSON body, mapping failures to [`CompletionError`].
async fn decode<T: DeserializeOwned>(
    backend: &'static str,
    response: Response,
) -> Result<T, CompletionError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(CompletionError::ApiError {
            status: status.as_u16(),
            message,
        });
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| CompletionError::InvalidResponse {
        backend,
        detail: e.to_string(),
    })
}

impl TextCompleter for CompletionClient {
    async fn complete(&self, prompt: &str, provider: Provider) -> Result<String, CompletionError> {
        match provider {
            Provider::Ollama => self.call_ollama(prompt).await,
            Provider::Deepseek => self.call_deepseek(prompt).await,
        }
    }
}
