/// OpenAI-compatible provider - secondary note generator
///
/// Any endpoint implementing `POST {base}/chat/completions` with JSON mode
/// works (OpenAI, Azure OpenAI behind a gateway, OpenRouter, vLLM).
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OpenAiConfig;
use crate::domain::Domain;
use crate::error::{GenerationError, GenerationResult};
use crate::parsing::interpret_reply;
use crate::prompts::{system_prompt, user_prompt};
use crate::providers::{
    first_success, status_error, transport_error, AttemptOutcome, NoteProvider, ProviderNote,
};

const PROVIDER: &str = "openai";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(config: &OpenAiConfig, client: reqwest::Client) -> GenerationResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::NotConfigured(PROVIDER));
        }
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    async fn chat(&self, domain: Domain, transcript: &str) -> GenerationResult<ProviderNote> {
        let url = format!("{}/chat/completions", self.api_base);
        let user = user_prompt(domain, transcript);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt(domain),
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: 0.2,
            response_format: ResponseFormat { kind: "json_object" },
        };

        debug!(model = %self.model, "Calling chat completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(GenerationError::ProviderEmptyResponse(PROVIDER))?;

        let fields = interpret_reply(&content, domain)?;
        Ok(ProviderNote {
            fields,
            model: self.model.clone(),
        })
    }
}

#[async_trait]
impl NoteProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, domain: Domain, transcript: &str) -> AttemptOutcome<ProviderNote> {
        let models = [self.model.clone()];
        first_success(PROVIDER, &models, |_| self.chat(domain, transcript)).await
    }
}
