/// Gemini provider - primary note generator
///
/// Tries each candidate model against the `v1beta` generateContent endpoint
/// with JSON output requested. When every candidate fails there, the same
/// list is replayed against the plain `v1` REST endpoint without the JSON
/// output hint, which older model revisions reject.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::GeminiConfig;
use crate::domain::Domain;
use crate::error::{GenerationError, GenerationResult};
use crate::parsing::interpret_reply;
use crate::prompts::combined_prompt;
use crate::providers::{
    first_success, status_error, transport_error, AttemptOutcome, NoteProvider, ProviderNote,
};

const PROVIDER: &str = "gemini";
const SDK_API_VERSION: &str = "v1beta";
const REST_API_VERSION: &str = "v1";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    candidates: Vec<String>,
}

impl GeminiProvider {
    pub fn new(config: &GeminiConfig, client: reqwest::Client) -> GenerationResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(GenerationError::NotConfigured(PROVIDER));
        }
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            candidates: config.candidate_models(),
        })
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    async fn attempt(
        &self,
        api_version: &'static str,
        model: String,
        prompt: &str,
        domain: Domain,
    ) -> GenerationResult<ProviderNote> {
        let text = self.generate_content(api_version, &model, prompt).await?;
        let fields = interpret_reply(&text, domain)?;
        Ok(ProviderNote { fields, model })
    }

    async fn generate_content(
        &self,
        api_version: &'static str,
        model: &str,
        prompt: &str,
    ) -> GenerationResult<String> {
        let url = format!(
            "{}/{}/models/{}:generateContent",
            self.api_base, api_version, model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 2048,
                response_mime_type: (api_version == SDK_API_VERSION).then_some("application/json"),
            },
        };

        debug!(model = model, api_version = api_version, "Calling Gemini generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::ProviderEmptyResponse(PROVIDER));
        }
        Ok(text)
    }
}

#[async_trait]
impl NoteProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, domain: Domain, transcript: &str) -> AttemptOutcome<ProviderNote> {
        let prompt = combined_prompt(domain, transcript);

        let sdk = first_success(PROVIDER, &self.candidates, |model| {
            self.attempt(SDK_API_VERSION, model, &prompt, domain)
        })
        .await;

        let earlier = match sdk {
            success @ AttemptOutcome::Success { .. } => return success,
            AttemptOutcome::Exhausted { failures, .. } => failures,
        };

        warn!(
            candidates = self.candidates.len(),
            "All Gemini models failed, retrying through the v1 REST endpoint"
        );

        let rest = first_success(PROVIDER, &self.candidates, |model| {
            self.attempt(REST_API_VERSION, model, &prompt, domain)
        })
        .await;

        if rest.is_success() {
            info!("Gemini REST fallback produced a note");
        }
        rest.after(earlier)
    }
}
