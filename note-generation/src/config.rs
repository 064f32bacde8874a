use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, GenerationResult};

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODELS: [&str; 2] = ["gemini-1.5-flash", "gemini-1.5-pro"];
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TRANSCRIPT_CHARS: usize = 2000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Which provider the operator wants tried first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderPreference {
    /// Secondary first when configured, then primary, then secondary again
    #[default]
    Auto,
    /// Primary first; the secondary is only a trailing fallback
    Gemini,
    /// Secondary only; never falls through to the primary
    #[serde(rename = "openai")]
    OpenAi,
}

impl FromStr for ProviderPreference {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "" | "auto" => Ok(Self::Auto),
            "gemini" => Ok(Self::Gemini),
            // openai, openai-only, openai_only ...
            other if other.starts_with("openai") => Ok(Self::OpenAi),
            other => Err(GenerationError::Config(format!(
                "Unknown AI provider preference: {}",
                other
            ))),
        }
    }
}

/// Primary provider (Gemini generateContent API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Operator override, tried before the built-in defaults
    pub model: Option<String>,
    pub api_base: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: None,
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
        }
    }

    /// Ordered, de-duplicated candidate model identifiers.
    pub fn candidate_models(&self) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();
        let overrides = self.model.iter().map(|m| m.trim().to_string());
        let defaults = DEFAULT_GEMINI_MODELS.iter().map(|m| m.to_string());
        for model in overrides.chain(defaults) {
            if !model.is_empty() && !candidates.contains(&model) {
                candidates.push(model);
            }
        }
        candidates
    }
}

/// Secondary provider (OpenAI-compatible chat completions API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
        }
    }
}

/// Note generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteGenerationConfig {
    pub preference: ProviderPreference,
    pub gemini: Option<GeminiConfig>,
    pub openai: Option<OpenAiConfig>,
    /// Transcripts are cut to this many characters before prompting
    pub max_transcript_chars: usize,
    pub request_timeout_secs: u64,
}

impl Default for NoteGenerationConfig {
    fn default() -> Self {
        Self {
            preference: ProviderPreference::Auto,
            gemini: None,
            openai: None,
            max_transcript_chars: DEFAULT_MAX_TRANSCRIPT_CHARS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl NoteGenerationConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GenerationResult<Self> {
        let preference: ProviderPreference = std::env::var("AI_PROVIDER_PREFERENCE")
            .unwrap_or_default()
            .parse()?;

        let gemini = non_empty_var("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_key,
            model: non_empty_var("GEMINI_MODEL"),
            api_base: non_empty_var("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
        });

        let openai = non_empty_var("OPENAI_API_KEY").map(|api_key| OpenAiConfig {
            api_key,
            model: non_empty_var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            api_base: non_empty_var("OPENAI_API_BASE")
                .unwrap_or_else(|| DEFAULT_OPENAI_API_BASE.to_string()),
        });

        let max_transcript_chars = parse_var::<usize>("SCRIBE_MAX_TRANSCRIPT_CHARS")?
            .unwrap_or(DEFAULT_MAX_TRANSCRIPT_CHARS);

        let request_timeout_secs = parse_var::<u64>("SCRIBE_PROVIDER_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let config = Self {
            preference,
            gemini,
            openai,
            max_transcript_chars,
            request_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GenerationResult<()> {
        if self.max_transcript_chars == 0 {
            return Err(GenerationError::Config(
                "max_transcript_chars must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(GenerationError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(name: &str) -> GenerationResult<Option<T>> {
    match non_empty_var(name) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| GenerationError::Config(format!("{} has an invalid value: {}", name, raw))),
        None => Ok(None),
    }
}
