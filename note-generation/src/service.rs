use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{NoteGenerationConfig, ProviderPreference, DEFAULT_MAX_TRANSCRIPT_CHARS};
use crate::domain::{Domain, NoteDraft, NoteSource};
use crate::error::GenerationResult;
use crate::fallback::offline_note;
use crate::prompts::truncate_transcript;
use crate::providers::gemini::GeminiProvider;
use crate::providers::openai::OpenAiProvider;
use crate::providers::{build_http_client, AttemptFailure, AttemptOutcome, NoteProvider};

/// Provider position in the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderSlot {
    Primary,
    Secondary,
}

/// Order in which configured providers are tried.
///
/// Unconfigured slots are dropped, and a slot is never tried twice in a row.
pub fn provider_order(
    preference: ProviderPreference,
    has_primary: bool,
    has_secondary: bool,
) -> Vec<ProviderSlot> {
    use ProviderSlot::*;

    let mut order = match preference {
        ProviderPreference::Auto => vec![Secondary, Primary, Secondary],
        ProviderPreference::Gemini => vec![Primary, Secondary],
        ProviderPreference::OpenAi => vec![Secondary],
    };
    order.retain(|slot| match slot {
        Primary => has_primary,
        Secondary => has_secondary,
    });
    order.dedup();
    order
}

/// Note plus every failed attempt that preceded it
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub note: NoteDraft,
    pub failures: Vec<AttemptFailure>,
}

/// Clinical note generator with provider fallback
///
/// Never fails: when no provider yields a valid note, a deterministic
/// offline note carrying `_error` is returned instead.
pub struct NoteGenerator {
    primary: Option<Arc<dyn NoteProvider>>,
    secondary: Option<Arc<dyn NoteProvider>>,
    preference: ProviderPreference,
    max_transcript_chars: usize,
}

impl NoteGenerator {
    /// Build the generator and its HTTP providers from configuration.
    pub fn new(config: &NoteGenerationConfig) -> GenerationResult<Self> {
        config.validate()?;
        let client = build_http_client(config.request_timeout_secs)?;

        let primary = match config.gemini.as_ref().filter(|g| !g.api_key.trim().is_empty()) {
            Some(gemini) => {
                let provider = GeminiProvider::new(gemini, client.clone())?;
                Some(Arc::new(provider) as Arc<dyn NoteProvider>)
            }
            None => None,
        };

        let secondary = match config.openai.as_ref().filter(|o| !o.api_key.trim().is_empty()) {
            Some(openai) => {
                let provider = OpenAiProvider::new(openai, client)?;
                Some(Arc::new(provider) as Arc<dyn NoteProvider>)
            }
            None => None,
        };

        info!(
            preference = ?config.preference,
            primary = primary.is_some(),
            secondary = secondary.is_some(),
            "Note generator initialized"
        );

        Ok(Self::with_providers(primary, secondary, config.preference)
            .with_max_transcript_chars(config.max_transcript_chars))
    }

    /// Build from explicit provider instances.
    pub fn with_providers(
        primary: Option<Arc<dyn NoteProvider>>,
        secondary: Option<Arc<dyn NoteProvider>>,
        preference: ProviderPreference,
    ) -> Self {
        Self {
            primary,
            secondary,
            preference,
            max_transcript_chars: DEFAULT_MAX_TRANSCRIPT_CHARS,
        }
    }

    pub fn with_max_transcript_chars(mut self, max_chars: usize) -> Self {
        self.max_transcript_chars = max_chars.max(1);
        self
    }

    pub fn provider_order(&self) -> Vec<ProviderSlot> {
        provider_order(self.preference, self.primary.is_some(), self.secondary.is_some())
    }

    /// Generate a note for `transcript`.
    pub async fn generate(&self, transcript: &str, domain: Domain) -> NoteDraft {
        self.generate_with_report(transcript, domain).await.note
    }

    /// Generate a note and report every failed attempt.
    pub async fn generate_with_report(&self, transcript: &str, domain: Domain) -> GenerationReport {
        self.generate_on(transcript, domain, Utc::now().date_naive()).await
    }

    /// Like [`generate_with_report`](Self::generate_with_report), with the
    /// date stamped on offline notes supplied by the caller.
    pub async fn generate_on(
        &self,
        transcript: &str,
        domain: Domain,
        today: NaiveDate,
    ) -> GenerationReport {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            warn!(domain = %domain, "Empty transcript, returning offline note");
            return GenerationReport {
                note: offline_note(domain, transcript, "transcript unavailable", today),
                failures: Vec::new(),
            };
        }

        let prompt_text = truncate_transcript(transcript, self.max_transcript_chars);
        if prompt_text.len() < transcript.len() {
            info!(
                max_chars = self.max_transcript_chars,
                "Transcript truncated before prompting"
            );
        }
        debug!(
            domain = %domain,
            transcript = %logger_redacted::preview(prompt_text, 80),
            "Generating note"
        );

        let order = self.provider_order();
        if order.is_empty() {
            warn!(domain = %domain, "No AI provider configured, returning offline note");
            return GenerationReport {
                note: offline_note(domain, transcript, "no AI provider configured", today),
                failures: Vec::new(),
            };
        }

        let mut failures = Vec::new();
        let mut last_error = String::new();

        for slot in order {
            let provider = match slot {
                ProviderSlot::Primary => self.primary.as_ref(),
                ProviderSlot::Secondary => self.secondary.as_ref(),
            };
            let Some(provider) = provider else {
                continue;
            };

            match provider.generate(domain, prompt_text).await {
                AttemptOutcome::Success {
                    value,
                    failures: attempts,
                } => {
                    failures.extend(attempts);
                    info!(
                        provider = provider.name(),
                        model = %value.model,
                        domain = %domain,
                        failed_attempts = failures.len(),
                        "Note generated"
                    );
                    let source = match slot {
                        ProviderSlot::Primary => NoteSource::Primary { model: value.model },
                        ProviderSlot::Secondary => NoteSource::Secondary { model: value.model },
                    };
                    return GenerationReport {
                        note: NoteDraft::from_fields(domain, value.fields, source),
                        failures,
                    };
                }
                AttemptOutcome::Exhausted {
                    last_error: err,
                    failures: attempts,
                } => {
                    failures.extend(attempts);
                    warn!(
                        provider = provider.name(),
                        error_kind = err.kind(),
                        error = %err,
                        "Provider exhausted, falling through"
                    );
                    last_error = err.to_string();
                }
            }
        }

        warn!(
            domain = %domain,
            failed_attempts = failures.len(),
            "All providers failed, returning offline note"
        );
        GenerationReport {
            note: offline_note(domain, transcript, &last_error, today),
            failures,
        }
    }
}
