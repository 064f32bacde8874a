//! Prompt templates per domain

use crate::domain::{Domain, DENTAL_FIELDS};

const MEDICAL_SYSTEM: &str = "You are an experienced medical scribe. You convert clinical \
encounter transcripts into concise, accurate SOAP notes. Only document what is stated or \
clearly implied in the transcript. Respond with a single JSON object and nothing else.";

const DENTAL_SYSTEM: &str = "You are an experienced dental scribe. You convert dental \
encounter transcripts into structured clinical notes using standard dental terminology \
and tooth numbering. Only document what is stated or clearly implied in the transcript. \
Respond with a single JSON object and nothing else.";

/// System instructions for chat-style providers.
pub fn system_prompt(domain: Domain) -> &'static str {
    match domain {
        Domain::Medical => MEDICAL_SYSTEM,
        Domain::Dental => DENTAL_SYSTEM,
    }
}

/// User message carrying the schema description and the transcript.
pub fn user_prompt(domain: Domain, transcript: &str) -> String {
    match domain {
        Domain::Medical => format!(
            "Create a SOAP note from the transcript below.\n\n\
             Return JSON with exactly these keys:\n\
             - \"subjective\": chief complaint, history of present illness, symptoms as reported by the patient\n\
             - \"objective\": vital signs, examination findings, test results\n\
             - \"assessment\": diagnoses or differential diagnoses\n\
             - \"plan\": treatment, medications, follow-up\n\
             - \"icdCodes\": array of suggested ICD-10 codes (may be empty)\n\
             - \"cptCodes\": array of suggested CPT codes (may be empty)\n\n\
             Every text field must be a non-empty string. Write \"Not documented\" when the \
             transcript does not cover a section.\n\n\
             Transcript:\n\"\"\"\n{}\n\"\"\"",
            transcript
        ),
        Domain::Dental => {
            let keys = DENTAL_FIELDS
                .iter()
                .map(|k| format!("\"{}\"", k))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "Create a dental clinical note from the transcript below.\n\n\
                 Return JSON with exactly these string keys: {}.\n\
                 \"patient\", \"date\", \"dentist\", \"visitType\", \"chiefComplaint\", \
                 \"historyOfPresentIllness\", \"assessment\" and \"plan\" must never be empty; \
                 use \"Not stated\" when the transcript does not say. Other keys may be empty \
                 strings. Use YYYY-MM-DD for \"date\". Reference teeth by Universal numbering.\n\n\
                 Transcript:\n\"\"\"\n{}\n\"\"\"",
                keys, transcript
            )
        }
    }
}

/// Single prompt for completion-style providers that take no system message.
pub fn combined_prompt(domain: Domain, transcript: &str) -> String {
    format!("{}\n\n{}", system_prompt(domain), user_prompt(domain, transcript))
}

/// Cut `transcript` to at most `max_chars` characters.
pub fn truncate_transcript(transcript: &str, max_chars: usize) -> &str {
    match transcript.char_indices().nth(max_chars) {
        Some((idx, _)) => transcript.get(..idx).unwrap_or(transcript),
        None => transcript,
    }
}
