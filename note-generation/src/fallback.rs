//! Deterministic offline note, used when no provider produced a valid note.
//!
//! Patient and dentist names are guessed with English-language patterns
//! ("my name is Ana", "Dr. Chen"). The guesses are approximate annotations
//! for a clinician to correct, not extracted facts.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::domain::{Domain, NoteDraft, NoteSource};

/// Characters of transcript copied into the dental chief complaint
pub const CHIEF_COMPLAINT_CHARS: usize = 500;

const NOT_DOCUMENTED: &str = "Not documented";

lazy_static! {
    static ref PATIENT_NAME: Regex = pattern(
        r"\b(?i:my name is|name is|i'm|i am|patient(?:'s)?(?: name)?(?: is)?:?)\s+([A-Z][A-Za-z'\-]+(?:\s+[A-Z][A-Za-z'\-]+)?)"
    );
    static ref DENTIST_NAME: Regex = pattern(r"\b(?i:dr\.?|doctor)\s+([A-Z][A-Za-z'\-]+)");
}

#[allow(clippy::unwrap_used)]
fn pattern(re: &str) -> Regex {
    Regex::new(re).unwrap()
}

/// Best-effort patient name guess.
pub fn extract_patient_name(transcript: &str) -> Option<String> {
    PATIENT_NAME
        .captures(transcript)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Best-effort dentist name guess, formatted as `Dr. <Name>`.
pub fn extract_dentist_name(transcript: &str) -> Option<String> {
    DENTIST_NAME
        .captures(transcript)
        .and_then(|caps| caps.get(1))
        .map(|m| format!("Dr. {}", m.as_str().trim()))
}

/// Build the offline note for `domain`, stamping `error` as the diagnostic.
pub fn offline_note(domain: Domain, transcript: &str, error: &str, today: NaiveDate) -> NoteDraft {
    let fields = match domain {
        Domain::Medical => medical_template(),
        Domain::Dental => dental_template(transcript, today),
    };
    NoteDraft::from_fields(domain, fields, NoteSource::Offline).with_error(error)
}

fn medical_template() -> Map<String, Value> {
    let mut fields = Map::new();
    let mut set = |key: &str, value: &str| {
        fields.insert(key.to_string(), Value::String(value.to_string()));
    };
    set(
        "subjective",
        "Automatic note generation was unavailable. Review the encounter transcript and document the patient's reported history.",
    );
    set("objective", "Examination findings not captured. Please document manually.");
    set("assessment", "Assessment pending clinician review.");
    set("plan", "Plan pending clinician review.");
    fields
}

fn dental_template(transcript: &str, today: NaiveDate) -> Map<String, Value> {
    let transcript = transcript.trim();
    let chief_complaint = if transcript.is_empty() {
        NOT_DOCUMENTED.to_string()
    } else {
        transcript.chars().take(CHIEF_COMPLAINT_CHARS).collect()
    };

    let patient = extract_patient_name(transcript).unwrap_or_else(|| "Patient".to_string());
    let dentist = extract_dentist_name(transcript).unwrap_or_else(|| "Treating dentist".to_string());

    let mut fields = Map::new();
    let mut set = |key: &str, value: String| {
        fields.insert(key.to_string(), Value::String(value));
    };
    set("patient", patient);
    set("date", today.format("%Y-%m-%d").to_string());
    set("dentist", dentist);
    set("visitType", "Dental consultation".to_string());
    set("chiefComplaint", chief_complaint);
    set(
        "historyOfPresentIllness",
        "Automatic note generation was unavailable. See the encounter transcript.".to_string(),
    );
    set("medicalHistory", NOT_DOCUMENTED.to_string());
    set("dentalHistory", NOT_DOCUMENTED.to_string());
    set("intraOralExamination", NOT_DOCUMENTED.to_string());
    set("diagnosticProcedures", NOT_DOCUMENTED.to_string());
    set("assessment", "Assessment pending dentist review.".to_string());
    set("educationRecommendations", NOT_DOCUMENTED.to_string());
    set("patientResponse", NOT_DOCUMENTED.to_string());
    set("plan", "Treatment plan pending dentist review.".to_string());
    fields
}
