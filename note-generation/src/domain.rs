use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GenerationError, GenerationResult};

/// Clinical context selecting the prompt and note schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// SOAP note
    Medical,
    /// Dental encounter note
    Dental,
}

pub const MEDICAL_FIELDS: [&str; 4] = ["subjective", "objective", "assessment", "plan"];

pub const DENTAL_FIELDS: [&str; 14] = [
    "patient",
    "date",
    "dentist",
    "visitType",
    "chiefComplaint",
    "historyOfPresentIllness",
    "medicalHistory",
    "dentalHistory",
    "intraOralExamination",
    "diagnosticProcedures",
    "assessment",
    "educationRecommendations",
    "patientResponse",
    "plan",
];

pub const DENTAL_REQUIRED_FIELDS: [&str; 8] = [
    "patient",
    "date",
    "dentist",
    "visitType",
    "chiefComplaint",
    "historyOfPresentIllness",
    "assessment",
    "plan",
];

/// Medical coding arrays kept for older consumers of the SOAP note
pub const LEGACY_CODE_FIELDS: [&str; 2] = ["icdCodes", "cptCodes"];

impl Domain {
    /// Every key the note for this domain must carry.
    pub fn schema_fields(self) -> &'static [&'static str] {
        match self {
            Domain::Medical => &MEDICAL_FIELDS,
            Domain::Dental => &DENTAL_FIELDS,
        }
    }

    /// Keys that must hold a non-blank string.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Domain::Medical => &MEDICAL_FIELDS,
            Domain::Dental => &DENTAL_REQUIRED_FIELDS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Medical => "medical",
            Domain::Dental => "dental",
        }
    }

    /// Check a parsed provider object against the required-field set.
    ///
    /// A missing or blank required field fails the whole object; partial
    /// notes are never accepted.
    pub fn validate(self, value: Value) -> GenerationResult<Map<String, Value>> {
        let Value::Object(map) = value else {
            return Err(GenerationError::ResponseParse(
                "top-level JSON value is not an object".to_string(),
            ));
        };

        let missing: Vec<String> = self
            .required_fields()
            .iter()
            .filter(|field| {
                !matches!(map.get(**field), Some(Value::String(s)) if !s.trim().is_empty())
            })
            .map(|field| field.to_string())
            .collect();

        if missing.is_empty() {
            Ok(map)
        } else {
            Err(GenerationError::Validation(missing))
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "medical" | "soap" => Ok(Domain::Medical),
            "dental" => Ok(Domain::Dental),
            other => Err(GenerationError::Config(format!("Unknown note domain: {}", other))),
        }
    }
}

/// Where a note came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoteSource {
    Primary { model: String },
    Secondary { model: String },
    Offline,
}

/// Structured clinical note
///
/// Serializes as a flat JSON object holding the schema keys, any extra keys
/// the provider returned, and `_error` when the note is an offline fallback.
#[derive(Debug, Clone, Serialize)]
pub struct NoteDraft {
    #[serde(skip)]
    domain: Domain,
    #[serde(skip)]
    source: NoteSource,
    #[serde(flatten)]
    fields: Map<String, Value>,
    #[serde(rename = "_error", skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl NoteDraft {
    /// Build a note from validated provider fields.
    ///
    /// Every schema key ends up holding a string: missing keys become empty,
    /// and lists, objects, numbers or booleans a model put there are
    /// flattened to text.
    pub fn from_fields(domain: Domain, mut fields: Map<String, Value>, source: NoteSource) -> Self {
        for key in domain.schema_fields() {
            let text = match fields.get(*key) {
                Some(Value::String(_)) => continue,
                Some(value) => field_text(value),
                None => String::new(),
            };
            fields.insert(key.to_string(), Value::String(text));
        }

        if domain == Domain::Medical {
            for key in LEGACY_CODE_FIELDS {
                if !matches!(fields.get(key), Some(Value::Array(_))) {
                    fields.insert(key.to_string(), Value::Array(Vec::new()));
                }
            }
        }

        Self {
            domain,
            source,
            fields,
            error: None,
        }
    }

    pub(crate) fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn source(&self) -> &NoteSource {
        &self.source
    }

    /// `true` when no provider produced this note.
    pub fn is_fallback(&self) -> bool {
        self.source == NoteSource::Offline
    }

    /// Diagnostic set on the offline fallback path
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// String value of a field, if present and a string.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn to_value(&self) -> Value {
        let mut map = self.fields.clone();
        if let Some(error) = &self.error {
            map.insert("_error".to_string(), Value::String(error.clone()));
        }
        Value::Object(map)
    }
}

/// Plain text for a schema value that is not a string.
fn field_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.trim().to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(items) => items
            .iter()
            .map(field_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| (key, field_text(value)))
            .filter(|(_, text)| !text.is_empty())
            .map(|(key, text)| format!("{}: {}", key, text))
            .collect::<Vec<_>>()
            .join("; "),
    }
}
