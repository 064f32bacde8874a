//! End-to-end pipeline tests against mock provider endpoints
//!
//! Each test stands up a mock HTTP server, points the Gemini and/or
//! OpenAI-compatible provider at it, and checks which tier produced the note.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use mockito::{Matcher, Server, ServerGuard};
use note_generation::*;
use serde_json::{json, Value};

const GEMINI_KEY: &str = "test-gemini-key";
const OPENAI_KEY: &str = "sk-test";

fn gemini_body(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

fn chat_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

fn soap_json() -> Value {
    json!({
        "subjective": "Dry cough for three days",
        "objective": "Lungs clear to auscultation",
        "assessment": "Viral upper respiratory infection",
        "plan": "Fluids, rest, return if fever develops"
    })
}

fn config(server: &ServerGuard, gemini: bool, openai: bool, preference: ProviderPreference) -> NoteGenerationConfig {
    NoteGenerationConfig {
        preference,
        gemini: gemini.then(|| GeminiConfig {
            api_key: GEMINI_KEY.to_string(),
            model: None,
            api_base: server.url(),
        }),
        openai: openai.then(|| OpenAiConfig {
            api_key: OPENAI_KEY.to_string(),
            model: "gpt-4o-mini".to_string(),
            api_base: server.url(),
        }),
        max_transcript_chars: 2000,
        request_timeout_secs: 5,
    }
}

fn gemini_path(version: &str, model: &str) -> String {
    format!("/{}/models/{}:generateContent", version, model)
}

#[tokio::test]
async fn test_fenced_json_with_trailing_comma_parses_directly() {
    let mut server = Server::new_async().await;
    let text = "```json\n{\"subjective\":\"Dry cough\",\"objective\":\"Clear lungs\",\"assessment\":\"Viral URI\",\"plan\":\"Fluids\",}\n```";
    let mock = server
        .mock("POST", gemini_path("v1beta", "gemini-1.5-flash").as_str())
        .match_header("x-goog-api-key", GEMINI_KEY)
        .match_body(Matcher::PartialJson(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_body(text))
        .expect(1)
        .create_async()
        .await;

    let generator = NoteGenerator::new(&config(&server, true, false, ProviderPreference::Auto)).unwrap();
    let note = generator.generate("Patient has a dry cough", Domain::Medical).await;

    mock.assert_async().await;
    assert_eq!(
        note.source(),
        &NoteSource::Primary { model: "gemini-1.5-flash".to_string() }
    );
    assert_eq!(note.get("subjective"), Some("Dry cough"));
    assert_eq!(note.fields().get("icdCodes"), Some(&json!([])));
    assert_eq!(note.fields().get("cptCodes"), Some(&json!([])));
    assert!(note.error().is_none());
}

#[tokio::test]
async fn test_prose_wrapped_object_is_extracted() {
    let mut server = Server::new_async().await;
    let text = format!(
        "Here is the SOAP note you asked for:\n{}\nLet me know if anything should change.",
        soap_json()
    );
    server
        .mock("POST", gemini_path("v1beta", "gemini-1.5-flash").as_str())
        .with_status(200)
        .with_body(gemini_body(&text))
        .create_async()
        .await;

    let generator = NoteGenerator::new(&config(&server, true, false, ProviderPreference::Gemini)).unwrap();
    let note = generator.generate("cough", Domain::Medical).await;

    assert!(!note.is_fallback());
    assert_eq!(note.get("plan"), Some("Fluids, rest, return if fever develops"));
}

#[tokio::test]
async fn test_next_candidate_model_after_failure() {
    let mut server = Server::new_async().await;
    let flash = server
        .mock("POST", gemini_path("v1beta", "gemini-1.5-flash").as_str())
        .with_status(500)
        .with_body("{\"error\": {\"message\": \"internal\"}}")
        .expect(1)
        .create_async()
        .await;
    let pro = server
        .mock("POST", gemini_path("v1beta", "gemini-1.5-pro").as_str())
        .with_status(200)
        .with_body(gemini_body(&soap_json().to_string()))
        .expect(1)
        .create_async()
        .await;

    let generator = NoteGenerator::new(&config(&server, true, false, ProviderPreference::Gemini)).unwrap();
    let report = generator.generate_with_report("cough", Domain::Medical).await;

    flash.assert_async().await;
    pro.assert_async().await;
    assert_eq!(
        report.note.source(),
        &NoteSource::Primary { model: "gemini-1.5-pro".to_string() }
    );
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, "provider_status");
    assert_eq!(report.failures[0].model.as_deref(), Some("gemini-1.5-flash"));
}

#[tokio::test]
async fn test_rest_endpoint_used_after_every_model_fails() {
    let mut server = Server::new_async().await;
    let sdk = server
        .mock("POST", Matcher::Regex(r"^/v1beta/models/.+:generateContent$".to_string()))
        .with_status(404)
        .with_body("{\"error\": {\"message\": \"model not found\"}}")
        .expect(2)
        .create_async()
        .await;
    let rest = server
        .mock("POST", gemini_path("v1", "gemini-1.5-flash").as_str())
        .with_status(200)
        .with_body(gemini_body(&soap_json().to_string()))
        .expect(1)
        .create_async()
        .await;

    let generator = NoteGenerator::new(&config(&server, true, false, ProviderPreference::Gemini)).unwrap();
    let report = generator.generate_with_report("cough", Domain::Medical).await;

    sdk.assert_async().await;
    rest.assert_async().await;
    assert!(!report.note.is_fallback());
    assert_eq!(report.failures.len(), 2);
}

#[tokio::test]
async fn test_blank_required_field_is_never_returned() {
    let mut server = Server::new_async().await;
    let blank = json!({"subjective": "", "objective": "ok", "assessment": "x", "plan": "y"}).to_string();
    server
        .mock("POST", Matcher::Any)
        .with_status(200)
        .with_body(gemini_body(&blank))
        .create_async()
        .await;

    let generator = NoteGenerator::new(&config(&server, true, false, ProviderPreference::Gemini)).unwrap();
    let report = generator.generate_with_report("cough", Domain::Medical).await;

    assert!(report.note.is_fallback());
    assert!(report.note.error().unwrap().contains("subjective"));
    assert!(!report.note.get("subjective").unwrap().is_empty());
    // two SDK attempts, two REST attempts
    assert_eq!(report.failures.len(), 4);
    assert!(report.failures.iter().all(|f| f.kind == "validation"));
}

#[tokio::test]
async fn test_auto_mode_uses_secondary_first() {
    let mut server = Server::new_async().await;
    let chat = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", format!("Bearer {}", OPENAI_KEY).as_str())
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "response_format": { "type": "json_object" }
        })))
        .with_status(200)
        .with_body(chat_body(&soap_json().to_string()))
        .expect(1)
        .create_async()
        .await;
    let gemini = server
        .mock("POST", Matcher::Regex("generateContent".to_string()))
        .expect(0)
        .create_async()
        .await;

    let generator = NoteGenerator::new(&config(&server, true, true, ProviderPreference::Auto)).unwrap();
    let note = generator.generate("cough", Domain::Medical).await;

    chat.assert_async().await;
    gemini.assert_async().await;
    assert_eq!(
        note.source(),
        &NoteSource::Secondary { model: "gpt-4o-mini".to_string() }
    );
}

#[tokio::test]
async fn test_dental_offline_note_when_everything_fails() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", Matcher::Any)
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let generator = NoteGenerator::new(&config(&server, true, true, ProviderPreference::Auto)).unwrap();
    let transcript = "Hello, I'm Maria and my tooth hurts";
    let report = generator.generate_with_report(transcript, Domain::Dental).await;
    let note = report.note;

    assert!(note.is_fallback());
    assert!(note.error().unwrap().contains("503"));
    assert_eq!(note.get("patient"), Some("Maria"));
    assert_eq!(note.get("chiefComplaint"), Some(transcript));
    for field in Domain::Dental.schema_fields() {
        assert!(note.fields().contains_key(*field), "{} missing", field);
    }
    for field in Domain::Dental.required_fields() {
        assert!(!note.get(field).unwrap().is_empty(), "{} empty", field);
    }

    // secondary, four gemini attempts, secondary again
    let providers: Vec<_> = report.failures.iter().map(|f| f.provider).collect();
    assert_eq!(
        providers,
        vec!["openai", "gemini", "gemini", "gemini", "gemini", "openai"]
    );

    let value = serde_json::to_value(&note).unwrap();
    assert!(value["_error"].is_string());
}

#[tokio::test]
async fn test_empty_choice_content_is_a_failure() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(chat_body(""))
        .create_async()
        .await;

    let generator = NoteGenerator::new(&config(&server, false, true, ProviderPreference::OpenAi)).unwrap();
    let report = generator.generate_with_report("cough", Domain::Medical).await;

    assert!(report.note.is_fallback());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, "provider_empty_response");
}
