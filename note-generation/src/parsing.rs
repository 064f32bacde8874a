//! Recovery of a JSON object from free-form model output.
//!
//! Cleaning runs once, then three strategies are tried in order; the first
//! that yields a JSON object wins. Each strategy is a pure function so it can
//! be exercised against malformed fixtures on its own.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::Domain;
use crate::error::{GenerationError, GenerationResult};

lazy_static! {
    static ref CODE_FENCE: Regex = pattern(r"```[A-Za-z0-9_-]*");
    static ref TRAILING_COMMA: Regex = pattern(r",(\s*[}\]])");
    static ref BRACED_SPAN: Regex = pattern(r"(?s)\{.*\}");
}

#[allow(clippy::unwrap_used)]
fn pattern(re: &str) -> Regex {
    Regex::new(re).unwrap()
}

/// A named recovery strategy.
pub type Strategy = (&'static str, fn(&str) -> Option<Value>);

pub const STRATEGIES: [Strategy; 3] = [
    ("direct", parse_direct),
    ("braced_span", parse_braced_span),
    ("balanced_block", parse_balanced_block),
];

/// Strip code fences, control and zero-width characters, and trailing commas.
pub fn clean_response(text: &str) -> String {
    let unfenced = CODE_FENCE.replace_all(text, "");
    let printable: String = unfenced
        .chars()
        .filter(|c| !is_invisible(*c))
        .collect();
    strip_trailing_commas(&printable).trim().to_string()
}

fn is_invisible(c: char) -> bool {
    match c {
        '\n' | '\r' | '\t' => false,
        '\u{200B}'..='\u{200F}' | '\u{2060}' | '\u{FEFF}' => true,
        other => other.is_control(),
    }
}

pub fn strip_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}

/// Strategy (a): the cleaned text is the object.
pub fn parse_direct(text: &str) -> Option<Value> {
    parse_object(text)
}

/// Strategy (b): first `{` through last `}`, ignoring prose around it.
pub fn parse_braced_span(text: &str) -> Option<Value> {
    let span = BRACED_SPAN.find(text)?;
    parse_object(&strip_trailing_commas(span.as_str()))
}

/// Strategy (c): first block whose braces balance, scanning line by line.
///
/// Braces inside string literals are not counted.
pub fn parse_balanced_block(text: &str) -> Option<Value> {
    let mut block = String::new();
    let mut depth = 0usize;
    let mut started = false;
    let mut in_string = false;
    let mut escaped = false;

    for line in text.lines() {
        let segment = if started {
            line
        } else {
            match line.find('{') {
                Some(pos) => {
                    started = true;
                    line.get(pos..).unwrap_or(line)
                }
                None => continue,
            }
        };

        for c in segment.chars() {
            block.push(c);
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return parse_object(&strip_trailing_commas(&block));
                    }
                }
                _ => {}
            }
        }
        block.push('\n');
    }

    None
}

/// Clean `text` and run the strategies in order.
pub fn parse_note_json(text: &str) -> Option<Value> {
    let cleaned = clean_response(text);
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let parsed = strategy(&cleaned);
        if parsed.is_some() {
            debug!(strategy = name, "Recovered JSON object from provider response");
        }
        parsed
    })
}

/// Parse and validate a provider reply for `domain`.
pub fn interpret_reply(text: &str, domain: Domain) -> GenerationResult<Map<String, Value>> {
    let value = parse_note_json(text)
        .ok_or_else(|| GenerationError::ResponseParse(logger_redacted::preview(text.trim(), 120)))?;
    domain.validate(value)
}
