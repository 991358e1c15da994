use crate::error::QuizError;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};

/// Marker that replaces the target word in a blanked sentence.
pub const PLACEHOLDER: &str = "_____";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SentencePair {
    pub original_sentence: String,
    pub blanked_sentence: String,
}

/// Response schema for the structured sentence request.
pub fn sentence_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "originalSentence": { "type": "STRING" },
            "blankedSentence": { "type": "STRING" }
        },
        "required": ["originalSentence", "blankedSentence"]
    })
}

fn clean_json_response(response: &str) -> String {
    let mut cleaned = response.trim().to_string();

    if cleaned.starts_with("```") {
        let lines: Vec<&str> = cleaned.lines().collect();
        if lines.len() > 2 {
            cleaned = lines[1..lines.len() - 1].join("\n");
        }
    }

    if let Some(start) = cleaned.find('{')
        && let Some(end) = cleaned.rfind('}')
        && start < end
    {
        cleaned = cleaned[start..=end].to_string();
    }

    cleaned.trim().to_string()
}

/// Parses the structured payload. A missing or empty payload yields the
/// empty pair so the caller can reject it as incomplete.
pub fn parse_sentence_pair(response: Option<&str>) -> Result<SentencePair, QuizError> {
    let Some(response) = response else {
        return Ok(SentencePair::default());
    };
    let cleaned = clean_json_response(response);
    if cleaned.is_empty() {
        return Ok(SentencePair::default());
    }

    serde_json::from_str(&cleaned).map_err(|e| {
        QuizError::SentenceGenerationFailed(format!(
            "could not parse sentence response: {}. Raw: {}",
            e, response
        ))
    })
}

pub fn count_placeholders(sentence: &str) -> usize {
    sentence.matches(PLACEHOLDER).count()
}

// Inflections that drop the final letter: "improve" -> "improving",
// "study" -> "studies". A bare stem never matches on its own.
fn stem_inflections(word: &str) -> Option<(&str, &'static str)> {
    if word.chars().count() <= 3 {
        return None;
    }
    if let Some(stem) = word.strip_suffix('e') {
        return Some((stem, "ing|ed|er|est"));
    }
    word.strip_suffix('y').map(|stem| (stem, "ies|ied|ier|iest|ily"))
}

/// Replaces the word, words starting with it, and its stem inflections,
/// ignoring case.
pub fn blank_locally(sentence: &str, word: &str) -> String {
    let word = word.trim();
    if word.is_empty() {
        return sentence.to_string();
    }
    let whole = format!(r"{}\w*", regex::escape(word));
    let pattern = match stem_inflections(word) {
        Some((stem, suffixes)) => format!(
            r"(?i)\b(?:{}|{}(?:{})\b)",
            whole,
            regex::escape(stem),
            suffixes
        ),
        None => format!(r"(?i)\b{}", whole),
    };
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(sentence, PLACEHOLDER).into_owned(),
        Err(_) => sentence.to_string(),
    }
}

/// Whether `blanked` is `original` with each placeholder standing in for
/// exactly one word.
pub fn is_blanked_from(blanked: &str, original: &str) -> bool {
    if !blanked.contains(PLACEHOLDER) {
        return false;
    }
    let body = blanked
        .split(PLACEHOLDER)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"[\w'-]+");
    Regex::new(&format!("^{}$", body)).is_ok_and(|re| re.is_match(original))
}
