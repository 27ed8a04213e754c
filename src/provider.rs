use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::ProviderError;
use crate::languages;
use crate::model::TranslationRequestBatch;

/// An AI service that translates a batch of strings
pub trait TranslationProvider: Send + Sync {
    /// Translations keyed by string key. May cover only part of the batch.
    fn translate_batch(
        &self,
        batch: &TranslationRequestBatch,
    ) -> Result<HashMap<String, String>, ProviderError>;
}

impl<F> TranslationProvider for F
where
    F: Fn(&TranslationRequestBatch) -> Result<HashMap<String, String>, ProviderError>
        + Send
        + Sync,
{
    fn translate_batch(
        &self,
        batch: &TranslationRequestBatch,
    ) -> Result<HashMap<String, String>, ProviderError> {
        self(batch)
    }
}

/// Localization prompt asking for a JSON object of translations
pub fn build_prompt(batch: &TranslationRequestBatch) -> String {
    let source = languages::display_name(&batch.source_locale);
    let target = languages::display_name(&batch.target_locale);
    let context = if batch.context.trim().is_empty() {
        "A mobile application"
    } else {
        batch.context.as_str()
    };

    let strings = batch
        .keys
        .iter()
        .map(|entry| {
            format!(
                "{}: {}",
                Value::String(entry.key.clone()),
                Value::String(entry.value.clone())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a professional app localization expert. Please translate the following {source} strings to {target}.

Application Context: {context}

Important Instructions:
1. Maintain the exact same formatting, placeholders, and special characters
2. Keep HTML tags, URL parameters, and programming placeholders unchanged
3. Preserve %s, %d, %1$s, {{{{variable}}}}, {{0}}, [text], etc. exactly as they appear
4. For technical terms, use commonly accepted translations in the target language
5. Consider the app context when choosing appropriate terminology
6. Return ONLY a valid JSON object with the translations

Strings to translate:
{strings}

Return the result as a JSON object where each key maps to its translated value:
{{
  \"string_key_1\": \"translated_value_1\",
  \"string_key_2\": \"translated_value_2\"
}}"
    )
}

fn json_object_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\{.*\}").expect("JSON object pattern is invalid - this is a bug")
    })
}

/// Pull the translation mapping out of a model reply.
///
/// The reply may wrap the JSON in prose or a code fence; the outermost `{...}`
/// is parsed. Non-string values are ignored.
pub fn parse_translation_mapping(reply: &str) -> Result<HashMap<String, String>, ProviderError> {
    let json = json_object_regex()
        .find(reply)
        .ok_or_else(|| ProviderError::MalformedResponse("no JSON object in response".to_string()))?;

    let value: Value = serde_json::from_str(json.as_str())
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(ProviderError::MalformedResponse(
            "response JSON is not an object".to_string(),
        ));
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(text) => Some((key, text)),
            _ => None,
        })
        .collect())
}
