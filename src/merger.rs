use std::collections::BTreeMap;

use crate::model::{StringEntry, TranslatedEntry};

const UNKNOWN_LOCALE: &str = "unknown";

/// Combine the entries already in a locale file with fresh translations.
///
/// Every key of either input appears once; an existing value always wins over
/// a fresh one. Output is sorted by key (ordinal) and tagged with the locale of
/// the first fresh entry, or `"unknown"` when there is none.
pub fn merge(existing: &[StringEntry], fresh: &[TranslatedEntry]) -> Vec<TranslatedEntry> {
    let locale = fresh
        .first()
        .map(|t| t.locale.as_str())
        .unwrap_or(UNKNOWN_LOCALE);
    merge_into_locale(existing, fresh, locale)
}

/// Same as [`merge`] with an explicit locale tag
pub fn merge_into_locale(
    existing: &[StringEntry],
    fresh: &[TranslatedEntry],
    locale: &str,
) -> Vec<TranslatedEntry> {
    // BTreeMap iteration gives the ordinal key order directly
    let mut merged: BTreeMap<&str, (&str, &str)> = BTreeMap::new();

    for entry in fresh {
        merged.insert(
            &entry.key,
            (&entry.original_value, &entry.translated_value),
        );
    }
    for entry in existing {
        let original = merged.get(entry.key.as_str()).map(|(o, _)| *o).unwrap_or("");
        merged.insert(&entry.key, (original, &entry.value));
    }

    merged
        .into_iter()
        .map(|(key, (original, value))| TranslatedEntry {
            key: key.to_string(),
            original_value: original.to_string(),
            translated_value: value.to_string(),
            locale: locale.to_string(),
        })
        .collect()
}

/// View merged translations as resource entries again
pub fn to_string_entries(merged: &[TranslatedEntry]) -> Vec<StringEntry> {
    merged
        .iter()
        .map(|t| StringEntry::new(t.key.clone(), t.translated_value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(key: &str, value: &str, locale: &str) -> TranslatedEntry {
        TranslatedEntry {
            key: key.to_string(),
            original_value: format!("orig-{}", key),
            translated_value: value.to_string(),
            locale: locale.to_string(),
        }
    }

    fn values(merged: &[TranslatedEntry]) -> Vec<(&str, &str)> {
        merged
            .iter()
            .map(|t| (t.key.as_str(), t.translated_value.as_str()))
            .collect()
    }

    #[test]
    fn existing_wins_on_conflict() {
        let existing = vec![StringEntry::new("welcome", "Hola (revisado)")];
        let new = vec![fresh("welcome", "Hola", "es"), fresh("bye", "Adiós", "es")];
        let merged = merge(&existing, &new);
        assert_eq!(values(&merged), vec![("bye", "Adiós"), ("welcome", "Hola (revisado)")]);
        assert!(merged.iter().all(|t| t.locale == "es"));
    }

    #[test]
    fn union_of_keys_sorted_ordinally() {
        let existing = vec![StringEntry::new("b", "B"), StringEntry::new("Z", "Zed")];
        let new = vec![fresh("a", "A", "fr"), fresh("c", "C", "fr")];
        let merged = merge(&existing, &new);
        let keys: Vec<&str> = merged.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["Z", "a", "b", "c"]);
    }

    #[test]
    fn empty_fresh_is_tagged_unknown() {
        let merged = merge(&[StringEntry::new("k", "v")], &[]);
        assert_eq!(merged[0].locale, "unknown");
        assert_eq!(merge_into_locale(&[StringEntry::new("k", "v")], &[], "de")[0].locale, "de");
    }

    #[test]
    fn merge_is_idempotent() {
        let existing = vec![StringEntry::new("a", "A1"), StringEntry::new("c", "C1")];
        let new = vec![fresh("a", "A2", "it"), fresh("b", "B2", "it")];
        let once = merge(&existing, &new);
        let twice = merge(&to_string_entries(&once), &new);
        assert_eq!(values(&once), values(&twice));
        assert_eq!(
            values(&merge(&to_string_entries(&once), &[])),
            values(&once)
        );
    }

    #[test]
    fn duplicate_existing_keys_keep_last() {
        let existing = vec![StringEntry::new("k", "first"), StringEntry::new("k", "second")];
        let merged = merge(&existing, &[]);
        assert_eq!(values(&merged), vec![("k", "second")]);
    }
}
