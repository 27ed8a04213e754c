use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single `<string>` resource: key, value and whether it may be translated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringEntry {
    pub key: String,
    pub value: String,
    #[serde(default = "default_translatable")]
    pub translatable: bool,
}

fn default_translatable() -> bool {
    true
}

impl StringEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            translatable: true,
        }
    }

    pub fn untranslatable(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            translatable: false,
            ..Self::new(key, value)
        }
    }
}

/// One parsed resource file. `locale == None` marks the default language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFile {
    pub path: String,
    pub locale: Option<String>,
    pub entries: Vec<StringEntry>,
}

/// Summary of a resource file found during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedFile {
    pub path: String,
    pub locale: Option<String>,
    pub string_count: usize,
}

/// Kind of an entry in a repository tree listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeItemKind {
    Blob,
    Tree,
}

/// One entry of a repository tree listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeItem {
    pub path: String,
    pub kind: TreeItemKind,
}

impl TreeItem {
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: TreeItemKind::Blob,
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: TreeItemKind::Tree,
        }
    }
}

/// Aggregate result of scanning a repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub default_strings: Vec<StringEntry>,
    pub existing_by_locale: BTreeMap<String, Vec<StringEntry>>,
    pub missing_by_locale: BTreeMap<String, Vec<String>>,
    pub available_locales: Vec<String>,
    pub total_strings: usize,
    #[serde(default)]
    pub files: Vec<ScannedFile>,
}

impl ScanResult {
    /// Path of the first default-language file, used to derive locale file paths
    pub fn default_file_path(&self) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.locale.is_none())
            .map(|f| f.path.as_str())
    }

    /// Keys missing for `locale`. Locales never seen in the repository miss every
    /// translatable default key.
    pub fn missing_for(&self, locale: &str) -> Vec<String> {
        match self.missing_by_locale.get(locale) {
            Some(keys) => keys.clone(),
            None => self
                .default_strings
                .iter()
                .filter(|s| s.translatable)
                .map(|s| s.key.clone())
                .collect(),
        }
    }
}

/// Group of strings sent to the translation provider in one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequestBatch {
    pub keys: Vec<StringEntry>,
    pub target_locale: String,
    pub source_locale: String,
    pub context: String,
}

/// A string translated (or defaulted) for one locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedEntry {
    pub key: String,
    pub original_value: String,
    pub translated_value: String,
    pub locale: String,
}

/// All translated entries accumulated for one locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleTranslation {
    pub locale: String,
    pub entries: Vec<TranslatedEntry>,
}

/// Translations handed from `translate` to `publish`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationBundle {
    /// Default-language file the locale paths are derived from
    #[serde(default)]
    pub default_path: Option<String>,
    pub translations: Vec<LocaleTranslation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_for_unknown_locale_lists_translatable_defaults() {
        let scan = ScanResult {
            default_strings: vec![
                StringEntry::new("a", "A"),
                StringEntry::untranslatable("app_name", "Demo"),
            ],
            ..ScanResult::default()
        };
        assert_eq!(scan.missing_for("de"), vec!["a".to_string()]);
    }

    #[test]
    fn string_entry_deserializes_without_translatable() {
        let entry: StringEntry = serde_json::from_str(r#"{"key":"k","value":"v"}"#).unwrap();
        assert!(entry.translatable);
    }
}
