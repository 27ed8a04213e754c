use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};

use crate::config::Config;
use crate::error::{Error, FileReadError, ParseError, ScanError};
use crate::logging;
use crate::model::{LocaleFile, ScanResult, ScannedFile, StringEntry, TreeItem, TreeItemKind};
use crate::parser;
use crate::path_matcher::{PathMatcher, ResourceKind};
use crate::tree::SourceTreeProvider;

/// Walks a repository tree and assembles default, existing and missing strings
#[derive(Debug, Clone)]
pub struct RepositoryScanner {
    matcher: PathMatcher,
    default_locale: String,
}

impl Default for RepositoryScanner {
    fn default() -> Self {
        Self::new(PathMatcher::new(), "en")
    }
}

impl RepositoryScanner {
    /// `default_locale` is the code under which default-language strings are
    /// also listed in `existing_by_locale`
    pub fn new(matcher: PathMatcher, default_locale: impl Into<String>) -> Self {
        Self {
            matcher,
            default_locale: default_locale.into(),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let matcher = PathMatcher::with_extra_patterns(&config.extra_patterns)?;
        Ok(Self::new(matcher, config.default_locale.clone()))
    }

    /// List the tree at `reference` and scan it through `provider`
    pub fn scan_provider<P>(&self, provider: &P, reference: &str) -> Result<ScanResult, Error>
    where
        P: SourceTreeProvider + ?Sized,
    {
        let tree = provider.list_tree(reference)?;
        logging::debug(&format!("Tree at {} has {} item(s)", reference, tree.len()));
        let result = self.scan(&tree, |path| provider.read_file(path, reference))?;
        Ok(result)
    }

    /// Scan an already listed tree. `read` is called once per resource file,
    /// possibly from several threads.
    pub fn scan<F>(&self, tree: &[TreeItem], read: F) -> Result<ScanResult, ScanError>
    where
        F: Fn(&str) -> anyhow::Result<String> + Sync,
    {
        let candidates: Vec<(&str, Option<String>)> = tree
            .iter()
            .filter(|item| item.kind == TreeItemKind::Blob)
            .filter_map(|item| match self.matcher.classify(&item.path)? {
                ResourceKind::Default => Some((item.path.as_str(), None)),
                ResourceKind::Locale(code) => Some((item.path.as_str(), Some(code))),
                ResourceKind::Qualified(qualifier) => {
                    logging::debug(&format!(
                        "Skipping {} (resource qualifier '{}' is not a language)",
                        item.path, qualifier
                    ));
                    None
                }
            })
            .collect();

        if candidates.is_empty() {
            return Err(ScanError::NoResourceFilesFound);
        }

        let results: Vec<Result<LocaleFile, FileReadError>> = candidates
            .par_iter()
            .map(|(path, locale)| load_file(path, locale.clone(), &read))
            .collect();

        let mut files = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(file) => {
                    logging::info(&format!(
                        "Found string file: {} ({}) with {} strings",
                        file.path,
                        file.locale.as_deref().unwrap_or("default"),
                        file.entries.len()
                    ));
                    files.push(file);
                }
                Err(err) => logging::warn(&format!("Skipping string file: {}", err)),
            }
        }

        if files.is_empty() {
            return Err(ScanError::NoReadableResourceFiles(candidates.len()));
        }

        Ok(self.assemble(files))
    }

    fn assemble(&self, files: Vec<LocaleFile>) -> ScanResult {
        let default_strings: Vec<StringEntry> = files
            .iter()
            .filter(|f| f.locale.is_none())
            .flat_map(|f| f.entries.iter().cloned())
            .collect();

        let mut existing_by_locale: BTreeMap<String, Vec<StringEntry>> = BTreeMap::new();
        for file in &files {
            let locale = file.locale.as_deref().unwrap_or(&self.default_locale);
            existing_by_locale
                .entry(locale.to_string())
                .or_default()
                .extend(file.entries.iter().cloned());
        }

        let missing_by_locale = missing_keys(&default_strings, &existing_by_locale);
        let available_locales: Vec<String> = existing_by_locale.keys().cloned().collect();

        ScanResult {
            total_strings: default_strings.len(),
            default_strings,
            existing_by_locale,
            missing_by_locale,
            available_locales,
            files: files
                .iter()
                .map(|f| ScannedFile {
                    path: f.path.clone(),
                    locale: f.locale.clone(),
                    string_count: f.entries.len(),
                })
                .collect(),
        }
    }
}

fn load_file<F>(path: &str, locale: Option<String>, read: &F) -> Result<LocaleFile, FileReadError>
where
    F: Fn(&str) -> anyhow::Result<String>,
{
    let content = read(path).map_err(|e| FileReadError {
        path: path.to_string(),
        message: format!("{:#}", e),
    })?;

    let parsed = parser::parse_with_report(&content);
    match parsed.fallback_reason {
        // A well-formed document without strings is a legitimately empty locale
        None | Some(ParseError::NoStrings) => {}
        Some(reason) if parsed.entries.is_empty() => {
            return Err(FileReadError {
                path: path.to_string(),
                message: reason.to_string(),
            });
        }
        Some(reason) => logging::warn(&format!(
            "{}: {}; recovered {} string(s) with the lenient parser",
            path,
            reason,
            parsed.entries.len()
        )),
    }

    Ok(LocaleFile {
        path: path.to_string(),
        locale,
        entries: parsed.entries,
    })
}

/// Default keys (first occurrence order, no duplicates) absent from each locale
pub fn missing_keys(
    default_strings: &[StringEntry],
    existing_by_locale: &BTreeMap<String, Vec<StringEntry>>,
) -> BTreeMap<String, Vec<String>> {
    let mut seen = HashSet::new();
    let default_keys: Vec<&str> = default_strings
        .iter()
        .map(|s| s.key.as_str())
        .filter(|key| seen.insert(*key))
        .collect();

    existing_by_locale
        .iter()
        .map(|(locale, entries)| {
            let present: HashSet<&str> = entries.iter().map(|s| s.key.as_str()).collect();
            let missing = default_keys
                .iter()
                .filter(|key| !present.contains(*key))
                .map(|key| key.to_string())
                .collect();
            (locale.clone(), missing)
        })
        .collect()
}
