use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::batcher::{self, BatchOptions};
use crate::commands::{open_tree, scan_tree, Source};
use crate::config::Config;
use crate::deadline::run_with_deadline;
use crate::gemini::GeminiProvider;
use crate::languages;
use crate::logging;
use crate::model::{LocaleTranslation, TranslationBundle};

pub const DEFAULT_OUTPUT: &str = "translations.json";

pub fn run(
    config: &Config,
    source: Source,
    locales: Vec<String>,
    output: Option<PathBuf>,
    context: Option<String>,
) -> Result<()> {
    println!("=== strings-translator translate ===\n");

    let locales = resolve_locales(config, locales)?;
    let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let mut options = BatchOptions::from_config(config);
    if let Some(context) = context {
        options.context = context;
    }
    let provider = Arc::new(GeminiProvider::from_config(&config.gemini)?);

    println!("Configuration:");
    println!("  Source: {}", source.describe(config));
    println!("  Locales: {:?}", locales);
    println!("  Model: {}", provider.model());
    println!("  Batch size: {}", options.batch_size);
    println!();

    println!("Scanning repository...");
    let tree = open_tree(config, &source)?;
    let scan = Arc::new(scan_tree(config, tree, source.reference(config))?);
    println!(
        "  {} default string(s) in {} file(s)\n",
        scan.total_strings,
        scan.files.len()
    );

    println!("Translating...");
    let outcomes = {
        let scan = Arc::clone(&scan);
        let locales = locales.clone();
        run_with_deadline(config.timeout(), move || {
            Ok(batcher::translate_locales(
                &locales,
                &scan,
                &options,
                provider.as_ref(),
            ))
        })?
    };

    let mut translations: Vec<LocaleTranslation> = Vec::new();
    let mut failed: Vec<String> = Vec::new();
    for (locale, outcome) in outcomes {
        match outcome {
            Ok(translation) => {
                let placeholders = translation
                    .entries
                    .iter()
                    .filter(|e| e.translated_value == batcher::placeholder(&e.original_value))
                    .count();
                print!(
                    "  {} ({}): {} string(s)",
                    locale,
                    languages::display_name(&locale),
                    translation.entries.len()
                );
                if placeholders > 0 {
                    print!(", {} need manual translation", placeholders);
                }
                println!();
                translations.push(translation);
            }
            Err(err) => {
                logging::error(&err.to_string());
                failed.push(locale);
            }
        }
    }

    let bundle = TranslationBundle {
        default_path: scan.default_file_path().map(str::to_string),
        translations,
    };
    let json = serde_json::to_string_pretty(&bundle)?;
    std::fs::write(&output, format!("{}\n", json))
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("\nWrote {}", output.display());

    if !failed.is_empty() {
        bail!(
            "Translation failed for {} locale(s): {}",
            failed.len(),
            failed.join(", ")
        );
    }

    println!("\nNext step:");
    println!("  strings-translator publish --input {}", output.display());
    println!("\nDone!");
    Ok(())
}

/// Requested locales in order without duplicates, falling back to the config
fn resolve_locales(config: &Config, requested: Vec<String>) -> Result<Vec<String>> {
    let candidates = if requested.is_empty() {
        config.target_locales.clone()
    } else {
        requested
    };

    let mut seen = BTreeSet::new();
    let locales: Vec<String> = candidates
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty() && seen.insert(l.clone()))
        .collect();

    if locales.is_empty() {
        bail!("No target locales. Pass --locale or set targetLocales in the config file.");
    }
    Ok(locales)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_locales_win_and_are_deduplicated() {
        let config = Config {
            target_locales: vec!["de".into()],
            ..Config::default()
        };
        let locales = resolve_locales(&config, vec!["es".into(), " fr ".into(), "es".into()]).unwrap();
        assert_eq!(locales, vec!["es", "fr"]);
        assert_eq!(resolve_locales(&config, Vec::new()).unwrap(), vec!["de"]);
    }

    #[test]
    fn no_locales_is_an_error() {
        assert!(resolve_locales(&Config::default(), Vec::new()).is_err());
    }
}
