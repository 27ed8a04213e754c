use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::config::Config;
use crate::error::Error;
use crate::logging;
use crate::model::{LocaleTranslation, ScanResult, StringEntry, TranslatedEntry, TranslationRequestBatch};
use crate::provider::TranslationProvider;

/// Value written for a string whose batch could not be translated at all
pub fn placeholder(original: &str) -> String {
    format!("[Translation needed for: {}]", original)
}

/// How missing strings are grouped and sent to the provider
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub batch_size: usize,
    pub source_locale: String,
    pub context: String,
    /// Pause between two provider calls for the same locale
    pub delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 50,
            source_locale: "en".to_string(),
            context: String::new(),
            delay: Duration::from_secs(1),
        }
    }
}

impl BatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.effective_batch_size(),
            source_locale: config.source_locale.clone(),
            context: config.context.clone(),
            delay: config.batch_delay(),
        }
    }
}

/// Translate `missing_keys` into `locale`, one batch at a time.
///
/// Keys without a translatable default value are dropped. A batch whose
/// provider call fails or whose reply cannot be read gets placeholder values;
/// a key the provider skipped keeps its original text. Only a fatal provider
/// error (rejected credentials) aborts the locale.
pub fn translate_missing<P>(
    locale: &str,
    missing_keys: &[String],
    default_strings: &[StringEntry],
    options: &BatchOptions,
    provider: &P,
) -> Result<Vec<TranslatedEntry>, Error>
where
    P: TranslationProvider + ?Sized,
{
    let mut defaults: HashMap<&str, &StringEntry> = HashMap::new();
    for entry in default_strings {
        defaults.entry(entry.key.as_str()).or_insert(entry);
    }

    let mut seen = HashSet::new();
    let keys: Vec<&str> = missing_keys
        .iter()
        .map(String::as_str)
        .filter(|key| seen.insert(*key))
        .collect();

    let batch_size = options.batch_size.max(1);
    let batches: Vec<TranslationRequestBatch> = keys
        .chunks(batch_size)
        .map(|chunk| TranslationRequestBatch {
            keys: chunk
                .iter()
                .filter_map(|key| defaults.get(key))
                .filter(|entry| entry.translatable && !entry.value.is_empty())
                .map(|entry| (*entry).clone())
                .collect(),
            target_locale: locale.to_string(),
            source_locale: options.source_locale.clone(),
            context: options.context.clone(),
        })
        .filter(|batch| !batch.keys.is_empty())
        .collect();

    let total = batches.len();
    batches
        .iter()
        .enumerate()
        .try_fold(Vec::with_capacity(keys.len()), |mut acc, (index, batch)| {
            if index > 0 && !options.delay.is_zero() {
                std::thread::sleep(options.delay);
            }
            logging::debug(&format!(
                "[{}] batch {}/{}: {} string(s)",
                locale,
                index + 1,
                total,
                batch.keys.len()
            ));
            acc.extend(translate_batch(batch, provider)?);
            Ok(acc)
        })
}

fn translate_batch<P>(
    batch: &TranslationRequestBatch,
    provider: &P,
) -> Result<Vec<TranslatedEntry>, Error>
where
    P: TranslationProvider + ?Sized,
{
    let entry = |source: &StringEntry, translated: String| TranslatedEntry {
        key: source.key.clone(),
        original_value: source.value.clone(),
        translated_value: translated,
        locale: batch.target_locale.clone(),
    };

    match provider.translate_batch(batch) {
        Ok(mapping) => Ok(batch
            .keys
            .iter()
            .map(|source| {
                let translated = mapping
                    .get(&source.key)
                    .filter(|value| !value.trim().is_empty())
                    .cloned()
                    .unwrap_or_else(|| source.value.clone());
                entry(source, translated)
            })
            .collect()),
        Err(err) if err.is_fatal() => Err(Error::Provider {
            locale: batch.target_locale.clone(),
            source: err,
        }),
        Err(err) => {
            logging::warn(&format!(
                "[{}] {}; marking {} string(s) as needing translation",
                batch.target_locale,
                err,
                batch.keys.len()
            ));
            Ok(batch
                .keys
                .iter()
                .map(|source| entry(source, placeholder(&source.value)))
                .collect())
        }
    }
}

/// Translate several locales in parallel. Batches of one locale stay sequential.
pub fn translate_locales<P>(
    locales: &[String],
    scan: &ScanResult,
    options: &BatchOptions,
    provider: &P,
) -> Vec<(String, Result<LocaleTranslation, Error>)>
where
    P: TranslationProvider + ?Sized,
{
    locales
        .par_iter()
        .map(|locale| {
            let missing = scan.missing_for(locale);
            logging::info(&format!(
                "Translating {} missing string(s) into {}",
                missing.len(),
                locale
            ));
            let result = translate_missing(locale, &missing, &scan.default_strings, options, provider)
                .map(|entries| LocaleTranslation {
                    locale: locale.clone(),
                    entries,
                });
            (locale.clone(), result)
        })
        .collect()
}
