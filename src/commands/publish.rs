use anyhow::{Context, Result};
use std::path::Path;

use crate::commands::{open_tree, scan_tree, Source};
use crate::config::Config;
use crate::model::TranslationBundle;
use crate::publish::{self, PublishOptions};

pub fn run(config: &Config, source: Source, input: &Path, dry_run: bool) -> Result<()> {
    println!("=== strings-translator publish ===\n");

    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read translations: {}", input.display()))?;
    let bundle: TranslationBundle = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse translations: {}", input.display()))?;

    let tree = open_tree(config, &source)?;
    let default_path = match bundle.default_path.clone() {
        Some(path) => Some(path),
        None => {
            println!("Translations do not name a default file; scanning repository...");
            let scan = scan_tree(config, tree.clone(), source.reference(config))?;
            scan.default_file_path().map(str::to_string)
        }
    };

    println!("Target: {}", source.describe(config));
    if dry_run {
        println!("Mode: dry run (nothing is written)");
    }
    println!();

    let options = PublishOptions::from_config(config, dry_run);
    let report = publish::publish(
        tree.as_ref(),
        default_path.as_deref(),
        &bundle.translations,
        &options,
    )?;

    if report.files.is_empty() {
        println!("No translations to publish.");
        return Ok(());
    }

    for file in &report.files {
        let prefix = if dry_run { "[dry-run] " } else { "" };
        println!(
            "  {}{} - {} string(s), {} new",
            prefix, file.path, file.string_count, file.added_count
        );
    }

    if let Some(branch) = &report.branch {
        println!("\nBranch: {}", branch);
    }
    if let Some(url) = &report.pull_request {
        println!("Pull request: {}", url);
    }

    println!("\nDone!");
    Ok(())
}
