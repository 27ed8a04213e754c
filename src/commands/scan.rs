use anyhow::Result;
use std::sync::Arc;

use crate::commands::{open_tree, scan_tree, Source};
use crate::config::Config;
use crate::github::GitHubTree;
use crate::languages;
use crate::logging;
use crate::model::ScanResult;
use crate::tree::SourceTreeProvider;

pub fn run(config: &Config, source: Source, json: bool) -> Result<()> {
    if !json {
        println!("=== strings-translator scan ===\n");
        println!("Source: {}", source.describe(config));
        println!();
    }

    let tree: Arc<dyn SourceTreeProvider> = match &source {
        Source::GitHub => {
            let github = GitHubTree::from_config(&config.github)?;
            if !json {
                report_policy(config, &github);
            }
            Arc::new(github)
        }
        Source::Local(_) => open_tree(config, &source)?,
    };

    let result = scan_tree(config, tree, source.reference(config))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }
    Ok(())
}

fn report_policy(config: &Config, github: &GitHubTree) {
    match github.repository_info() {
        Ok(info) => {
            let estimate = config.policy.estimate_strings(&info);
            match config.policy.rejection(&info) {
                None => println!(
                    "Repository {} looks translatable (about {} strings)\n",
                    github.full_name(),
                    estimate
                ),
                Some(reason) => println!(
                    "Repository {} is not a typical translation target: {}\n",
                    github.full_name(),
                    reason
                ),
            }
        }
        Err(err) => logging::warn(&format!("Could not read repository metadata: {:#}", err)),
    }
}

fn print_summary(result: &ScanResult) {
    println!("String files:");
    for file in &result.files {
        println!(
            "  {} ({}) - {} string(s)",
            file.path,
            file.locale.as_deref().unwrap_or("default"),
            file.string_count
        );
    }

    println!("\nScan Summary:");
    println!("  Default strings: {}", result.total_strings);
    println!("  Locales: {}", result.available_locales.len());

    if !result.missing_by_locale.is_empty() {
        println!("\nMissing translations:");
        for (locale, missing) in &result.missing_by_locale {
            let existing = result
                .existing_by_locale
                .get(locale)
                .map(Vec::len)
                .unwrap_or(0);
            println!(
                "  {:<8} {:<24} {} existing, {} missing",
                locale,
                languages::display_name(locale),
                existing,
                missing.len()
            );
        }
    }

    println!("\nDone!");
}
