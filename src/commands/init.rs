use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::config::{Config, DEFAULT_CONFIG_FILE};

pub fn run(force: bool, locales: &str, context: Option<String>, github: Option<String>) -> Result<()> {
    println!("=== strings-translator init ===\n");

    let config_path = Path::new(DEFAULT_CONFIG_FILE);

    // Check if config already exists
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = starter_config(locales, context, github.as_deref())?;
    let config_str = serde_json::to_string_pretty(&config)?;
    std::fs::write(config_path, format!("{}\n", config_str))
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created configuration file: {}\n", config_path.display());
    println!("Configuration:");
    println!("  Target locales: {:?}", config.target_locales);
    println!("  Batch size: {}", config.batch_size);
    if let (Some(owner), Some(repo)) = (&config.github.owner, &config.github.repo) {
        println!("  GitHub: {}/{} ({})", owner, repo, config.github.branch);
    }

    println!("\nNext steps:");
    println!("  1. Export GEMINI_API_KEY (and GITHUB_TOKEN for --github)");
    println!("  2. Run 'strings-translator scan' to list missing strings");
    println!("  3. Run 'strings-translator translate' to translate them");
    println!("  4. Run 'strings-translator publish --input translations.json'");

    println!("\nDone!");
    Ok(())
}

fn starter_config(locales: &str, context: Option<String>, github: Option<&str>) -> Result<Config> {
    let mut config = Config {
        target_locales: locales
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        context: context.unwrap_or_default(),
        ..Config::default()
    };

    if let Some(full_name) = github {
        let Some((owner, repo)) = full_name.split_once('/') else {
            bail!("Expected --github in owner/repo form, got '{}'", full_name);
        };
        config.github.owner = Some(owner.to_string());
        config.github.repo = Some(repo.to_string());
    }
    Ok(config)
}
