use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::policy::RepositoryPolicy;

pub const DEFAULT_CONFIG_FILE: &str = "strings-translator.json";
const DEFAULT_CONFIG_FILE_JSON5: &str = "strings-translator.json5";

/// Configuration for strings-translator
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Locale code under which default-language strings are also listed (e.g. "en")
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Language of the default strings, as sent to the translation provider
    #[serde(default = "default_locale")]
    pub source_locale: String,

    /// Locales to translate into when none are given on the command line
    #[serde(default)]
    pub target_locales: Vec<String>,

    /// Maximum number of strings per provider call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between successive provider calls for one locale, in milliseconds
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Application description given to the translator
    #[serde(default)]
    pub context: String,

    /// Additional glob patterns naming resource files
    #[serde(default)]
    pub extra_patterns: Vec<String>,

    /// Upper bound for a whole scan or translate operation, in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Prefix for branches created by `publish`
    #[serde(default = "default_branch_prefix")]
    pub branch_prefix: String,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub policy: RepositoryPolicy,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GitHubConfig {
    pub owner: Option<String>,
    pub repo: Option<String>,
    /// Base branch scanned and targeted by pull requests
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Falls back to GITHUB_TOKEN
    pub token: Option<String>,
    /// Override for GitHub Enterprise installations
    pub api_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeminiConfig {
    pub model: Option<String>,
    /// Falls back to GEMINI_API_KEY
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_batch_size() -> usize {
    50
}

fn default_batch_delay_ms() -> u64 {
    1000
}

fn default_branch_prefix() -> String {
    "translations/batch-".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            owner: None,
            repo: None,
            branch: default_branch(),
            token: None,
            api_url: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            source_locale: default_locale(),
            target_locales: Vec::new(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            context: String::new(),
            extra_patterns: Vec::new(),
            timeout_secs: None,
            branch_prefix: default_branch_prefix(),
            github: GitHubConfig::default(),
            gemini: GeminiConfig::default(),
            policy: RepositoryPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON or JSON5 file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_json5 = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json5"))
            .unwrap_or(false);

        let config: Config = if is_json5 {
            json5::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        };

        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json_string(json_str: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json_str)
            .with_context(|| "Failed to parse config JSON string")?;
        Ok(config)
    }

    /// Try to load from the default config files, or return default config
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                for candidate in [DEFAULT_CONFIG_FILE, DEFAULT_CONFIG_FILE_JSON5] {
                    let default_path = Path::new(candidate);
                    if default_path.exists() {
                        return Self::load(default_path);
                    }
                }
                Ok(Self::default())
            }
        }
    }

    /// A batch size of zero would never make progress
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
