use serde::{Deserialize, Serialize};

/// Repository metadata the eligibility heuristic looks at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryInfo {
    pub name: String,
    pub description: Option<String>,
    /// Primary language as reported by the host
    pub language: Option<String>,
    /// Every language detected in the repository
    pub languages: Vec<String>,
    /// Repository size in kilobytes
    pub size: u64,
}

/// Which repositories are worth offering for translation.
///
/// This is advisory: it is reported next to a scan, never consulted by the
/// scanner itself.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryPolicy {
    #[serde(default = "default_min_size")]
    pub min_size: u64,

    #[serde(default = "default_max_size")]
    pub max_size: u64,

    /// Accepted primary languages
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Lower-case substrings of name or description that disqualify a repository
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

fn default_min_size() -> u64 {
    10
}

fn default_max_size() -> u64 {
    100_000
}

fn default_languages() -> Vec<String> {
    [
        "JavaScript", "TypeScript", "React", "Vue", "Java", "Kotlin", "Swift", "Python", "PHP",
        "C#", "C++", "Go", "Rust", "HTML", "CSS",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_exclude_patterns() -> Vec<String> {
    [
        "dotfiles", "config", "backup", "archive", "test", "demo", "example", "tutorial",
        "learning", "practice", "exercise",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for RepositoryPolicy {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            max_size: default_max_size(),
            languages: default_languages(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

/// Estimates never go outside this range
const ESTIMATE_BOUNDS: (u64, u64) = (10, 2000);

impl RepositoryPolicy {
    /// Reason the repository is rejected, or `None` when it qualifies
    pub fn rejection(&self, repo: &RepositoryInfo) -> Option<String> {
        if repo.size < self.min_size || repo.size > self.max_size {
            return Some(format!(
                "size {} KB is outside {}..={} KB",
                repo.size, self.min_size, self.max_size
            ));
        }

        let supported = |lang: &str| self.languages.iter().any(|l| l == lang);
        match repo.language.as_deref() {
            Some(primary) if !supported(primary) => {
                return Some(format!("primary language {} is not supported", primary));
            }
            None if !repo.languages.iter().any(|l| supported(l)) => {
                return Some("no supported language detected".to_string());
            }
            _ => {}
        }

        let haystack = format!(
            "{} {}",
            repo.name,
            repo.description.as_deref().unwrap_or_default()
        )
        .to_lowercase();
        self.exclude_patterns
            .iter()
            .find(|pattern| haystack.contains(pattern.as_str()))
            .map(|pattern| format!("name or description mentions '{}'", pattern))
    }

    pub fn is_translatable(&self, repo: &RepositoryInfo) -> bool {
        self.rejection(repo).is_none()
    }

    /// Rough number of user-facing strings, from size and languages
    pub fn estimate_strings(&self, repo: &RepositoryInfo) -> u64 {
        let share = |tenths: u64| repo.size * tenths / 10;

        let mut estimate = match repo.language.as_deref() {
            Some("JavaScript") | Some("TypeScript") => share(8),
            Some("Java") | Some("Kotlin") => share(6),
            Some("Swift") => share(5),
            Some("Python") | Some("PHP") => share(4),
            _ => share(3),
        };

        if repo.languages.iter().any(|l| l == "HTML" || l == "CSS") {
            estimate += share(2);
        }
        if repo.name.contains("mobile") || repo.name.contains("app") {
            estimate += share(3);
        }
        if repo.name.contains("web") || repo.name.contains("frontend") {
            estimate += share(2);
        }

        estimate.clamp(ESTIMATE_BOUNDS.0, ESTIMATE_BOUNDS.1)
    }
}
