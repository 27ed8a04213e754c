use glob::{MatchOptions, Pattern, PatternError};
use regex::Regex;
use std::sync::OnceLock;

/// Layouts used by Android, Compose Multiplatform and moko-resources projects.
/// `*` matches one path segment, `**` any number of segments.
pub const BUILTIN_PATTERNS: &[&str] = &[
    "feature/*/src/commonMain/composeResources/values/strings.xml",
    "feature/*/src/*/composeResources/values/strings.xml",
    "feature/*/src/*/resources/values/strings.xml",
    "*/src/commonMain/composeResources/values/strings.xml",
    "*/*/src/commonMain/composeResources/values/strings.xml",
    "*/src/commonMain/resources/MR/base/strings.xml",
    "*/*/src/commonMain/resources/MR/base/strings.xml",
    "*/src/main/res/values/strings.xml",
    "*/*/src/main/res/values/strings.xml",
    "feature/*/src/main/res/values/strings.xml",
    "**/values/strings.xml",
    "**/values-*/strings.xml",
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// What a resource file path says about the language of its strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    /// `values/strings.xml` or another unqualified resource directory
    Default,
    /// `values-fr/strings.xml`, `values-pt-rBR/strings.xml`
    Locale(String),
    /// `values-night/strings.xml`, `values-v21/strings.xml`: a configuration
    /// qualifier that is not a language
    Qualified(String),
}

fn locale_qualifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z]{2}(?:-r[A-Z]{2})?$")
            .expect("locale qualifier pattern is invalid - this is a bug")
    })
}

/// Decides which repository paths are string resource files
#[derive(Debug, Clone)]
pub struct PathMatcher {
    patterns: Vec<Pattern>,
}

impl Default for PathMatcher {
    fn default() -> Self {
        Self {
            patterns: BUILTIN_PATTERNS
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
        }
    }
}

impl PathMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in patterns plus user supplied ones
    pub fn with_extra_patterns(extra: &[String]) -> Result<Self, PatternError> {
        let mut matcher = Self::default();
        for raw in extra {
            matcher.patterns.push(Pattern::new(raw)?);
        }
        Ok(matcher)
    }

    pub fn is_resource_file(&self, path: &str) -> bool {
        if path.contains("/values/strings.xml")
            || (path.contains("/values-") && path.contains("/strings.xml"))
        {
            return true;
        }
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_with(path, MATCH_OPTIONS))
    }

    /// `None` when the path is not a resource file at all
    pub fn classify(&self, path: &str) -> Option<ResourceKind> {
        if !self.is_resource_file(path) {
            return None;
        }
        Some(classify_directory(path))
    }

    /// Locale code encoded in a `values-xx` or `values-xx-rYY` directory
    pub fn locale_of(path: &str) -> Option<String> {
        match classify_directory(path) {
            ResourceKind::Locale(code) => Some(code),
            _ => None,
        }
    }
}

fn classify_directory(path: &str) -> ResourceKind {
    let mut segments = path.rsplit('/');
    segments.next();
    let dir = segments.next().unwrap_or_default();

    match dir.strip_prefix("values-") {
        Some(qualifier) if locale_qualifier_regex().is_match(qualifier) => {
            ResourceKind::Locale(qualifier.to_string())
        }
        Some(qualifier) => ResourceKind::Qualified(qualifier.to_string()),
        None => ResourceKind::Default,
    }
}
