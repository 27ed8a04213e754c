use thiserror::Error;

/// Fatal outcomes of a repository scan
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("no translatable strings found: no string resource files in repository")]
    NoResourceFilesFound,
    #[error("no translatable strings found: {0} resource file(s) matched but none could be read")]
    NoReadableResourceFiles(usize),
}

/// A single resource file could not be read; the scan skips it
#[derive(Debug, Error)]
#[error("failed to read {path}: {message}")]
pub struct FileReadError {
    pub path: String,
    pub message: String,
}

/// A path the source tree does not contain at the requested ref
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("file not found: {path}")]
pub struct FileNotFound {
    pub path: String,
}

/// Structured XML parse failure; triggers the regex fallback
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Malformed(String),
    #[error("unclosed element <{0}>")]
    Unclosed(String),
    #[error("document has no root element")]
    Empty,
    #[error("document has no <resources><string> elements")]
    NoStrings,
}

/// Failure reported by a translation provider for one batch
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("translation provider unreachable: {0}")]
    Transport(String),
    #[error("translation provider rejected credentials: {0}")]
    Unauthorized(String),
    #[error("translation provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("translation response is not a key/value mapping: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Whether the failure affects every following batch as well
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProviderError::Unauthorized(_))
    }
}

/// Fatal outcomes of writing translations back to the source tree
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to read existing {path}: {message}")]
    Read { path: String, message: String },
    #[error("failed to write {path}: {message}")]
    Write { path: String, message: String },
    #[error("failed to create branch {branch}: {message}")]
    Branch { branch: String, message: String },
    #[error("failed to open pull request: {0}")]
    PullRequest(String),
    #[error("no default strings.xml path known to derive locale file paths from")]
    NoDefaultPath,
}

/// Errors surfaced by whole operations
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("translation for locale {locale} aborted: {source}")]
    Provider {
        locale: String,
        #[source]
        source: ProviderError,
    },
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error("operation timed out")]
    TimedOut,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
