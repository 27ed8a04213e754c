use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

/// Environment variable consulted when no `--log-level` flag is given
pub const LOG_ENV: &str = "STRINGS_TRANSLATOR_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl LogLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" | "trace" => Some(Self::Debug),
            _ => None,
        }
    }
}

fn level_cell() -> &'static AtomicU8 {
    static CELL: OnceLock<AtomicU8> = OnceLock::new();
    CELL.get_or_init(|| AtomicU8::new(LogLevel::Info as u8))
}

pub fn set_level(level: LogLevel) {
    level_cell().store(level as u8, Ordering::Relaxed);
}

/// Apply the CLI flag if present, otherwise `STRINGS_TRANSLATOR_LOG`.
/// Unknown values are reported and ignored.
pub fn init(flag: Option<&str>) {
    let from_env = std::env::var(LOG_ENV).ok();
    let Some(raw) = flag.or(from_env.as_deref()) else {
        return;
    };
    match LogLevel::parse(raw) {
        Some(level) => set_level(level),
        None => warn(&format!("unknown log level '{}', keeping 'info'", raw)),
    }
}

pub fn enabled(level: LogLevel) -> bool {
    (level as u8) <= level_cell().load(Ordering::Relaxed)
}

pub fn error(message: &str) {
    if enabled(LogLevel::Error) {
        eprintln!("ERROR: {}", message);
    }
}

pub fn warn(message: &str) {
    if enabled(LogLevel::Warn) {
        eprintln!("Warning: {}", message);
    }
}

/// Progress output goes to stderr so `--json` stdout stays machine readable
pub fn info(message: &str) {
    if enabled(LogLevel::Info) {
        eprintln!("{}", message);
    }
}

pub fn debug(message: &str) {
    if enabled(LogLevel::Debug) {
        eprintln!("DEBUG: {}", message);
    }
}
