//! Scan Android `strings.xml` resources, translate the strings each locale is
//! missing through an AI provider and publish the merged locale files.
//!
//! The pipeline is `scanner` → `batcher` → `merger` → `serializer`; `publish`
//! ties the last steps to a [`tree::SourceTreeProvider`].

pub mod batcher;
pub mod commands;
pub mod config;
pub mod deadline;
pub mod error;
pub mod gemini;
pub mod github;
pub mod languages;
pub mod logging;
pub mod merger;
pub mod model;
pub mod parser;
pub mod path_matcher;
pub mod policy;
pub mod provider;
pub mod publish;
pub mod scanner;
pub mod serializer;
pub mod tree;

pub use error::{Error, Result};
pub use model::{LocaleTranslation, ScanResult, StringEntry, TranslatedEntry};
pub use scanner::RepositoryScanner;
