pub mod init;
pub mod languages;
pub mod publish;
pub mod scan;
pub mod translate;

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::deadline::run_with_deadline;
use crate::github::GitHubTree;
use crate::model::ScanResult;
use crate::scanner::RepositoryScanner;
use crate::tree::{LocalTree, SourceTreeProvider};

/// Where a command reads the repository from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Local(PathBuf),
    GitHub,
}

impl Source {
    pub fn from_args(root: Option<PathBuf>, github: bool) -> Self {
        if github {
            Source::GitHub
        } else {
            Source::Local(root.unwrap_or_else(|| PathBuf::from(".")))
        }
    }

    pub fn describe(&self, config: &Config) -> String {
        match self {
            Source::Local(root) => root.display().to_string(),
            Source::GitHub => format!(
                "github:{}/{}@{}",
                config.github.owner.as_deref().unwrap_or("?"),
                config.github.repo.as_deref().unwrap_or("?"),
                config.github.branch
            ),
        }
    }

    /// Ref the tree is read at
    pub fn reference(&self, config: &Config) -> String {
        match self {
            Source::Local(_) => "HEAD".to_string(),
            Source::GitHub => config.github.branch.clone(),
        }
    }
}

pub fn open_tree(config: &Config, source: &Source) -> Result<Arc<dyn SourceTreeProvider>> {
    let tree: Arc<dyn SourceTreeProvider> = match source {
        Source::Local(root) => Arc::new(LocalTree::new(root)),
        Source::GitHub => Arc::new(GitHubTree::from_config(&config.github)?),
    };
    Ok(tree)
}

/// Scan `tree`, bounded by the configured timeout
pub fn scan_tree(
    config: &Config,
    tree: Arc<dyn SourceTreeProvider>,
    reference: String,
) -> Result<ScanResult> {
    let scanner = RepositoryScanner::from_config(config)?;
    let result = run_with_deadline(config.timeout(), move || {
        scanner.scan_provider(tree.as_ref(), &reference)
    })?;
    Ok(result)
}
