use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::FileNotFound;
use crate::model::TreeItem;

/// Access to a repository's files, branches and pull requests
pub trait SourceTreeProvider: Send + Sync {
    /// Every file and directory reachable from `reference`, recursively
    fn list_tree(&self, reference: &str) -> Result<Vec<TreeItem>>;

    /// Content of a file at `reference`. A path the tree does not contain is
    /// reported as [`FileNotFound`].
    fn read_file(&self, path: &str, reference: &str) -> Result<String>;

    /// `None` when the file does not exist; every other failure is an error
    fn read_file_if_exists(&self, path: &str, reference: &str) -> Result<Option<String>> {
        match self.read_file(path, reference) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.is::<FileNotFound>() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Create or update a file on `branch`
    fn write_file(&self, path: &str, content: &str, message: &str, branch: &str) -> Result<()>;

    /// Create `new_name` pointing at the head of `base_ref`
    fn create_branch(&self, new_name: &str, base_ref: &str) -> Result<()>;

    /// Open a pull request and return its URL
    fn open_pull_request(&self, title: &str, body: &str, head: &str, base: &str)
        -> Result<String>;

    /// Whether branch and pull request operations are available
    fn supports_pull_requests(&self) -> bool {
        true
    }
}

/// Directories never containing source resources
const SKIPPED_DIRS: &[&str] = &[".git", ".gradle", ".idea", "build", "node_modules"];

/// A repository checked out on the local file system
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: PathBuf,
}

impl LocalTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl SourceTreeProvider for LocalTree {
    fn list_tree(&self, _reference: &str) -> Result<Vec<TreeItem>> {
        if !self.root.is_dir() {
            bail!("Repository root is not a directory: {}", self.root.display());
        }

        let mut items = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir()
                    && entry
                        .file_name()
                        .to_str()
                        .map(|name| SKIPPED_DIRS.contains(&name))
                        .unwrap_or(false))
            });

        for entry in walker {
            let entry = entry
                .with_context(|| format!("Failed to walk {}", self.root.display()))?;
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .with_context(|| format!("Path outside root: {}", entry.path().display()))?;
            let path = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if entry.file_type().is_dir() {
                items.push(TreeItem::tree(path));
            } else if entry.file_type().is_file() {
                items.push(TreeItem::blob(path));
            }
        }
        Ok(items)
    }

    fn read_file(&self, path: &str, _reference: &str) -> Result<String> {
        let full = self.resolve(path);
        match std::fs::read_to_string(&full) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(anyhow::Error::new(FileNotFound {
                    path: path.to_string(),
                }))
            }
            Err(err) => Err(err).with_context(|| format!("Failed to read file: {}", full.display())),
        }
    }

    fn write_file(&self, path: &str, content: &str, _message: &str, _branch: &str) -> Result<()> {
        let full = self.resolve(path);
        let parent = full
            .parent()
            .with_context(|| format!("No parent directory for {}", full.display()))?;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;

        // Write next to the target and rename so readers never see a partial file
        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temp file in {}", parent.display()))?;
        tmp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write {}", full.display()))?;
        tmp.persist(&full)
            .with_context(|| format!("Failed to replace {}", full.display()))?;
        Ok(())
    }

    fn create_branch(&self, new_name: &str, _base_ref: &str) -> Result<()> {
        bail!(
            "Cannot create branch {} in a local checkout; use --github to publish a pull request",
            new_name
        )
    }

    fn open_pull_request(
        &self,
        _title: &str,
        _body: &str,
        head: &str,
        _base: &str,
    ) -> Result<String> {
        bail!(
            "Cannot open a pull request from {} in a local checkout; use --github",
            head
        )
    }

    fn supports_pull_requests(&self) -> bool {
        false
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeItemKind;

    #[test]
    fn local_tree_lists_relative_paths_and_skips_build_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("app/src/main/res/values")).unwrap();
        std::fs::create_dir_all(root.join("app/build/intermediates/values")).unwrap();
        std::fs::write(root.join("app/src/main/res/values/strings.xml"), "<resources/>").unwrap();
        std::fs::write(root.join("app/build/intermediates/values/strings.xml"), "").unwrap();

        let tree = LocalTree::new(root);
        let items = tree.list_tree("HEAD").unwrap();
        let blobs: Vec<&str> = items
            .iter()
            .filter(|i| i.kind == TreeItemKind::Blob)
            .map(|i| i.path.as_str())
            .collect();
        assert_eq!(blobs, vec!["app/src/main/res/values/strings.xml"]);
        assert!(items.iter().any(|i| i.kind == TreeItemKind::Tree && i.path == "app"));
    }

    #[test]
    fn local_tree_write_creates_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let tree = LocalTree::new(tmp.path());
        tree.write_file("res/values-fr/strings.xml", "<resources/>\n", "msg", "main")
            .unwrap();
        assert_eq!(
            tree.read_file("res/values-fr/strings.xml", "HEAD").unwrap(),
            "<resources/>\n"
        );
        tree.write_file("res/values-fr/strings.xml", "updated", "msg", "main")
            .unwrap();
        assert_eq!(tree.read_file("res/values-fr/strings.xml", "HEAD").unwrap(), "updated");
    }

    #[test]
    fn local_tree_reports_missing_files_as_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let tree = LocalTree::new(tmp.path());
        let err = tree.read_file("res/values-de/strings.xml", "HEAD").unwrap_err();
        assert!(err.is::<FileNotFound>());
        assert_eq!(tree.read_file_if_exists("res/values-de/strings.xml", "HEAD").unwrap(), None);

        // A directory where a file is expected is a read failure, not absence
        std::fs::create_dir_all(tmp.path().join("res/values-fr/strings.xml")).unwrap();
        assert!(tree.read_file_if_exists("res/values-fr/strings.xml", "HEAD").is_err());
    }

    #[test]
    fn local_tree_has_no_pull_requests() {
        let tmp = tempfile::tempdir().unwrap();
        let tree = LocalTree::new(tmp.path());
        assert!(!tree.supports_pull_requests());
        assert!(tree.create_branch("x", "main").is_err());
        assert!(tree.open_pull_request("t", "b", "x", "main").is_err());
    }

    #[test]
    fn in_memory_tree_records_operations() {
        use mock::InMemoryTree;

        let tree = InMemoryTree::new();
        tree.add_file("a/values/strings.xml", "x");
        tree.add_unreadable("a/values-fr/strings.xml");

        let items = tree.list_tree("main").unwrap();
        assert!(items.contains(&TreeItem::tree("a")));
        assert!(items.contains(&TreeItem::tree("a/values")));
        assert!(tree.read_file("a/values-fr/strings.xml", "main").is_err());
        assert!(tree.read_file_if_exists("a/values-fr/strings.xml", "main").is_err());
        assert_eq!(tree.read_file_if_exists("a/values-it/strings.xml", "main").unwrap(), None);

        tree.create_branch("b", "main").unwrap();
        tree.write_file("a/values-de/strings.xml", "y", "m", "b").unwrap();
        let url = tree.open_pull_request("t", "body", "b", "main").unwrap();
        assert_eq!(url, "https://example.test/pull/1");
        assert_eq!(tree.writes().len(), 1);
        assert_eq!(tree.branches(), vec![("b".to_string(), "main".to_string())]);
    }
}
