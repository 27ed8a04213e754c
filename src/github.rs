use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::env;

use crate::config::GitHubConfig;
use crate::error::FileNotFound;
use crate::logging;
use crate::model::TreeItem;
use crate::policy::RepositoryInfo;
use crate::tree::SourceTreeProvider;

const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";

/// A GitHub repository accessed through the REST v3 API
#[derive(Debug, Clone)]
pub struct GitHubTree {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ShaObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: ShaObject,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    tree: ShaObject,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    name: String,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    size: u64,
}

impl GitHubTree {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("strings-translator/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
        })
    }

    /// Point at a GitHub Enterprise installation
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn from_config(config: &GitHubConfig) -> Result<Self> {
        let owner = config
            .owner
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow!("GitHub owner is not configured. Set github.owner in the config file."))?;
        let repo = config
            .repo
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow!("GitHub repository is not configured. Set github.repo in the config file."))?;
        let token = resolve_token(config.token.as_deref(), env::var("GITHUB_TOKEN").ok())?;

        let tree = Self::new(owner, repo, token)?;
        Ok(match &config.api_url {
            Some(url) => tree.with_api_url(url.clone()),
            None => tree,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Metadata used by the repository policy
    pub fn repository_info(&self) -> Result<RepositoryInfo> {
        let url = self.repo_url(&[])?;
        let repo: RepoResponse = self.get_json(url)?;

        let url = self.repo_url(&["languages"])?;
        let languages: HashMap<String, u64> = self.get_json(url)?;
        let mut languages: Vec<(String, u64)> = languages.into_iter().collect();
        // Largest share first, as GitHub displays them
        languages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(RepositoryInfo {
            name: repo.name,
            description: repo.description,
            language: repo.language,
            languages: languages.into_iter().map(|(name, _)| name).collect(),
            size: repo.size,
        })
    }

    fn repo_url(&self, segments: &[&str]) -> Result<Url> {
        let mut all = vec!["repos", self.owner.as_str(), self.repo.as_str()];
        all.extend_from_slice(segments);
        api_url(&self.api_url, &all)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", self.token))
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T> {
        let response = self
            .authorized(self.client.get(url.clone()))
            .header("Accept", "application/vnd.github+json")
            .send()
            .with_context(|| format!("GitHub request failed: {}", url))?;
        ensure_success(response, &url)?
            .json()
            .with_context(|| format!("Failed to parse GitHub response: {}", url))
    }

    fn send_json<T: for<'de> Deserialize<'de>>(
        &self,
        request: RequestBuilder,
        url: &Url,
        body: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .authorized(request)
            .header("Accept", "application/vnd.github+json")
            .json(&body)
            .send()
            .with_context(|| format!("GitHub request failed: {}", url))?;
        ensure_success(response, url)?
            .json()
            .with_context(|| format!("Failed to parse GitHub response: {}", url))
    }

    fn head_commit(&self, branch: &str) -> Result<String> {
        let url = self.repo_url(&ref_segments("ref", branch))?;
        let reference: RefResponse = self.get_json(url)?;
        Ok(reference.object.sha)
    }

    /// Head commit of `branch` and the SHA of its root tree
    fn head_tree(&self, branch: &str) -> Result<(String, String)> {
        let head = self.head_commit(branch)?;
        let url = self.repo_url(&["git", "commits", head.as_str()])?;
        let commit: CommitResponse = self.get_json(url)?;
        Ok((head, commit.tree.sha))
    }
}

impl SourceTreeProvider for GitHubTree {
    fn list_tree(&self, reference: &str) -> Result<Vec<TreeItem>> {
        // Branch names may contain slashes, so list by tree SHA
        let (_, tree_sha) = self.head_tree(reference)?;
        let mut url = self.repo_url(&["git", "trees", tree_sha.as_str()])?;
        url.query_pairs_mut().append_pair("recursive", "1");
        let response: TreeResponse = self.get_json(url)?;
        if response.truncated {
            logging::warn(&format!(
                "Tree of {} at {} is truncated; some resource files may be missed",
                self.full_name(),
                reference
            ));
        }
        Ok(tree_items(response.tree))
    }

    fn read_file(&self, path: &str, reference: &str) -> Result<String> {
        let mut segments = vec!["contents"];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        let mut url = self.repo_url(&segments)?;
        url.query_pairs_mut().append_pair("ref", reference);

        let response = self
            .authorized(self.client.get(url.clone()))
            .header("Accept", "application/vnd.github.raw+json")
            .send()
            .with_context(|| format!("GitHub request failed: {}", url))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(anyhow::Error::new(FileNotFound {
                path: path.to_string(),
            }));
        }
        ensure_success(response, &url)?
            .text()
            .with_context(|| format!("Failed to read {} from {}", path, self.full_name()))
    }

    fn write_file(&self, path: &str, content: &str, message: &str, branch: &str) -> Result<()> {
        let (parent, base_tree) = self.head_tree(branch)?;

        let url = self.repo_url(&["git", "trees"])?;
        let tree: ShaObject = self.send_json(
            self.client.post(url.clone()),
            &url,
            json!({
                "base_tree": base_tree,
                "tree": [{ "path": path, "mode": "100644", "type": "blob", "content": content }],
            }),
        )?;

        let url = self.repo_url(&["git", "commits"])?;
        let new_commit: ShaObject = self.send_json(
            self.client.post(url.clone()),
            &url,
            json!({ "message": message, "tree": tree.sha, "parents": [parent] }),
        )?;

        let url = self.repo_url(&ref_segments("refs", branch))?;
        let _: serde_json::Value = self.send_json(
            self.client.patch(url.clone()),
            &url,
            json!({ "sha": new_commit.sha }),
        )?;

        logging::debug(&format!("Committed {} to {}", path, branch));
        Ok(())
    }

    fn create_branch(&self, new_name: &str, base_ref: &str) -> Result<()> {
        let sha = self.head_commit(base_ref)?;
        let url = self.repo_url(&["git", "refs"])?;
        let _: serde_json::Value = self.send_json(
            self.client.post(url.clone()),
            &url,
            json!({ "ref": format!("refs/heads/{}", new_name), "sha": sha }),
        )?;
        logging::debug(&format!("Created branch {} from {}", new_name, base_ref));
        Ok(())
    }

    fn open_pull_request(&self, title: &str, body: &str, head: &str, base: &str) -> Result<String> {
        let url = self.repo_url(&["pulls"])?;
        let pull: PullResponse = self.send_json(
            self.client.post(url.clone()),
            &url,
            json!({ "title": title, "body": body, "head": head, "base": base }),
        )?;
        Ok(pull.html_url)
    }
}

fn resolve_token(configured: Option<&str>, from_env: Option<String>) -> Result<String> {
    if let Some(token) = configured {
        if !token.trim().is_empty() {
            return Ok(token.to_string());
        }
    }

    if let Some(token) = from_env {
        if !token.trim().is_empty() {
            return Ok(token);
        }
    }

    bail!("GitHub token is not configured. Set github.token in the config file or GITHUB_TOKEN.");
}

/// `heads/<branch>` under `git/<kind>`; branch names may contain slashes
fn ref_segments<'a>(kind: &'a str, branch: &'a str) -> Vec<&'a str> {
    let mut segments = vec!["git", kind, "heads"];
    segments.extend(branch.split('/').filter(|s| !s.is_empty()));
    segments
}

fn api_url(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("Invalid GitHub API URL: {}", base))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("GitHub API URL cannot have a path: {}", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn tree_items(entries: Vec<TreeEntry>) -> Vec<TreeItem> {
    entries
        .into_iter()
        .filter_map(|entry| match entry.kind.as_str() {
            "blob" => Some(TreeItem::blob(entry.path)),
            "tree" => Some(TreeItem::tree(entry.path)),
            // Submodules ("commit") are not part of this repository
            _ => None,
        })
        .collect()
}

fn ensure_success(response: Response, url: &Url) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status();
        let body = response.text().unwrap_or_default();
        bail!("GitHub API error ({} {}): {}", url, status, body);
    }
}
