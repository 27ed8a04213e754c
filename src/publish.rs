use serde::Serialize;
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::Config;
use crate::error::{Error, PublishError};
use crate::languages;
use crate::logging;
use crate::merger;
use crate::model::LocaleTranslation;
use crate::parser::{self, RawResources};
use crate::serializer;
use crate::tree::SourceTreeProvider;

/// Where and how translated files are written
#[derive(Debug, Clone)]
pub struct PublishOptions {
    /// Branch existing locale files are read from and pull requests target
    pub base_branch: String,
    pub branch_prefix: String,
    /// Compute files without writing anything
    pub dry_run: bool,
}

impl PublishOptions {
    pub fn from_config(config: &Config, dry_run: bool) -> Self {
        Self {
            base_branch: config.github.branch.clone(),
            branch_prefix: config.branch_prefix.clone(),
            dry_run,
        }
    }
}

/// One locale file after merging
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedFile {
    pub locale: String,
    pub path: String,
    #[serde(skip)]
    pub content: String,
    /// Strings the merged file contains
    pub string_count: usize,
    /// Strings that were not in the file before
    pub added_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReport {
    pub branch: Option<String>,
    pub pull_request: Option<String>,
    pub files: Vec<PlannedFile>,
    pub dry_run: bool,
}

/// Merge each locale's translations with the file already in the tree and
/// render the result. Locales without entries are left alone.
///
/// Only a missing file starts from scratch; one that exists but cannot be read
/// or parsed is an error.
pub fn plan<P>(
    provider: &P,
    default_path: &str,
    translations: &[LocaleTranslation],
    reference: &str,
) -> Result<Vec<PlannedFile>, Error>
where
    P: SourceTreeProvider + ?Sized,
{
    translations
        .iter()
        .filter(|translation| {
            if translation.entries.is_empty() {
                logging::info(&format!("{}: nothing to publish", translation.locale));
            }
            !translation.entries.is_empty()
        })
        .map(|translation| plan_locale(provider, default_path, translation, reference))
        .collect()
}

fn plan_locale<P>(
    provider: &P,
    default_path: &str,
    translation: &LocaleTranslation,
    reference: &str,
) -> Result<PlannedFile, Error>
where
    P: SourceTreeProvider + ?Sized,
{
    let path = serializer::target_path(default_path, &translation.locale);
    let current = provider
        .read_file_if_exists(&path, reference)
        .map_err(|e| PublishError::Read {
            path: path.clone(),
            message: format!("{:#}", e),
        })?;

    let (existing, raw) = match current {
        Some(content) => {
            let raw = parser::parse_raw(&content).map_err(|e| PublishError::Read {
                path: path.clone(),
                message: e.to_string(),
            })?;
            (parser::parse(&content), raw)
        }
        None => {
            logging::debug(&format!("{}: starting a new file", path));
            (Vec::new(), RawResources::default())
        }
    };

    let merged = merger::merge_into_locale(&existing, &translation.entries, &translation.locale);
    let known: HashSet<&str> = existing.iter().map(|e| e.key.as_str()).collect();
    let added_count = merged
        .iter()
        .filter(|t| !known.contains(t.key.as_str()))
        .count();
    logging::info(&format!(
        "{}: {} existing + {} new string(s) -> {}",
        translation.locale,
        merged.len() - added_count,
        added_count,
        path
    ));

    Ok(PlannedFile {
        locale: translation.locale.clone(),
        content: serializer::serialize_over(&merged, &raw),
        string_count: merged.len(),
        added_count,
        path,
    })
}

/// Write merged locale files. Trees that support pull requests get a fresh
/// branch, one commit per file and a pull request against the base branch;
/// other trees are written in place.
pub fn publish<P>(
    provider: &P,
    default_path: Option<&str>,
    translations: &[LocaleTranslation],
    options: &PublishOptions,
) -> Result<PublishReport, Error>
where
    P: SourceTreeProvider + ?Sized,
{
    let default_path = default_path.ok_or(PublishError::NoDefaultPath)?;
    let files = plan(provider, default_path, translations, &options.base_branch)?;

    let mut report = PublishReport {
        branch: None,
        pull_request: None,
        files,
        dry_run: options.dry_run,
    };
    if report.files.is_empty() || options.dry_run {
        return Ok(report);
    }

    let with_pull_request = provider.supports_pull_requests();
    let branch = if with_pull_request {
        let branch = branch_name(&options.branch_prefix, SystemTime::now());
        provider
            .create_branch(&branch, &options.base_branch)
            .map_err(|e| PublishError::Branch {
                branch: branch.clone(),
                message: format!("{:#}", e),
            })?;
        logging::info(&format!("Created branch {}", branch));
        branch
    } else {
        options.base_branch.clone()
    };

    for file in &report.files {
        let message = format!("Update {} translations", languages::display_name(&file.locale));
        provider
            .write_file(&file.path, &file.content, &message, &branch)
            .map_err(|e| PublishError::Write {
                path: file.path.clone(),
                message: format!("{:#}", e),
            })?;
    }

    if with_pull_request {
        let url = provider
            .open_pull_request(
                &pull_request_title(&report.files),
                &pull_request_body(&report.files, &options.base_branch),
                &branch,
                &options.base_branch,
            )
            .map_err(|e| PublishError::PullRequest(format!("{:#}", e)))?;
        logging::info(&format!("Opened pull request {}", url));
        report.branch = Some(branch);
        report.pull_request = Some(url);
    }

    Ok(report)
}

/// `{prefix}{seconds since the epoch}`
pub fn branch_name(prefix: &str, now: SystemTime) -> String {
    let secs = now.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    format!("{}{}", prefix, secs)
}

pub fn pull_request_title(files: &[PlannedFile]) -> String {
    format!("Add translations for {} language(s)", files.len())
}

pub fn pull_request_body(files: &[PlannedFile], base_branch: &str) -> String {
    let total: usize = files.iter().map(|f| f.added_count).sum();
    let names: Vec<String> = files
        .iter()
        .map(|f| languages::display_name(&f.locale))
        .collect();

    let mut body = String::from("## Translation Update\n\n");
    body.push_str("This PR adds automated translations for the following languages:\n\n");
    for (file, name) in files.iter().zip(&names) {
        body.push_str(&format!("- **{}** (`{}`): {} new string(s)\n", name, file.locale, file.added_count));
    }
    body.push_str("\n### Summary\n");
    body.push_str(&format!("- **Total strings translated**: {}\n", total));
    body.push_str(&format!("- **Languages**: {}\n", names.join(", ")));
    body.push_str(&format!("- **Source branch**: {}\n", base_branch));
    body.push_str("\n### Files Added/Updated\n");
    for file in files {
        body.push_str(&format!("- `{}`\n", file.path));
    }
    body.push_str("\n---\nExisting translations were kept as they are. Please review the new strings before merging.\n");
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TranslatedEntry;
    use crate::tree::mock::InMemoryTree;
    use std::time::Duration;

    const DEFAULT: &str = "app/src/main/res/values/strings.xml";

    fn translation(locale: &str, pairs: &[(&str, &str)]) -> LocaleTranslation {
        LocaleTranslation {
            locale: locale.to_string(),
            entries: pairs
                .iter()
                .map(|(key, value)| TranslatedEntry {
                    key: key.to_string(),
                    original_value: String::new(),
                    translated_value: value.to_string(),
                    locale: locale.to_string(),
                })
                .collect(),
        }
    }

    fn options(dry_run: bool) -> PublishOptions {
        PublishOptions {
            base_branch: "main".to_string(),
            branch_prefix: "translations/batch-".to_string(),
            dry_run,
        }
    }

    #[test]
    fn existing_translations_survive_publish() {
        let tree = InMemoryTree::new();
        tree.add_file(
            "app/src/main/res/values-es/strings.xml",
            r#"<resources><string name="welcome">Hola (revisado)</string></resources>"#,
        );

        let report = publish(
            &tree,
            Some(DEFAULT),
            &[translation("es", &[("welcome", "Hola"), ("bye", "Adiós")])],
            &options(false),
        )
        .unwrap();

        let written = tree.file("app/src/main/res/values-es/strings.xml").unwrap();
        assert_eq!(
            written,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<resources>\n    <string name=\"bye\">Adiós</string>\n    <string name=\"welcome\">Hola (revisado)</string>\n</resources>\n"
        );
        assert_eq!(report.files[0].added_count, 1);
        assert_eq!(report.files[0].string_count, 2);
    }

    #[test]
    fn unreadable_existing_file_stops_publish() {
        let tree = InMemoryTree::new();
        tree.add_unreadable("app/src/main/res/values-es/strings.xml");

        let err = publish(
            &tree,
            Some(DEFAULT),
            &[translation("es", &[("bye", "Adiós")]), translation("fr", &[("bye", "Salut")])],
            &options(false),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            Error::Publish(PublishError::Read { ref path, .. }) if path == "app/src/main/res/values-es/strings.xml"
        ));
        assert!(tree.branches().is_empty());
        assert!(tree.writes().is_empty());
        assert!(tree.pull_requests().is_empty());
    }

    #[test]
    fn malformed_existing_file_is_not_overwritten() {
        let tree = InMemoryTree::new();
        let broken = r#"<resources><string name="welcome">Hola</strin></resources>"#;
        tree.add_file("app/src/main/res/values-es/strings.xml", broken);

        let err = publish(&tree, Some(DEFAULT), &[translation("es", &[("bye", "Adiós")])], &options(false))
            .unwrap_err();
        assert!(matches!(err, Error::Publish(PublishError::Read { .. })));
        assert_eq!(tree.file("app/src/main/res/values-es/strings.xml").as_deref(), Some(broken));
    }

    #[test]
    fn existing_markup_and_plurals_survive_publish() {
        let tree = InMemoryTree::new();
        tree.add_file(
            "app/src/main/res/values-es/strings.xml",
            r#"<resources>
    <!-- reviewed -->
    <string name="w">Hola <b>amigo</b></string>
    <plurals name="n">
        <item quantity="one">%d libro</item>
        <item quantity="other">%d libros</item>
    </plurals>
</resources>"#,
        );

        let report = publish(
            &tree,
            Some(DEFAULT),
            &[translation("es", &[("w", "Hola amigo"), ("bye", "Adiós")])],
            &options(false),
        )
        .unwrap();

        let written = tree.file("app/src/main/res/values-es/strings.xml").unwrap();
        assert!(written.contains(r#"<string name="bye">Adiós</string>"#));
        assert!(written.contains(r#"<string name="w">Hola <b>amigo</b></string>"#));
        assert!(written.contains(r#"<item quantity="other">%d libros</item>"#));
        assert!(written.contains("<!-- reviewed -->"));
        assert_eq!(report.files[0].added_count, 1);
        assert_eq!(report.files[0].string_count, 2);
    }

    #[test]
    fn pull_request_flow() {
        let tree = InMemoryTree::new();
        let report = publish(
            &tree,
            Some(DEFAULT),
            &[
                translation("es", &[("welcome", "Hola")]),
                translation("fr", &[("welcome", "Bonjour")]),
            ],
            &options(false),
        )
        .unwrap();

        let branch = report.branch.clone().unwrap();
        assert!(branch.starts_with("translations/batch-"));
        assert_eq!(tree.branches(), vec![(branch.clone(), "main".to_string())]);

        let writes = tree.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].message, "Update Spanish translations");
        assert_eq!(writes[1].path, "app/src/main/res/values-fr/strings.xml");
        assert!(writes.iter().all(|w| w.branch == branch));

        let prs = tree.pull_requests();
        assert_eq!(prs[0].title, "Add translations for 2 language(s)");
        assert_eq!(prs[0].base, "main");
        assert!(prs[0].body.contains("**French** (`fr`): 1 new string(s)"));
        assert_eq!(report.pull_request.as_deref(), Some("https://example.test/pull/1"));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let tree = InMemoryTree::new();
        let report = publish(
            &tree,
            Some(DEFAULT),
            &[translation("de", &[("welcome", "Hallo")])],
            &options(true),
        )
        .unwrap();
        assert!(report.dry_run);
        assert_eq!(report.files.len(), 1);
        assert!(report.files[0].content.contains("Hallo"));
        assert!(tree.writes().is_empty());
        assert!(tree.branches().is_empty());
    }

    #[test]
    fn empty_translations_open_no_pull_request() {
        let tree = InMemoryTree::new();
        let report = publish(&tree, Some(DEFAULT), &[translation("ja", &[])], &options(false)).unwrap();
        assert!(report.files.is_empty());
        assert!(tree.pull_requests().is_empty());
    }

    #[test]
    fn unknown_default_path_is_an_error() {
        let tree = InMemoryTree::new();
        let err = publish(&tree, None, &[translation("es", &[("a", "b")])], &options(false)).unwrap_err();
        assert!(matches!(err, Error::Publish(PublishError::NoDefaultPath)));
    }

    #[test]
    fn branch_name_uses_epoch_seconds() {
        let at = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(branch_name("translations/batch-", at), "translations/batch-1700000000");
    }
}
