use std::collections::HashMap;
use std::fs;
use std::sync::Mutex;

use strings_translator::batcher::{self, BatchOptions};
use strings_translator::error::{Error, FileNotFound, ProviderError};
use strings_translator::model::{TranslationRequestBatch, TreeItem};
use strings_translator::publish::{self, PublishOptions};
use strings_translator::tree::{LocalTree, SourceTreeProvider};
use strings_translator::{merger, parser, serializer, RepositoryScanner};
use tempfile::tempdir;

type Mapping = Result<HashMap<String, String>, ProviderError>;

fn options() -> BatchOptions {
    BatchOptions {
        batch_size: 2,
        delay: std::time::Duration::ZERO,
        ..BatchOptions::default()
    }
}

fn write(root: &std::path::Path, path: &str, content: &str) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

#[test]
fn scan_translate_publish_local_checkout() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    write(
        root,
        "composeApp/src/commonMain/composeResources/values/strings.xml",
        r#"<resources>
    <string name="title">Recipes</string>
    <string name="empty">Nothing here yet</string>
    <string name="add">Add recipe</string>
</resources>"#,
    );
    write(
        root,
        "composeApp/src/commonMain/composeResources/values-it/strings.xml",
        r#"<resources><string name="title">Ricette</string></resources>"#,
    );

    let tree = LocalTree::new(root);
    let scan = RepositoryScanner::default().scan_provider(&tree, "HEAD").unwrap();
    assert_eq!(scan.missing_by_locale["it"], vec!["empty", "add"]);

    let calls = Mutex::new(0);
    let provider = |batch: &TranslationRequestBatch| -> Mapping {
        *calls.lock().unwrap() += 1;
        Ok(batch
            .keys
            .iter()
            .map(|k| (k.key.clone(), format!("[{}] {}", batch.target_locale, k.value)))
            .collect())
    };

    let locales = vec!["it".to_string(), "de".to_string()];
    let outcomes = batcher::translate_locales(&locales, &scan, &options(), &provider);
    let translations: Vec<_> = outcomes.into_iter().map(|(_, r)| r.unwrap()).collect();
    // it: 2 keys in one batch; de: 3 keys in two batches
    assert_eq!(*calls.lock().unwrap(), 3);

    let report = publish::publish(
        &tree,
        scan.default_file_path(),
        &translations,
        &PublishOptions {
            base_branch: "main".into(),
            branch_prefix: "translations/batch-".into(),
            dry_run: false,
        },
    )
    .unwrap();
    assert!(report.pull_request.is_none());
    assert_eq!(report.files.len(), 2);

    let it = fs::read_to_string(
        root.join("composeApp/src/commonMain/composeResources/values-it/strings.xml"),
    )
    .unwrap();
    let entries = parser::parse(&it);
    let pairs: Vec<(&str, &str)> = entries
        .iter()
        .map(|e| (e.key.as_str(), e.value.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("add", "[it] Add recipe"),
            ("empty", "[it] Nothing here yet"),
            ("title", "Ricette"),
        ]
    );

    // Publishing again changes nothing
    let rescan = RepositoryScanner::default().scan_provider(&tree, "HEAD").unwrap();
    assert!(rescan.missing_by_locale["it"].is_empty());
    assert!(rescan.missing_by_locale["de"].is_empty());
}

#[test]
fn fatal_provider_error_aborts_only_that_locale() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    write(
        root,
        "values/strings.xml",
        r#"<resources><string name="a">A</string></resources>"#,
    );
    let scan = RepositoryScanner::default()
        .scan_provider(&LocalTree::new(root), "HEAD")
        .unwrap();

    let provider = |batch: &TranslationRequestBatch| -> Mapping {
        if batch.target_locale == "fr" {
            Err(ProviderError::Unauthorized("HTTP 403".into()))
        } else {
            Err(ProviderError::Status {
                status: 503,
                body: "overloaded".into(),
            })
        }
    };

    let locales = vec!["fr".to_string(), "es".to_string()];
    let outcomes = batcher::translate_locales(&locales, &scan, &options(), &provider);
    assert!(matches!(outcomes[0].1, Err(Error::Provider { .. })));
    let es = outcomes[1].1.as_ref().unwrap();
    assert_eq!(es.entries[0].translated_value, "[Translation needed for: A]");
}

/// Records writes and pull requests like a hosted repository would
#[derive(Default)]
struct RecordingHost {
    files: Mutex<HashMap<String, String>>,
    log: Mutex<Vec<String>>,
}

impl SourceTreeProvider for RecordingHost {
    fn list_tree(&self, _reference: &str) -> anyhow::Result<Vec<TreeItem>> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .keys()
            .cloned()
            .map(TreeItem::blob)
            .collect())
    }

    fn read_file(&self, path: &str, _reference: &str) -> anyhow::Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                anyhow::Error::new(FileNotFound {
                    path: path.to_string(),
                })
            })
    }

    fn write_file(&self, path: &str, content: &str, message: &str, branch: &str) -> anyhow::Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        self.log
            .lock()
            .unwrap()
            .push(format!("write {} on {}: {}", path, branch, message));
        Ok(())
    }

    fn create_branch(&self, new_name: &str, base_ref: &str) -> anyhow::Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("branch {} from {}", new_name, base_ref));
        Ok(())
    }

    fn open_pull_request(&self, title: &str, _body: &str, head: &str, base: &str) -> anyhow::Result<String> {
        self.log
            .lock()
            .unwrap()
            .push(format!("pr {} -> {}: {}", head, base, title));
        Ok("https://github.test/acme/app/pull/7".to_string())
    }
}

#[test]
fn hosted_publish_branches_commits_and_opens_pull_request() {
    let host = RecordingHost::default();
    host.files.lock().unwrap().insert(
        "res/values/strings.xml".into(),
        r#"<resources><string name="hello">Hello</string></resources>"#.into(),
    );

    let scan = RepositoryScanner::default().scan_provider(&host, "develop").unwrap();
    let provider = |_: &TranslationRequestBatch| -> Mapping {
        Ok(HashMap::from([("hello".to_string(), "Hallo".to_string())]))
    };
    let de = batcher::translate_missing(
        "de",
        &scan.missing_for("de"),
        &scan.default_strings,
        &options(),
        &provider,
    )
    .unwrap();

    let report = publish::publish(
        &host,
        scan.default_file_path(),
        &[strings_translator::LocaleTranslation {
            locale: "de".into(),
            entries: de,
        }],
        &PublishOptions {
            base_branch: "develop".into(),
            branch_prefix: "l10n/".into(),
            dry_run: false,
        },
    )
    .unwrap();

    let branch = report.branch.unwrap();
    let log = host.log.lock().unwrap().clone();
    assert_eq!(log.len(), 3);
    assert_eq!(log[0], format!("branch {} from develop", branch));
    assert_eq!(
        log[1],
        format!("write res/values-de/strings.xml on {}: Update German translations", branch)
    );
    assert_eq!(log[2], format!("pr {} -> develop: Add translations for 1 language(s)", branch));
    assert_eq!(report.pull_request.as_deref(), Some("https://github.test/acme/app/pull/7"));

    let written = host.read_file("res/values-de/strings.xml", &branch).unwrap();
    assert_eq!(
        written,
        serializer::serialize(&merger::to_string_entries(&merger::merge(
            &[],
            &[strings_translator::TranslatedEntry {
                key: "hello".into(),
                original_value: "Hello".into(),
                translated_value: "Hallo".into(),
                locale: "de".into(),
            }]
        )))
    );
}
