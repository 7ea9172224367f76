use crate::status::{Stage, StatusRecord};
use anyhow::{Context, Result};
use ingest::CatalogEntry;
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Per-document artifact families, each in its own directory and keyed by
/// doc_id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Document,
    Classification,
    Extraction,
}

impl ArtifactKind {
    fn dir(self) -> &'static str {
        match self {
            ArtifactKind::Document => "normalized",
            ArtifactKind::Classification => "classified",
            ArtifactKind::Extraction => "extracted",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::Document => ".json",
            ArtifactKind::Classification => ".classify.json",
            ArtifactKind::Extraction => ".extract.json",
        }
    }
}

/// File-backed store for per-document artifacts, status records, and the
/// append-only catalog log.
///
/// Every write goes through write-then-publish: serialize to a sibling
/// `.tmp` file, then rename into place. Readers never observe a partial
/// artifact, and a crash mid-write leaves at most a stray temp file.
pub struct ArtifactStore {
    root: PathBuf,
}

const STATUS_DIR: &str = "status";
const CATALOG_FILE: &str = "catalog.jsonl";

impl ArtifactStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for kind in [ArtifactKind::Document, ArtifactKind::Classification, ArtifactKind::Extraction] {
            fs::create_dir_all(root.join(kind.dir()))?;
        }
        fs::create_dir_all(root.join(STATUS_DIR))?;
        Ok(Self { root })
    }

    fn artifact_path(&self, kind: ArtifactKind, doc_id: &str) -> PathBuf {
        self.root.join(kind.dir()).join(format!("{doc_id}{}", kind.suffix()))
    }

    fn status_path(&self, doc_id: &str) -> PathBuf {
        self.root.join(STATUS_DIR).join(format!("{doc_id}.json"))
    }

    pub fn write_artifact<T: Serialize>(&self, kind: ArtifactKind, doc_id: &str, value: &T) -> Result<()> {
        write_json_atomic(&self.artifact_path(kind, doc_id), value)
    }

    pub fn read_artifact<T: DeserializeOwned>(&self, kind: ArtifactKind, doc_id: &str) -> Result<T> {
        let path = self.artifact_path(kind, doc_id);
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("missing artifact: {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("corrupt artifact: {}", path.display()))
    }

    pub fn artifact_exists(&self, kind: ArtifactKind, doc_id: &str) -> bool {
        self.artifact_path(kind, doc_id).exists()
    }

    /// Number of artifacts of one kind, for idempotence checks and summaries.
    pub fn count_artifacts(&self, kind: ArtifactKind) -> Result<usize> {
        let suffix = kind.suffix();
        let mut n = 0;
        for entry in fs::read_dir(self.root.join(kind.dir()))? {
            let name = entry?.file_name();
            if name.to_string_lossy().ends_with(suffix) {
                n += 1;
            }
        }
        Ok(n)
    }

    pub fn write_status(&self, doc_id: &str, stage: Stage) -> Result<()> {
        write_json_atomic(&self.status_path(doc_id), &StatusRecord::new(doc_id, stage))
    }

    pub fn read_status(&self, doc_id: &str) -> Option<StatusRecord> {
        let raw = fs::read_to_string(self.status_path(doc_id)).ok()?;
        serde_json::from_str(&raw).ok()
    }

    pub fn status_exists(&self, doc_id: &str) -> bool {
        self.status_path(doc_id).exists()
    }

    /// All status records, sorted by doc_id for deterministic batch order.
    pub fn list_statuses(&self) -> Result<Vec<StatusRecord>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(self.root.join(STATUS_DIR))? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                let raw = fs::read_to_string(&path)?;
                if let Ok(record) = serde_json::from_str::<StatusRecord>(&raw) {
                    out.push(record);
                }
            }
        }
        out.sort_by(|a, b| a.doc_id.cmp(&b.doc_id));
        Ok(out)
    }

    /// Append one line to the catalog log.
    pub fn append_catalog(&self, entry: &CatalogEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(CATALOG_FILE))?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    pub fn read_catalog(&self) -> Result<Vec<CatalogEntry>> {
        let path = self.root.join(CATALOG_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(path)?;
        raw.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).context("corrupt catalog line"))
            .collect()
    }
}

/// Serialize to `<path>.tmp`, then rename over the final path. Rename within
/// one directory is atomic on POSIX filesystems.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("tmp");
    let body = serde_json::to_string_pretty(value)?;
    fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("publishing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn artifacts_round_trip_by_doc_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        let doc_id = "sha256:abc";

        store
            .write_artifact(ArtifactKind::Classification, doc_id, &json!({"is_incident": true}))
            .unwrap();
        assert!(store.artifact_exists(ArtifactKind::Classification, doc_id));
        assert!(!store.artifact_exists(ArtifactKind::Extraction, doc_id));

        let got: serde_json::Value = store.read_artifact(ArtifactKind::Classification, doc_id).unwrap();
        assert_eq!(got["is_incident"], true);
    }

    #[test]
    fn publish_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        store
            .write_artifact(ArtifactKind::Document, "sha256:x", &json!({"k": "v"}))
            .unwrap();

        let names: Vec<String> = fs::read_dir(dir.path().join("normalized"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["sha256:x.json"]);
    }

    #[test]
    fn status_records_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        assert!(store.read_status("sha256:x").is_none());

        store.write_status("sha256:x", Stage::Normalized).unwrap();
        store.write_status("sha256:y", Stage::Classified).unwrap();
        assert_eq!(store.read_status("sha256:x").unwrap().stage, Stage::Normalized);

        // Overwrite advances the stage in place.
        store.write_status("sha256:x", Stage::Classified).unwrap();
        assert_eq!(store.read_status("sha256:x").unwrap().stage, Stage::Classified);

        let all = store.list_statuses().unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].doc_id < all[1].doc_id);
    }

    #[test]
    fn catalog_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path()).unwrap();
        assert!(store.read_catalog().unwrap().is_empty());

        for i in 0..3 {
            store
                .append_catalog(&CatalogEntry {
                    doc_id: format!("sha256:{i}"),
                    source_id: "s".into(),
                    url: "https://e.com".into(),
                    title: "t".into(),
                    published_at: chrono::Utc::now(),
                })
                .unwrap();
        }
        let entries = store.read_catalog().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].doc_id, "sha256:2");
    }
}
