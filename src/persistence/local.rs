//! Filesystem-backed annotation store and report generator.
//!
//! Layout under the base directory:
//! - `<submission>/annotations.json`: persisted payload
//! - `<submission>/annotated.png`: flattened image
//! - `<submission>/report.json`: latest generated report
//! - `<submission>/status.json`: lifecycle status (`uploaded` when absent)

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::task;

use crate::persistence::{
    dependencies::{AnnotationStore, ReportGenerator},
    payload::PersistedAnnotationPayload,
    types::{ReportReference, SaveRequest, SubmissionStatus},
};

pub const ANNOTATIONS_FILE: &str = "annotations.json";
pub const IMAGE_FILE: &str = "annotated.png";
pub const REPORT_FILE: &str = "report.json";
pub const STATUS_FILE: &str = "status.json";

#[derive(Debug, Serialize, Deserialize)]
struct StatusRecord {
    status: SubmissionStatus,
}

/// Resolves the directory of one submission, rejecting ids that would escape `base_dir`.
pub fn submission_dir(base_dir: &Path, submission_id: &str) -> Result<PathBuf> {
    let valid = !submission_id.is_empty()
        && submission_id != "."
        && submission_id != ".."
        && !submission_id.contains(['/', '\\'])
        && !submission_id.contains('\0');
    if !valid {
        bail!("invalid submission id '{submission_id}'");
    }
    Ok(base_dir.join(submission_id))
}

/// Writes `bytes` to `target` through a temporary sibling file and a rename.
///
/// The temporary file is removed again when any step after creating it fails.
fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = temp_path(target);
    let tmp_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .with_context(|| format!("failed to open temporary file {}", tmp_path.display()))?;

    let result = finish_temp_file(tmp_file, &tmp_path, target, bytes);
    if result.is_err() {
        if let Err(err) = fs::remove_file(&tmp_path) {
            warn!("Failed to remove temporary file {}: {}", tmp_path.display(), err);
        }
    }
    result
}

fn finish_temp_file(mut tmp_file: File, tmp_path: &Path, target: &Path, bytes: &[u8]) -> Result<()> {
    tmp_file
        .write_all(bytes)
        .with_context(|| format!("failed to write {}", tmp_path.display()))?;
    tmp_file
        .sync_all()
        .context("failed to sync temporary file")?;
    drop(tmp_file);

    fs::rename(tmp_path, target).with_context(|| {
        format!(
            "failed to move temporary file {} -> {}",
            tmp_path.display(),
            target.display()
        )
    })
}

fn temp_path(target: &Path) -> PathBuf {
    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut candidate = target.with_file_name(format!(".{file_name}.tmp"));
    let mut counter = 0u32;
    while candidate.exists() {
        counter += 1;
        candidate = target.with_file_name(format!(".{file_name}.tmp{counter}"));
    }
    candidate
}

/// Stores submissions as plain files under a base directory.
#[derive(Debug, Clone)]
pub struct LocalSubmissionStore {
    base_dir: PathBuf,
}

impl LocalSubmissionStore {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Synchronously persists a save request.
    pub fn save_blocking(&self, request: &SaveRequest) -> Result<SubmissionStatus> {
        let dir = submission_dir(&self.base_dir, &request.submission_id)?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create submission directory {}", dir.display()))?;

        let json = request
            .payload
            .to_json_pretty()
            .context("failed to serialise annotation payload")?;

        // Image first: a payload on disk always has its matching image.
        write_atomic(&dir.join(IMAGE_FILE), &request.image_png)?;
        write_atomic(&dir.join(ANNOTATIONS_FILE), json.as_bytes())?;
        self.record_status(&request.submission_id, SubmissionStatus::Annotated)?;

        info!(
            "Stored {} annotation(s) for submission {} in {}",
            request.payload.annotations.len(),
            request.submission_id,
            dir.display()
        );
        Ok(SubmissionStatus::Annotated)
    }

    /// Current lifecycle status; a submission with nothing recorded is `Uploaded`.
    pub fn load_status(&self, submission_id: &str) -> Result<SubmissionStatus> {
        let path = submission_dir(&self.base_dir, submission_id)?.join(STATUS_FILE);
        if !path.exists() {
            return Ok(SubmissionStatus::default());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let record: StatusRecord = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(record.status)
    }

    fn record_status(&self, submission_id: &str, status: SubmissionStatus) -> Result<()> {
        let path = submission_dir(&self.base_dir, submission_id)?.join(STATUS_FILE);
        let json = serde_json::to_vec(&StatusRecord { status })
            .context("failed to serialise submission status")?;
        write_atomic(&path, &json)
    }

    /// Loads the last saved payload of a submission, if any.
    pub fn load_payload(&self, submission_id: &str) -> Result<Option<PersistedAnnotationPayload>> {
        let path = submission_dir(&self.base_dir, submission_id)?.join(ANNOTATIONS_FILE);
        if !path.exists() {
            debug!("No saved annotations at {}", path.display());
            return Ok(None);
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let payload = PersistedAnnotationPayload::from_json_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(payload))
    }
}

#[async_trait]
impl AnnotationStore for LocalSubmissionStore {
    async fn save_annotation(&self, request: SaveRequest) -> Result<SubmissionStatus> {
        let store = self.clone();
        task::spawn_blocking(move || store.save_blocking(&request))
            .await
            .map_err(|e| anyhow!("save task failed: {e}"))?
    }
}

/// Structured report written next to the saved annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    pub submission_id: String,
    /// RFC 3339 timestamp.
    pub generated_at: String,
    /// Number of annotations per shape kind.
    pub findings: BTreeMap<String, usize>,
    pub total_annotations: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
    pub annotated_image: PathBuf,
}

/// Produces `report.json` from the last saved payload of a submission.
#[derive(Debug, Clone)]
pub struct LocalReportGenerator {
    store: LocalSubmissionStore,
}

impl LocalReportGenerator {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            store: LocalSubmissionStore::new(base_dir),
        }
    }

    /// Synchronously builds and writes the report.
    pub fn generate_blocking(&self, submission_id: &str) -> Result<ReportReference> {
        let payload = self
            .store
            .load_payload(submission_id)?
            .ok_or_else(|| anyhow!("no saved annotations for submission '{submission_id}'"))?;

        let dir = submission_dir(self.store.base_dir(), submission_id)?;
        let dir = dir
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", dir.display()))?;

        let mut findings = BTreeMap::new();
        for annotation in &payload.annotations {
            *findings.entry(annotation.kind().to_string()).or_insert(0) += 1;
        }

        let report = ReportDocument {
            submission_id: submission_id.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            findings,
            total_annotations: payload.annotations.len(),
            recommendations: payload.recommendations.clone(),
            annotated_image: dir.join(IMAGE_FILE),
        };

        let report_path = dir.join(REPORT_FILE);
        let json =
            serde_json::to_vec_pretty(&report).context("failed to serialise report document")?;
        write_atomic(&report_path, &json)?;
        self.store
            .record_status(submission_id, SubmissionStatus::Reported)?;

        let url = url::Url::from_file_path(&report_path)
            .map_err(|_| anyhow!("cannot express {} as a URL", report_path.display()))?;
        info!("Report for submission {submission_id} written to {}", report_path.display());

        Ok(ReportReference {
            url: url.to_string(),
            status: SubmissionStatus::Reported,
        })
    }
}

#[async_trait]
impl ReportGenerator for LocalReportGenerator {
    async fn generate_report(&self, submission_id: &str) -> Result<ReportReference> {
        let generator = self.clone();
        let submission_id = submission_id.to_string();
        task::spawn_blocking(move || generator.generate_blocking(&submission_id))
            .await
            .map_err(|e| anyhow!("report task failed: {e}"))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("annotations.json");
        fs::write(&target, b"old").unwrap();

        write_atomic(&target, b"new").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn failed_write_atomic_leaves_no_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory in the way makes the final rename fail.
        let target = dir.path().join("annotated.png");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), b"x").unwrap();

        assert!(write_atomic(&target, b"png bytes").is_err());
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name.to_string_lossy().contains(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "left behind: {leftovers:?}");
    }
}
