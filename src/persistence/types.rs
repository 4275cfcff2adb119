//! Data types shared by the persistence pipeline and its collaborators.

use super::payload::PersistedAnnotationPayload;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Lifecycle state of a submission as reported by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Photo uploaded, no annotations saved yet.
    #[default]
    Uploaded,
    /// Annotations have been saved.
    Annotated,
    /// A report has been generated.
    Reported,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionStatus::Uploaded => "uploaded",
            SubmissionStatus::Annotated => "annotated",
            SubmissionStatus::Reported => "reported",
        };
        f.write_str(name)
    }
}

/// Where a generated report can be fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportReference {
    pub url: String,
    /// Submission status once the report exists.
    pub status: SubmissionStatus,
}

/// Everything the store needs to persist one save.
///
/// Built from an owned snapshot, so later drawing never leaks into a save
/// that is already on its way.
#[derive(Clone)]
pub struct SaveRequest {
    pub submission_id: String,
    pub payload: PersistedAnnotationPayload,
    /// Flattened annotated image (PNG).
    pub image_png: Vec<u8>,
}

impl fmt::Debug for SaveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveRequest")
            .field("submission_id", &self.submission_id)
            .field("annotations", &self.payload.annotations.len())
            .field("image_png_bytes", &self.image_png.len())
            .finish()
    }
}

/// Finished save or report request, collected by the editing session.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    Saved {
        submission_id: String,
        /// Collection revision captured in the snapshot.
        revision: u64,
        status: SubmissionStatus,
    },
    SaveFailed {
        submission_id: String,
        revision: u64,
        message: String,
    },
    Reported {
        submission_id: String,
        reference: ReportReference,
    },
    ReportFailed {
        submission_id: String,
        message: String,
    },
}

/// State of one kind of background job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JobStatus {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed(String),
}

/// Snapshot of both background jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistStatus {
    pub save: JobStatus,
    pub report: JobStatus,
}

/// Errors raised while saving annotations or generating reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    #[error("failed to save annotations: {0}")]
    Save(String),

    #[error("failed to generate report: {0}")]
    Report(String),

    #[error("a save is already in progress")]
    SaveInFlight,

    #[error("report generation is already in progress")]
    ReportInFlight,

    #[error("cannot snapshot canvas: {0}")]
    Snapshot(String),

    #[error("persistence manager is not running")]
    ManagerStopped,
}
