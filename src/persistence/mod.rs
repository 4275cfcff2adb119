//! Saving annotations and requesting reports.
//!
//! This module provides:
//! - The portable JSON payload and its lenient reader
//! - Collaborator traits for the annotation store and the report generator
//! - A background manager so saves never block the drawing loop
//! - Filesystem implementations of both collaborators

pub mod dependencies;
pub mod local;
pub mod payload;
pub mod types;

mod manager;
mod pipeline;

pub use dependencies::{AnnotationStore, PersistenceDependencies, ReportGenerator};
pub use local::{LocalReportGenerator, LocalSubmissionStore, ReportDocument};
pub use manager::PersistenceManager;
pub use payload::{PersistedAnnotationPayload, to_data_uri};
pub use pipeline::{perform_report, perform_save};
pub use types::{
    JobStatus, PersistError, PersistOutcome, PersistStatus, ReportReference, SaveRequest,
    SubmissionStatus,
};
