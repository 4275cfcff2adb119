use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;

use crate::persistence::{
    local::{LocalReportGenerator, LocalSubmissionStore},
    types::{ReportReference, SaveRequest, SubmissionStatus},
};

/// Abstraction over where saved annotations and their flattened image go.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    async fn save_annotation(&self, request: SaveRequest) -> anyhow::Result<SubmissionStatus>;
}

/// Abstraction over report generation for a submission.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate_report(&self, submission_id: &str) -> anyhow::Result<ReportReference>;
}

/// Bundle of collaborators used by the persistence pipeline. Each component can be mocked in tests.
#[derive(Clone)]
pub struct PersistenceDependencies {
    pub store: Arc<dyn AnnotationStore>,
    pub reports: Arc<dyn ReportGenerator>,
}

impl PersistenceDependencies {
    /// Filesystem-backed collaborators rooted at `base_dir`.
    pub fn local(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Self {
            store: Arc::new(LocalSubmissionStore::new(base_dir.clone())),
            reports: Arc::new(LocalReportGenerator::new(base_dir)),
        }
    }
}
