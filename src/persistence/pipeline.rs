use std::sync::Arc;

use crate::persistence::{
    dependencies::PersistenceDependencies,
    types::{PersistError, ReportReference, SaveRequest, SubmissionStatus},
};

/// Hands one snapshot to the annotation store.
pub async fn perform_save(
    request: SaveRequest,
    dependencies: Arc<PersistenceDependencies>,
) -> Result<SubmissionStatus, PersistError> {
    log::info!(
        "Saving {} annotation(s) for submission {} ({} byte image)",
        request.payload.annotations.len(),
        request.submission_id,
        request.image_png.len()
    );

    let submission_id = request.submission_id.clone();
    let status = dependencies
        .store
        .save_annotation(request)
        .await
        .map_err(|e| PersistError::Save(format!("{e:#}")))?;

    log::debug!("Submission {submission_id} is now {status}");
    Ok(status)
}

/// Asks the report generator for a fresh report.
pub async fn perform_report(
    submission_id: &str,
    dependencies: Arc<PersistenceDependencies>,
) -> Result<ReportReference, PersistError> {
    log::info!("Generating report for submission {submission_id}");

    let reference = dependencies
        .reports
        .generate_report(submission_id)
        .await
        .map_err(|e| PersistError::Report(format!("{e:#}")))?;

    log::debug!("Report for {submission_id} available at {}", reference.url);
    Ok(reference)
}
