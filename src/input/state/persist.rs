use crate::persistence::{
    PersistError, PersistOutcome, PersistedAnnotationPayload, PersistenceManager, SaveRequest,
};
use log::{debug, info, warn};

use super::AnnotationCanvas;

/// Whether a save should be skipped when nothing changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Skip the save when the canvas is clean
    IfDirty,
    /// Save even when nothing changed
    Force,
}

/// What [`AnnotationCanvas::save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDispatch {
    /// Nothing to save; no collaborator was contacted
    Skipped,
    /// Snapshot handed to the manager
    Dispatched { revision: u64 },
}

impl AnnotationCanvas {
    /// Current committed state as a portable payload.
    ///
    /// The returned value is an owned copy; later drawing does not affect it.
    pub fn payload(&self) -> PersistedAnnotationPayload {
        PersistedAnnotationPayload {
            annotations: self.collection.snapshot().to_vec(),
            recommendations: self.recommendations.clone(),
            extra: self.payload_extra.clone(),
        }
    }

    /// Snapshots payload and flattened image and hands them to `manager`.
    ///
    /// With [`SaveMode::IfDirty`] a clean canvas, or one whose current revision
    /// is already being saved, is skipped without contacting the store.
    pub fn save(
        &mut self,
        manager: &PersistenceManager,
        mode: SaveMode,
    ) -> Result<SaveDispatch, PersistError> {
        let revision = self.collection.revision();
        if mode == SaveMode::IfDirty {
            if !self.collection.is_dirty() {
                debug!("Canvas clean; skipping save");
                return Ok(SaveDispatch::Skipped);
            }
            if self.pending_save == Some(revision) {
                debug!("Revision {revision} already being saved; skipping");
                return Ok(SaveDispatch::Skipped);
            }
        }

        let submission_id = self
            .submission_id
            .clone()
            .ok_or_else(|| PersistError::Snapshot("no submission loaded".to_string()))?;
        let image_png = self
            .export_flattened()
            .map_err(|e| PersistError::Snapshot(e.to_string()))?;

        let request = SaveRequest {
            submission_id,
            payload: self.payload(),
            image_png,
        };
        manager.request_save(request, revision)?;

        self.pending_save = Some(revision);
        info!("Dispatched save at revision {revision}");
        Ok(SaveDispatch::Dispatched { revision })
    }

    /// Asks `manager` to generate a report for the current submission.
    ///
    /// Unsaved changes do not block a report.
    pub fn request_report(&self, manager: &PersistenceManager) -> Result<(), PersistError> {
        let submission_id = self
            .submission_id
            .as_deref()
            .ok_or_else(|| PersistError::Snapshot("no submission loaded".to_string()))?;
        manager.request_report(submission_id)
    }

    /// Applies a finished save or report to this canvas.
    ///
    /// A successful save marks its snapshot revision as saved, so drawing done
    /// while the save was in flight keeps the canvas dirty. Failures leave the
    /// annotations and dirty flag untouched. Outcomes for another submission
    /// are ignored.
    pub fn apply_outcome(&mut self, outcome: &PersistOutcome) {
        match outcome {
            PersistOutcome::Saved {
                submission_id,
                revision,
                status,
            } => {
                if !self.is_current_submission(submission_id) {
                    return;
                }
                self.clear_pending(*revision);
                self.collection.mark_saved(*revision);
                info!("Submission {submission_id} saved ({status}) at revision {revision}");
            }
            PersistOutcome::SaveFailed {
                submission_id,
                revision,
                message,
            } => {
                if !self.is_current_submission(submission_id) {
                    return;
                }
                self.clear_pending(*revision);
                warn!("Save of {submission_id} failed, changes kept: {message}");
            }
            PersistOutcome::Reported {
                submission_id,
                reference,
            } => {
                info!(
                    "Report for {submission_id} ({}): {}",
                    reference.status, reference.url
                );
            }
            PersistOutcome::ReportFailed {
                submission_id,
                message,
            } => {
                warn!("Report for {submission_id} failed: {message}");
            }
        }
    }

    fn is_current_submission(&self, submission_id: &str) -> bool {
        let current = self.submission_id.as_deref() == Some(submission_id);
        if !current {
            debug!("Ignoring outcome for stale submission {submission_id}");
        }
        current
    }

    fn clear_pending(&mut self, revision: u64) {
        if self.pending_save == Some(revision) {
            self.pending_save = None;
        }
    }
}
