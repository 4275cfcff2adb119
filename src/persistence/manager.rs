use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, mpsc};

use crate::persistence::{
    dependencies::PersistenceDependencies,
    pipeline::{perform_report, perform_save},
    types::{JobStatus, PersistError, PersistOutcome, PersistStatus, SaveRequest},
};

#[derive(Debug)]
enum PersistRequest {
    Save { request: SaveRequest, revision: u64 },
    Report { submission_id: String },
}

/// Shared state for running saves and report generation off the UI thread.
///
/// This structure bridges async collaborators with a synchronous event loop:
/// requests return immediately and finished work is collected with
/// [`PersistenceManager::try_take_outcome`].
#[derive(Clone)]
pub struct PersistenceManager {
    /// Channel for sending requests to the background task.
    request_tx: mpsc::UnboundedSender<PersistRequest>,
    /// Shared status of both jobs.
    status: Arc<Mutex<PersistStatus>>,
    /// Finished requests not yet collected, oldest first.
    outcomes: Arc<Mutex<VecDeque<PersistOutcome>>>,
    save_in_flight: Arc<AtomicBool>,
    report_in_flight: Arc<AtomicBool>,
}

impl PersistenceManager {
    /// Create a manager backed by the local filesystem store.
    ///
    /// This spawns a background task that performs the collaborator calls.
    pub fn new(runtime_handle: &tokio::runtime::Handle, base_dir: std::path::PathBuf) -> Self {
        Self::with_dependencies(runtime_handle, PersistenceDependencies::local(base_dir))
    }

    /// Create a manager with custom collaborators (useful for testing).
    pub fn with_dependencies(
        runtime_handle: &tokio::runtime::Handle,
        dependencies: PersistenceDependencies,
    ) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<PersistRequest>();
        let status = Arc::new(Mutex::new(PersistStatus::default()));
        let outcomes = Arc::new(Mutex::new(VecDeque::new()));
        let save_in_flight = Arc::new(AtomicBool::new(false));
        let report_in_flight = Arc::new(AtomicBool::new(false));
        let dependencies = Arc::new(dependencies);

        let status_clone = status.clone();
        let outcomes_clone = outcomes.clone();
        let save_flag = save_in_flight.clone();
        let report_flag = report_in_flight.clone();

        // Spawn background task to handle persistence requests
        runtime_handle.spawn(async move {
            while let Some(request) = request_rx.recv().await {
                log::debug!("Processing persistence request: {:?}", request);

                match request {
                    PersistRequest::Save { request, revision } => {
                        status_clone.lock().await.save = JobStatus::InFlight;
                        let submission_id = request.submission_id.clone();
                        let (outcome, job) =
                            match perform_save(request, dependencies.clone()).await {
                                Ok(status) => {
                                    log::info!(
                                        "Saved submission {submission_id} at revision {revision}"
                                    );
                                    (
                                        PersistOutcome::Saved {
                                            submission_id,
                                            revision,
                                            status,
                                        },
                                        JobStatus::Succeeded,
                                    )
                                }
                                Err(e) => {
                                    let message = e.to_string();
                                    log::error!("Save failed: {}", message);
                                    (
                                        PersistOutcome::SaveFailed {
                                            submission_id,
                                            revision,
                                            message: message.clone(),
                                        },
                                        JobStatus::Failed(message),
                                    )
                                }
                            };
                        // Ready for a retry before the outcome becomes visible.
                        status_clone.lock().await.save = job;
                        save_flag.store(false, Ordering::Release);
                        outcomes_clone.lock().await.push_back(outcome);
                    }
                    PersistRequest::Report { submission_id } => {
                        status_clone.lock().await.report = JobStatus::InFlight;
                        let (outcome, job) =
                            match perform_report(&submission_id, dependencies.clone()).await {
                                Ok(reference) => {
                                    log::info!("Report ready: {}", reference.url);
                                    (
                                        PersistOutcome::Reported {
                                            submission_id,
                                            reference,
                                        },
                                        JobStatus::Succeeded,
                                    )
                                }
                                Err(e) => {
                                    let message = e.to_string();
                                    log::error!("Report generation failed: {}", message);
                                    (
                                        PersistOutcome::ReportFailed {
                                            submission_id,
                                            message: message.clone(),
                                        },
                                        JobStatus::Failed(message),
                                    )
                                }
                            };
                        status_clone.lock().await.report = job;
                        report_flag.store(false, Ordering::Release);
                        outcomes_clone.lock().await.push_back(outcome);
                    }
                }
            }
        });

        Self {
            request_tx,
            status,
            outcomes,
            save_in_flight,
            report_in_flight,
        }
    }

    /// Queue a save of `request`, a snapshot taken at collection `revision`.
    ///
    /// Non-blocking. Fails with [`PersistError::SaveInFlight`] while an earlier
    /// save has not finished.
    pub fn request_save(&self, request: SaveRequest, revision: u64) -> Result<(), PersistError> {
        if self
            .save_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PersistError::SaveInFlight);
        }

        self.request_tx
            .send(PersistRequest::Save { request, revision })
            .map_err(|_| {
                self.save_in_flight.store(false, Ordering::Release);
                PersistError::ManagerStopped
            })
    }

    /// Queue report generation for `submission_id`.
    ///
    /// Non-blocking. Fails with [`PersistError::ReportInFlight`] while an
    /// earlier report has not finished.
    pub fn request_report(&self, submission_id: &str) -> Result<(), PersistError> {
        if self
            .report_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PersistError::ReportInFlight);
        }

        self.request_tx
            .send(PersistRequest::Report {
                submission_id: submission_id.to_string(),
            })
            .map_err(|_| {
                self.report_in_flight.store(false, Ordering::Release);
                PersistError::ManagerStopped
            })
    }

    pub fn is_saving(&self) -> bool {
        self.save_in_flight.load(Ordering::Acquire)
    }

    pub fn is_reporting(&self) -> bool {
        self.report_in_flight.load(Ordering::Acquire)
    }

    /// Get the current status of both jobs.
    ///
    /// A queued request reads as in flight even before the background task
    /// has picked it up.
    pub async fn status(&self) -> PersistStatus {
        let mut status = self.status.lock().await.clone();
        if self.is_saving() {
            status.save = JobStatus::InFlight;
        }
        if self.is_reporting() {
            status.report = JobStatus::InFlight;
        }
        status
    }

    /// Wait for the lock and take the oldest finished outcome.
    pub async fn take_outcome(&self) -> Option<PersistOutcome> {
        self.outcomes.lock().await.pop_front()
    }

    /// Try to take the oldest finished outcome without waiting (non-blocking).
    pub fn try_take_outcome(&self) -> Option<PersistOutcome> {
        self.outcomes.try_lock().ok().and_then(|mut q| q.pop_front())
    }
}

#[cfg(test)]
impl PersistenceManager {
    pub(crate) fn with_closed_channel_for_test() -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<PersistRequest>();
        drop(rx);
        Self {
            request_tx: tx,
            status: Arc::new(Mutex::new(PersistStatus::default())),
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            save_in_flight: Arc::new(AtomicBool::new(false)),
            report_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }
}
