use chrono::{DateTime, Utc};
use shared::{AnalysisRecord, Mode, NormalizeError, SaveAnalysisRequest, ServiceStatus};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::ClientConfig;
use crate::error::{ClientError, GENERIC_ANALYSIS_FAILURE};
use crate::history::{HistoryReconciler, Origin};
use crate::request::RequestTracker;
use crate::session::Session;
use crate::storage::KeyValueStore;
use crate::transport::{AnalysisBackend, AnalysisInput, ClassifierApi};
use crate::validator::FileMeta;

pub const EMPTY_TEXT_MESSAGE: &str = "Please write some text first.";

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Saved by the backend; the server record is canonical.
    Saved(AnalysisRecord),
    /// Backend save failed; the record lives in the local cache only.
    SavedLocally {
        record: AnalysisRecord,
        error: ClientError,
    },
    /// A newer analysis was started (or the view went away) meanwhile; the
    /// display was left alone.
    Superseded,
}

impl AnalysisOutcome {
    pub fn record(&self) -> Option<&AnalysisRecord> {
        match self {
            AnalysisOutcome::Saved(record) | AnalysisOutcome::SavedLocally { record, .. } => {
                Some(record)
            }
            AnalysisOutcome::Superseded => None,
        }
    }
}

fn normalize_failure(err: NormalizeError) -> ClientError {
    match err.server_detail() {
        Some(detail) => ClientError::AnalysisFailed(detail.to_string()),
        None => {
            log::warn!("Discarding classification response: {}", err);
            ClientError::AnalysisFailed(GENERIC_ANALYSIS_FAILURE.to_string())
        }
    }
}

/// Object URLs only mean something inside the current page.
fn shareable_image_ref(image_ref: &Option<String>) -> Option<String> {
    image_ref.clone().filter(|r| !r.starts_with("blob:"))
}

pub struct AnalysisOrchestrator<C, B, S> {
    classifier: C,
    history: Rc<HistoryReconciler<B, S>>,
    config: Rc<ClientConfig>,
    tracker: RequestTracker,
    statuses: RefCell<HashMap<Mode, ServiceStatus>>,
}

impl<C, B, S> AnalysisOrchestrator<C, B, S>
where
    C: ClassifierApi,
    B: AnalysisBackend,
    S: KeyValueStore,
{
    pub fn new(
        classifier: C,
        history: Rc<HistoryReconciler<B, S>>,
        config: Rc<ClientConfig>,
    ) -> Self {
        Self {
            classifier,
            history,
            config,
            tracker: RequestTracker::new(),
            statuses: RefCell::new(HashMap::new()),
        }
    }

    pub fn history(&self) -> &Rc<HistoryReconciler<B, S>> {
        &self.history
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn status(&self, mode: Mode) -> ServiceStatus {
        self.statuses
            .borrow()
            .get(&mode)
            .copied()
            .unwrap_or_default()
    }

    fn set_status(&self, mode: Mode, status: ServiceStatus) {
        self.statuses.borrow_mut().insert(mode, status);
    }

    pub async fn check_health(&self, mode: Mode) -> ServiceStatus {
        if !self.config.service(mode).health_check {
            self.set_status(mode, ServiceStatus::Available);
            return ServiceStatus::Available;
        }

        self.set_status(mode, ServiceStatus::Checking);
        let status = match self.classifier.health(mode).await {
            Ok(health) if health.model_loaded => ServiceStatus::Available,
            Ok(_) => ServiceStatus::Loading,
            Err(e) => {
                log::warn!("Health check for {} failed: {}", mode, e);
                ServiceStatus::Unavailable
            }
        };
        log::info!("{} service status: {}", mode, status);
        self.set_status(mode, status);
        status
    }

    pub fn validate_upload(&self, file: &FileMeta) -> Result<(), ClientError> {
        self.config.upload.validate(file)
    }

    /// Classify, then save remotely or fall back to the local cache, then
    /// display. Nothing is retried.
    pub async fn analyze(
        &self,
        mode: Mode,
        input: AnalysisInput<C::Upload>,
        image_ref: Option<String>,
        session: &Session,
    ) -> Result<AnalysisOutcome, ClientError> {
        let input = match input {
            AnalysisInput::Text(text) if text.trim().is_empty() => {
                return Err(ClientError::AnalysisFailed(EMPTY_TEXT_MESSAGE.into()));
            }
            AnalysisInput::Text(text) => AnalysisInput::Text(text.trim().to_string()),
            file => file,
        };

        let status = self.status(mode);
        if status != ServiceStatus::Available {
            return Err(ClientError::ServiceUnavailable { mode, status });
        }

        let token = self.tracker.begin();
        let response = self
            .classifier
            .classify(mode, &input)
            .await
            .map_err(|e| {
                log::error!("Classification request failed: {}", e);
                ClientError::analysis(&e)
            })?;

        if !self.tracker.is_current(token) {
            log::debug!("Discarding superseded {} analysis", mode);
            return Ok(AnalysisOutcome::Superseded);
        }

        let mut analysis = response
            .normalize(self.config.scale(mode))
            .map_err(normalize_failure)?;
        if analysis.text.is_empty() {
            if let AnalysisInput::Text(text) = &input {
                analysis.text = text.clone();
            }
        }

        let request = SaveAnalysisRequest::new(
            &analysis,
            shareable_image_ref(&image_ref),
            mode,
            session.user_id().map(str::to_string),
        );

        let outcome = match self.history.backend().save(&request).await {
            Ok(record) => {
                log::info!("Analysis {} saved ({})", record.id, record.dominant_emotion);
                self.history.upsert_newest(record.clone(), Origin::Remote);
                AnalysisOutcome::Saved(record)
            }
            Err(e) => {
                log::warn!("Backend save failed, keeping analysis locally: {}", e);
                let now = Utc::now();
                let record = AnalysisRecord::from_normalized(
                    self.local_id(now),
                    now,
                    shareable_image_ref(&image_ref),
                    mode,
                    analysis,
                );
                self.history.upsert_newest(record.clone(), Origin::Local);
                AnalysisOutcome::SavedLocally {
                    record,
                    error: ClientError::persistence("save the analysis", &e),
                }
            }
        };

        if !self.tracker.is_current(token) {
            return Ok(AnalysisOutcome::Superseded);
        }
        if let Some(record) = outcome.record() {
            // The page-local preview is still alive for the current view.
            let mut shown = record.clone();
            if shown.image_url.is_none() {
                shown.image_url = image_ref;
            }
            self.history.show(shown);
        }
        Ok(outcome)
    }

    /// Millisecond timestamp, bumped past any id already in the history.
    fn local_id(&self, now: DateTime<Utc>) -> String {
        let mut millis = now.timestamp_millis();
        while self.history.contains(&millis.to_string()) {
            millis += 1;
        }
        millis.to_string()
    }

    /// Responses to requests already in flight will be discarded.
    pub fn cancel_pending(&self) {
        self.tracker.invalidate();
    }
}
