use shared::AnalysisRecord;
use std::cell::RefCell;

use crate::error::ClientError;
use crate::storage::{KeyValueStore, LocalHistoryCache};
use crate::transport::{AnalysisBackend, Confirm};

pub const DELETE_PROMPT: &str = "¿Eliminar análisis?";

/// Where a freshly produced record ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Saved by the backend, which assigned the id.
    Remote,
    /// Backend save failed; the id was generated on the client.
    Local,
}

/// In-memory history, most recent first. Every mutation bumps `generation`.
#[derive(Debug, Clone)]
pub struct History {
    records: Vec<AnalysisRecord>,
    capacity: usize,
    displayed: Option<AnalysisRecord>,
    generation: u64,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity,
            displayed: None,
            generation: 0,
        }
    }

    pub fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    pub fn displayed(&self) -> Option<&AnalysisRecord> {
        self.displayed.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// Order is taken as given; timestamps come from more than one clock.
    fn replace(&mut self, mut records: Vec<AnalysisRecord>) {
        records.truncate(self.capacity);
        self.records = records;
        self.generation += 1;
    }

    fn prepend(&mut self, record: AnalysisRecord) {
        self.records.retain(|r| r.id != record.id);
        self.records.insert(0, record);
        self.records.truncate(self.capacity);
        self.generation += 1;
    }

    /// Returns whether the removed record was on display.
    fn remove(&mut self, id: &str) -> bool {
        self.records.retain(|r| r.id != id);
        self.generation += 1;
        let was_displayed = self.displayed.as_ref().is_some_and(|d| d.id == id);
        if was_displayed {
            self.displayed = None;
        }
        was_displayed
    }

    fn show(&mut self, record: AnalysisRecord) {
        self.displayed = Some(record);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Cancelled,
    Removed {
        cleared_display: bool,
        /// Remote failure; the local removal is kept regardless.
        remote_error: Option<ClientError>,
    },
}

/// Keeps the history list in step with the backend (authoritative) and the
/// local cache (fallback). State is only touched between awaits, never
/// across one.
pub struct HistoryReconciler<B, S> {
    backend: B,
    cache: LocalHistoryCache<S>,
    state: RefCell<History>,
}

impl<B: AnalysisBackend, S: KeyValueStore> HistoryReconciler<B, S> {
    pub fn new(backend: B, cache: LocalHistoryCache<S>) -> Self {
        let capacity = cache.capacity();
        Self {
            backend,
            cache,
            state: RefCell::new(History::new(capacity)),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn records(&self) -> Vec<AnalysisRecord> {
        self.state.borrow().records().to_vec()
    }

    pub fn displayed(&self) -> Option<AnalysisRecord> {
        self.state.borrow().displayed().cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.borrow().contains(id)
    }

    /// Remote history when reachable (it also replaces the local cache),
    /// otherwise whatever the local cache holds. A remote list that arrives
    /// after the history was changed locally is not applied.
    pub async fn load(&self) -> Vec<AnalysisRecord> {
        let started_at = self.state.borrow().generation();

        match self.backend.fetch_all().await {
            Ok(remote) => {
                let mut state = self.state.borrow_mut();
                if state.generation() != started_at {
                    log::info!(
                        "History changed during remote fetch (generation {} -> {}); keeping local state",
                        started_at,
                        state.generation()
                    );
                    return state.records().to_vec();
                }
                state.replace(remote);
                if let Err(e) = self.cache.store(state.records()) {
                    log::warn!("Failed to refresh history cache: {}", e);
                }
                log::debug!("Loaded {} analyses from backend", state.records().len());
                state.records().to_vec()
            }
            Err(e) => {
                log::warn!("Remote history unavailable, using local cache: {}", e);
                let cached = self.cache.load().unwrap_or_default();
                let mut state = self.state.borrow_mut();
                if state.generation() != started_at {
                    return state.records().to_vec();
                }
                state.replace(cached);
                state.records().to_vec()
            }
        }
    }

    /// Prepends `record`. Locally-originated records are also written to
    /// the cache.
    pub fn upsert_newest(&self, record: AnalysisRecord, origin: Origin) {
        let mut state = self.state.borrow_mut();
        state.prepend(record);
        if origin == Origin::Local {
            if let Err(e) = self.cache.store(state.records()) {
                log::error!("Failed to write history cache: {}", e);
            }
        }
    }

    pub fn show(&self, record: AnalysisRecord) {
        self.state.borrow_mut().show(record);
    }

    pub fn clear_display(&self) {
        self.state.borrow_mut().displayed = None;
    }

    /// Asks first. On confirmation the remote delete is attempted and the
    /// record is then removed locally whatever the remote outcome.
    pub async fn delete(&self, id: &str, prompt: &impl Confirm) -> DeleteOutcome {
        if !prompt.confirm(DELETE_PROMPT) {
            return DeleteOutcome::Cancelled;
        }

        let remote_error = match self.backend.delete(id).await {
            Ok(()) => None,
            Err(e) => {
                log::warn!("Remote delete of {} failed: {}", id, e);
                Some(ClientError::persistence("delete the analysis", &e))
            }
        };

        let mut state = self.state.borrow_mut();
        let cleared_display = state.remove(id);
        if let Err(e) = self.cache.store(state.records()) {
            log::error!("Failed to write history cache: {}", e);
        }

        DeleteOutcome::Removed {
            cleared_display,
            remote_error,
        }
    }

    /// Fetches one record and puts it on display. On failure the current
    /// display is left as it was.
    pub async fn select(&self, id: &str) -> Result<AnalysisRecord, ClientError> {
        let record = self
            .backend
            .fetch_one(id)
            .await
            .map_err(|e| ClientError::persistence("load the analysis", &e))?;
        self.state.borrow_mut().show(record.clone());
        Ok(record)
    }
}
