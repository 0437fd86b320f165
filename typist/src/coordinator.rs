//! Background typo-correction search
//!
//! One dedicated worker thread owns the background store connection and runs
//! at most one search at a time, in request order. Every context change that
//! alters the search key cancels the previous search (token + connection
//! interrupt) and replaces it. The current search is the only place a result
//! can become visible, and it is replaced under the same lock the worker
//! publishes under, so a superseded key's result never surfaces.
//!
//! The worker is a plain named thread rather than a runtime's blocking pool:
//! searches must run strictly one after another on a connection no other task
//! may touch, and the host embeds no async runtime.
//!
//! Lock order: coordinator state, then a search's slot.

use crate::correction::{Cancelled, TypoCorrector};
use crate::database::DictionaryConnection;
use crate::interface::TypistError;
use crate::models::Candidate;
use parking_lot::{Condvar, Mutex};
use rusqlite::InterruptHandle;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// What a caller learns about the search for a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The search ran to the end; the list may be empty
    Completed(Vec<Candidate>),
    /// The search was aborted before it finished
    Cancelled,
    /// No search for this key is current
    NotRequested,
}

#[derive(Debug)]
enum SlotState {
    InProgress,
    Completed(Vec<Candidate>),
    Cancelled,
}

/// A search for one key, shared by the coordinator and the worker
struct PendingSearch {
    key: String,
    token: CancellationToken,
    slot: Mutex<SlotState>,
    settled: Condvar,
}

impl PendingSearch {
    fn new(key: String, state: SlotState) -> Self {
        Self {
            key,
            token: CancellationToken::new(),
            slot: Mutex::new(state),
            settled: Condvar::new(),
        }
    }

    /// First settlement wins; later ones are ignored
    fn settle(&self, state: SlotState) {
        let mut slot = self.slot.lock();
        if matches!(*slot, SlotState::InProgress) {
            *slot = state;
            self.settled.notify_all();
        }
    }

    fn cancel(&self) {
        self.token.cancel();
        self.settle(SlotState::Cancelled);
    }

    fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    fn completed(&self) -> Option<Vec<Candidate>> {
        match &*self.slot.lock() {
            SlotState::Completed(candidates) => Some(candidates.clone()),
            _ => None,
        }
    }

    /// Block until the search completes or is cancelled
    fn wait(&self) -> SearchOutcome {
        let mut slot = self.slot.lock();
        while matches!(*slot, SlotState::InProgress) {
            self.settled.wait(&mut slot);
        }
        match &*slot {
            SlotState::Completed(candidates) => SearchOutcome::Completed(candidates.clone()),
            _ => SearchOutcome::Cancelled,
        }
    }
}

#[derive(Default)]
struct CoordinatorState {
    current_key: Option<String>,
    current: Option<Arc<PendingSearch>>,
}

impl CoordinatorState {
    fn search_for(&self, key: &str) -> Option<Arc<PendingSearch>> {
        match (&self.current_key, &self.current) {
            (Some(current_key), Some(search)) if current_key.as_str() == key => Some(Arc::clone(search)),
            _ => None,
        }
    }
}

/// Schedules correction searches on the background worker.
pub struct SearchCoordinator {
    state: Arc<Mutex<CoordinatorState>>,
    tasks: Option<mpsc::UnboundedSender<Arc<PendingSearch>>>,
    interrupt: InterruptHandle,
    worker: Option<JoinHandle<()>>,
}

impl SearchCoordinator {
    /// Start the worker thread. `conn` becomes the worker's own connection.
    pub fn start(
        conn: DictionaryConnection,
        corrector: Arc<dyn TypoCorrector>,
        max_distance: u32,
    ) -> Result<Self, TypistError> {
        let interrupt = conn.interrupt_handle();
        let state = Arc::new(Mutex::new(CoordinatorState::default()));
        let (tx, rx) = mpsc::unbounded_channel();

        let worker_state = Arc::clone(&state);
        let worker = std::thread::Builder::new()
            .name("typo-correction".to_string())
            .spawn(move || run_worker(conn, corrector, max_distance, rx, worker_state))
            .map_err(|e| TypistError::Internal(format!("Failed to start correction worker: {}", e)))?;

        Ok(Self {
            state,
            tasks: Some(tx),
            interrupt,
            worker: Some(worker),
        })
    }

    /// Make `key` the current search key.
    ///
    /// An unchanged key keeps its live search (or result). A new key cancels
    /// the previous search and queues a fresh one; the empty key completes
    /// immediately with no candidates.
    pub fn request(&self, key: &str) {
        let mut state = self.state.lock();
        if let Some(search) = state.search_for(key) {
            if search.is_live() {
                return;
            }
        }

        if let Some(previous) = state.current.take() {
            if previous.is_live() {
                previous.cancel();
                self.interrupt.interrupt();
            }
        }

        state.current_key = Some(key.to_string());
        if key.is_empty() {
            state.current = Some(Arc::new(PendingSearch::new(
                String::new(),
                SlotState::Completed(Vec::new()),
            )));
            return;
        }

        let search = Arc::new(PendingSearch::new(key.to_string(), SlotState::InProgress));
        state.current = Some(Arc::clone(&search));
        drop(state);

        let queued = self.tasks.as_ref().map(|tx| tx.send(Arc::clone(&search)).is_ok());
        if queued != Some(true) {
            tracing::warn!(key, "correction worker is gone; search dropped");
            search.cancel();
        }
    }

    /// The finished result for `key`, without waiting. `None` while the search
    /// runs, after it was cancelled, or when `key` is not current.
    pub fn peek(&self, key: &str) -> Option<Vec<Candidate>> {
        let search = self.state.lock().search_for(key)?;
        search.completed()
    }

    /// Wait for the search for `key` to finish.
    pub fn await_result(&self, key: &str) -> SearchOutcome {
        // Release the state lock before blocking so the worker can publish
        let search = self.state.lock().search_for(key);
        match search {
            Some(search) => search.wait(),
            None => SearchOutcome::NotRequested,
        }
    }

    /// Abort the current search. The next request for the same key starts over.
    pub fn cancel(&self) {
        let state = self.state.lock();
        if let Some(search) = &state.current {
            if search.is_live() {
                search.cancel();
                self.interrupt.interrupt();
            }
        }
    }

    pub fn current_key(&self) -> Option<String> {
        self.state.lock().current_key.clone()
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.cancel();
        // Closing the queue ends the worker loop once it drains
        self.tasks.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("correction worker panicked");
            }
        }
    }
}

fn run_worker(
    conn: DictionaryConnection,
    corrector: Arc<dyn TypoCorrector>,
    max_distance: u32,
    mut tasks: mpsc::UnboundedReceiver<Arc<PendingSearch>>,
    state: Arc<Mutex<CoordinatorState>>,
) {
    while let Some(search) = tasks.blocking_recv() {
        // Superseded while queued
        if !search.is_live() {
            continue;
        }

        let start = Instant::now();
        let result = corrector.candidates(&conn, &search.key, max_distance, &search.token);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(candidates) => {
                tracing::debug!(
                    "'{}' -> {} candidates in {:.3}ms",
                    search.key,
                    candidates.len(),
                    elapsed_ms
                );
                publish(&state, &search, candidates);
            }
            Err(Cancelled) => {
                tracing::debug!("'{}' -> cancelled after {:.3}ms", search.key, elapsed_ms);
                search.settle(SlotState::Cancelled);
            }
        }
    }
    tracing::debug!("correction worker stopped");
}

/// Settle `search` with its candidates if it is still the current one
fn publish(state: &Mutex<CoordinatorState>, search: &Arc<PendingSearch>, candidates: Vec<Candidate>) {
    let state = state.lock();
    let is_current = state
        .current
        .as_ref()
        .is_some_and(|current| Arc::ptr_eq(current, search));

    if is_current && search.is_live() {
        search.settle(SlotState::Completed(candidates));
    } else {
        search.settle(SlotState::Cancelled);
    }
}
