//! Background scan engine.
//!
//! # Overview
//!
//! [`ScanEngine::begin_scan`] freezes a [`RootSet`], spawns one worker thread
//! and returns a [`ScanHandle`] immediately. The worker walks every root to
//! build the file list, then hashes each file and pushes [`ScanEvent`]s over
//! a channel:
//!
//! 1. `Started { total }` once the walk is done
//! 2. for each file, `File(result)` followed by `Progress { processed, total }`
//! 3. exactly one `Completed(outcome)`, after every other event
//!
//! An empty walk goes straight from `Started { total: 0 }` to `Completed`.
//! A scan cancelled during the walk sends only `Completed`.
//!
//! The worker never touches consumer state. The consumer folds events into a
//! [`ScanSession`](crate::session::ScanSession) at its own pace.
//!
//! # Cancellation
//!
//! Cancellation is cooperative: the [`CancelToken`] is checked between
//! files, and a cancelled scan still ends with a single `Completed` event
//! whose `cancelled` flag is set. Dropping the handle also stops the worker.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::engine::{begin_scan, ScanEvent};
//! use dupescan::scanner::RootSet;
//! use dupescan::session::ScanSession;
//!
//! let roots: RootSet = ["/home/user/Music"].into_iter().collect();
//! let handle = begin_scan(&roots).unwrap();
//!
//! let mut session = ScanSession::new();
//! for event in handle.events() {
//!     if let ScanEvent::Progress(p) = &event {
//!         println!("{}%", p.percent());
//!     }
//!     session.apply(&event);
//! }
//!
//! let report = session.current_groups();
//! println!("{} duplicate groups", report.groups.len());
//! ```

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use rayon::prelude::*;
use serde::Serialize;

use crate::scanner::{
    FileRecord, FrozenRoots, HashResult, Hasher, RootSet, ScanError, Walker, WalkerConfig,
};
use crate::session::ScanSession;

/// Shared flag requesting that a running scan stop between files.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    parent: Option<Arc<AtomicBool>>,
}

impl CancelToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing flag, e.g. one set by a signal handler.
    #[must_use]
    pub fn from_flag(flag: Arc<AtomicBool>) -> Self {
        Self { flag, parent: None }
    }

    /// A token that observes this one but can be cancelled on its own.
    ///
    /// Cancelling the child leaves `self` untouched.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            parent: Some(Arc::clone(&self.flag)),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested on this token or its parent.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
            || self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.load(Ordering::SeqCst))
    }

    /// The token's own flag.
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Files processed so far out of the total discovered by the walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanProgress {
    /// Files hashed (or failed) so far
    pub processed: usize,
    /// Files discovered by the walk
    pub total: usize,
}

impl ScanProgress {
    /// Create a progress value.
    #[must_use]
    pub fn new(processed: usize, total: usize) -> Self {
        Self { processed, total }
    }

    /// Completed fraction in `0.0..=1.0`. An empty scan counts as complete.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }

    /// Whole percentage, rounded down.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            100
        } else {
            (self.processed * 100 / self.total).min(100) as u8
        }
    }

    /// Whether every discovered file has been processed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// Final accounting for one scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Files processed before completion
    pub processed: usize,
    /// Files discovered by the walk
    pub total: usize,
    /// Files whose content could not be read
    pub hash_failures: usize,
    /// Entries the walker had to skip
    pub walk_skips: Vec<ScanError>,
    /// Whether the scan stopped before processing every file
    pub cancelled: bool,
    /// Wall-clock time from spawn to completion
    pub duration: Duration,
}

/// One message from the scan worker.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// The walk finished; `total` files will be hashed.
    Started {
        /// Number of files discovered
        total: usize,
    },
    /// One file was hashed, or failed to hash.
    File(HashResult),
    /// Running progress, sent after every `File` event.
    Progress(ScanProgress),
    /// Terminal event, sent exactly once.
    Completed(ScanOutcome),
}

impl ScanEvent {
    /// Whether this is the terminal event.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Errors raised before a scan starts.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// The request was rejected, e.g. no roots were selected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The worker thread could not be spawned.
    #[error("Failed to spawn scan worker: {0}")]
    Spawn(#[source] io::Error),

    /// The worker thread panicked.
    #[error("Scan worker panicked")]
    WorkerPanicked,
}

/// Configuration for the scan engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Walker filters applied to every root.
    pub walker_config: WalkerConfig,
    /// Number of hashing threads. `1` hashes on the worker thread itself.
    pub hash_threads: usize,
    /// Optional externally owned cancellation token.
    pub cancel_token: Option<CancelToken>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            walker_config: WalkerConfig::default(),
            hash_threads: 1,
            cancel_token: None,
        }
    }
}

impl EngineConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the number of hashing threads.
    #[must_use]
    pub fn with_hash_threads(mut self, threads: usize) -> Self {
        self.hash_threads = threads.max(1);
        self
    }

    /// Share a cancellation token with every scan.
    ///
    /// Each scan watches `token` through its own child token, so cancelling
    /// or dropping one handle never cancels `token` itself.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel_token = Some(token);
        self
    }
}

/// Starts background scans.
#[derive(Debug, Clone, Default)]
pub struct ScanEngine {
    config: EngineConfig,
    hasher: Hasher,
}

impl ScanEngine {
    /// Create an engine with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            hasher: Hasher::new(),
        }
    }

    /// Create an engine with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start scanning `roots` on a background thread.
    ///
    /// Returns as soon as the worker is spawned. The root set is frozen for
    /// the duration of the scan; later edits to `roots` do not affect it.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `roots` is empty
    /// - `Spawn` if the worker thread cannot be created
    pub fn begin_scan(&self, roots: &RootSet) -> Result<ScanHandle, EngineError> {
        if roots.is_empty() {
            return Err(EngineError::InvalidInput(
                "at least one root directory is required".to_string(),
            ));
        }

        let frozen = roots.freeze();
        // Per-scan token so a finished or dropped scan never cancels the shared one
        let cancel = self
            .config
            .cancel_token
            .as_ref()
            .map_or_else(CancelToken::new, CancelToken::child);
        let (tx, rx) = channel::unbounded();

        let job = ScanJob {
            roots: frozen.clone(),
            walker_config: self.config.walker_config.clone(),
            hasher: self.hasher.clone(),
            hash_threads: self.config.hash_threads.max(1),
            cancel: cancel.clone(),
        };

        log::info!("Starting scan of {} root(s)", frozen.len());

        let worker = thread::Builder::new()
            .name("dupescan-scan".to_string())
            .spawn(move || job.run(tx))
            .map_err(EngineError::Spawn)?;

        Ok(ScanHandle {
            events: rx,
            cancel,
            roots: frozen,
            worker: Some(worker),
        })
    }
}

/// Start a scan with the default engine configuration.
///
/// # Errors
///
/// See [`ScanEngine::begin_scan`].
pub fn begin_scan(roots: &RootSet) -> Result<ScanHandle, EngineError> {
    ScanEngine::with_defaults().begin_scan(roots)
}

/// Consumer side of a running scan.
#[derive(Debug)]
pub struct ScanHandle {
    events: Receiver<ScanEvent>,
    cancel: CancelToken,
    roots: FrozenRoots,
    worker: Option<JoinHandle<()>>,
}

impl ScanHandle {
    /// Blocking iterator over events. Ends after `Completed`.
    pub fn events(&self) -> impl Iterator<Item = ScanEvent> + '_ {
        self.events.iter()
    }

    /// The raw event receiver, for use with `select!`.
    #[must_use]
    pub fn receiver(&self) -> &Receiver<ScanEvent> {
        &self.events
    }

    /// Next event if one is ready, without blocking.
    #[must_use]
    pub fn try_next(&self) -> Option<ScanEvent> {
        self.events.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// Returns `None` on timeout or once the worker is gone.
    #[must_use]
    pub fn next_timeout(&self, timeout: Duration) -> Option<ScanEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Ask the worker to stop after the file it is hashing.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token controlling this scan only.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Roots being scanned.
    #[must_use]
    pub fn roots(&self) -> &FrozenRoots {
        &self.roots
    }

    /// Apply every remaining event to `session`, blocking until completion.
    ///
    /// Returns the outcome, or `None` if the worker died without completing.
    pub fn drain_into(&self, session: &mut ScanSession) -> Option<ScanOutcome> {
        for event in self.events.iter() {
            session.apply(&event);
            if let ScanEvent::Completed(outcome) = event {
                return Some(outcome);
            }
        }
        None
    }

    /// Wait for the worker thread to exit.
    ///
    /// # Errors
    ///
    /// Returns `WorkerPanicked` if the worker panicked.
    pub fn join(mut self) -> Result<(), EngineError> {
        match self.worker.take() {
            Some(worker) => worker.join().map_err(|_| EngineError::WorkerPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        // An abandoned scan stops at the next file.
        if self.worker.is_some() {
            self.cancel.cancel();
        }
    }
}

/// Everything the worker needs, moved onto its thread.
struct ScanJob {
    roots: FrozenRoots,
    walker_config: WalkerConfig,
    hasher: Hasher,
    hash_threads: usize,
    cancel: CancelToken,
}

/// Forwards results to the consumer and keeps the running count.
struct Emitter {
    tx: Sender<ScanEvent>,
    processed: usize,
    total: usize,
    failures: usize,
    connected: bool,
}

impl Emitter {
    fn send(&mut self, event: ScanEvent) {
        if self.connected && self.tx.send(event).is_err() {
            log::debug!("Scan consumer went away");
            self.connected = false;
        }
    }

    /// Deliver one result and its progress update. Returns `false` once the
    /// consumer has hung up.
    fn deliver(&mut self, result: HashResult) -> bool {
        if let Err(e) = &result.outcome {
            log::warn!("Failed to hash {}: {}", result.path.display(), e);
            self.failures += 1;
        }
        self.processed += 1;
        let progress = ScanProgress::new(self.processed, self.total);
        self.send(ScanEvent::File(result));
        self.send(ScanEvent::Progress(progress));
        self.connected
    }
}

impl ScanJob {
    fn run(self, tx: Sender<ScanEvent>) {
        let start = Instant::now();
        let mut outcome = ScanOutcome::default();

        let walker = Walker::new(self.roots.clone(), self.walker_config.clone());
        let mut records = Vec::new();
        for entry in walker.walk() {
            if self.cancel.is_cancelled() {
                log::info!("Scan cancelled while walking");
                outcome.cancelled = true;
                break;
            }
            match entry {
                Ok(record) => records.push(record),
                Err(e) => outcome.walk_skips.push(e),
            }
        }

        let mut emitter = Emitter {
            tx,
            processed: 0,
            total: records.len(),
            failures: 0,
            connected: true,
        };

        if !outcome.cancelled {
            log::info!(
                "Found {} files ({} skipped entries)",
                records.len(),
                outcome.walk_skips.len()
            );
            emitter.send(ScanEvent::Started {
                total: records.len(),
            });

            if !records.is_empty() {
                if self.hash_threads > 1 {
                    self.hash_parallel(records, &mut emitter);
                } else {
                    self.hash_sequential(records, &mut emitter);
                }
            }
        }

        outcome.processed = emitter.processed;
        outcome.total = emitter.total;
        outcome.hash_failures = emitter.failures;
        outcome.cancelled |= emitter.processed < emitter.total;
        outcome.duration = start.elapsed();

        log::info!(
            "Scan {}: {}/{} files processed, {} unreadable, {:.2?}",
            if outcome.cancelled { "cancelled" } else { "complete" },
            outcome.processed,
            outcome.total,
            outcome.hash_failures,
            outcome.duration
        );

        emitter.send(ScanEvent::Completed(outcome));
    }

    fn hash_sequential(&self, records: Vec<FileRecord>, emitter: &mut Emitter) {
        for record in records {
            if self.cancel.is_cancelled() {
                log::debug!("Cancellation requested, stopping before {}", record.path.display());
                break;
            }
            let outcome = self.hasher.full_hash(&record.path);
            if !emitter.deliver(HashResult::new(record.path, outcome)) {
                self.cancel.cancel();
                break;
            }
        }
    }

    /// Hash on a bounded pool. Results funnel back through this thread so
    /// progress stays ordered and `Completed` still comes last.
    fn hash_parallel(&self, records: Vec<FileRecord>, emitter: &mut Emitter) {
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.hash_threads)
            .thread_name(|i| format!("dupescan-hash-{i}"))
            .panic_handler(|_| log::error!("Hashing pool panicked"))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                log::warn!("Failed to create hashing pool, hashing sequentially: {}", e);
                return self.hash_sequential(records, emitter);
            }
        };

        let (result_tx, result_rx) = channel::bounded::<HashResult>(self.hash_threads * 4);
        let hasher = self.hasher.clone();
        let cancel = self.cancel.clone();

        // The channel closes once every sender clone is dropped, i.e. when
        // the batch is done or has unwound.
        pool.spawn(move || {
            records
                .into_par_iter()
                .for_each_with(result_tx, |tx, record| {
                    if cancel.is_cancelled() {
                        return;
                    }
                    let outcome = hasher.full_hash(&record.path);
                    if let Err(e) = tx.send(HashResult::new(record.path, outcome)) {
                        log::debug!("Dropping result for {}: scan stopped", e.0.path.display());
                    }
                });
        });

        for result in result_rx.iter() {
            if !emitter.deliver(result) {
                self.cancel.cancel();
                break;
            }
        }
    }
}
