//! Consumer-side scan state.
//!
//! A [`ScanSession`] folds [`ScanEvent`]s into the running duplicate index
//! and progress counters. It is owned by whoever drives the UI or CLI and is
//! never shared with the scan worker; all mutation happens through
//! [`ScanSession::apply`] on the consumer's thread.

use crate::duplicates::{GroupIndex, GroupReport};
use crate::engine::{ScanEvent, ScanOutcome, ScanProgress};
use crate::scanner::{HashError, ScanError};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No events applied yet.
    #[default]
    Idle,
    /// `Started` seen, waiting for `Completed`.
    Running,
    /// Every discovered file was processed.
    Completed,
    /// The scan ended early.
    Cancelled,
}

impl SessionState {
    /// Whether the session has seen its terminal event.
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Accumulated results of one scan.
#[derive(Debug, Default)]
pub struct ScanSession {
    state: SessionState,
    index: GroupIndex,
    progress: ScanProgress,
    failures: Vec<HashError>,
    outcome: Option<ScanOutcome>,
}

impl ScanSession {
    /// Create an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the session.
    ///
    /// Events arriving after `Completed` are ignored.
    pub fn apply(&mut self, event: &ScanEvent) {
        if self.state.is_finished() {
            log::trace!("Ignoring event after completion: {:?}", event);
            return;
        }

        match event {
            ScanEvent::Started { total } => {
                self.state = SessionState::Running;
                self.progress = ScanProgress::new(0, *total);
            }
            ScanEvent::File(result) => {
                self.state = SessionState::Running;
                self.index.record(result);
                if let Err(e) = &result.outcome {
                    self.failures.push(e.clone());
                }
            }
            ScanEvent::Progress(progress) => {
                // Never move backwards.
                if progress.processed >= self.progress.processed {
                    self.progress = *progress;
                }
            }
            ScanEvent::Completed(outcome) => {
                self.progress = ScanProgress::new(outcome.processed, outcome.total);
                self.state = if outcome.cancelled {
                    SessionState::Cancelled
                } else {
                    SessionState::Completed
                };
                self.outcome = Some(outcome.clone());
            }
        }
    }

    /// Duplicate groups found so far.
    ///
    /// Safe to call mid-scan; the report reflects every `File` event applied.
    #[must_use]
    pub fn current_groups(&self) -> GroupReport {
        self.index.finalize()
    }

    /// Latest progress.
    #[must_use]
    pub fn progress(&self) -> ScanProgress {
        self.progress
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the terminal event has been applied.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Files that could not be hashed.
    #[must_use]
    pub fn failures(&self) -> &[HashError] {
        &self.failures
    }

    /// Entries skipped during the walk. Empty until completion.
    #[must_use]
    pub fn walk_skips(&self) -> &[ScanError] {
        self.outcome
            .as_ref()
            .map_or(&[][..], |o| o.walk_skips.as_slice())
    }

    /// Final outcome, once completed.
    #[must_use]
    pub fn outcome(&self) -> Option<&ScanOutcome> {
        self.outcome.as_ref()
    }

    /// The underlying index.
    #[must_use]
    pub fn index(&self) -> &GroupIndex {
        &self.index
    }

    /// Discard everything and return to `Idle`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
