//! The analysis pipeline.
//!
//! [`Pipeline`] is the state machine guarding the single in-flight call:
//!
//! ```text
//! Idle ──▶ Submitting ──▶ Analyzing ──▶ Complete
//!  ▲                          │            │
//!  └──────── Failed ◀─────────┘            │ reclassify
//!  └───────────────────────────────────────┘
//! ```
//!
//! Every call is tagged with a [`Ticket`]. A completion carrying a ticket
//! that is no longer expected (the workspace was closed or reset while the
//! call was out) is dropped without touching any state.
//!
//! The call itself goes through the [`Analyzer`] trait: [`MockAnalyzer`]
//! answers with a canned record after a short random delay, while
//! [`RemoteAnalyzer`] talks to a real service.

mod mock;
mod remote;

pub use mock::{canned_record, MockAnalyzer};
pub use remote::RemoteAnalyzer;

use crate::ingest::ImageData;
use crate::record::Record;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Errors from the analysis call or the pipeline guard.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Analysis service error: {0}")]
    Remote(#[from] analyst::Error),

    #[error("Malformed analysis response: {0}")]
    Malformed(String),

    #[error("Analysis unavailable: {0}")]
    Unavailable(String),

    #[error("An analysis is already in progress")]
    Busy,
}

/// The external analysis call.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyze `text` and an optional image into a complete record.
    async fn analyze(&self, text: &str, image: Option<&ImageData>) -> Result<Record, AnalysisError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Identifies one analysis call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Analyzing(Ticket),
    Complete,
    /// Passed through on the way back to `Idle`; never rested in.
    Failed,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Submitting => "submitting",
            Phase::Analyzing(_) => "analyzing",
            Phase::Complete => "complete",
            Phase::Failed => "failed",
        }
    }
}

/// What became of a finished call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Completed,
    Failed,
    /// The ticket was no longer expected; nothing changed.
    Stale,
}

#[derive(Debug, Default)]
pub struct Pipeline {
    phase: Phase,
    next_ticket: u64,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the submit affordance is enabled.
    pub fn submit_enabled(&self) -> bool {
        !self.in_flight()
    }

    pub fn in_flight(&self) -> bool {
        matches!(self.phase, Phase::Submitting | Phase::Analyzing(_))
    }

    /// The ticket currently expected, if a call is out.
    pub fn expected(&self) -> Option<Ticket> {
        match self.phase {
            Phase::Analyzing(ticket) => Some(ticket),
            _ => None,
        }
    }

    fn transition(&mut self, to: Phase) {
        tracing::debug!(from = self.phase.name(), to = to.name(), "pipeline transition");
        self.phase = to;
    }

    /// `Idle | Complete → Submitting`.
    pub fn begin(&mut self) -> Result<(), AnalysisError> {
        if self.in_flight() {
            return Err(AnalysisError::Busy);
        }
        self.transition(Phase::Submitting);
        Ok(())
    }

    /// `Submitting → Analyzing`, issuing the ticket for the call.
    pub fn start(&mut self) -> Result<Ticket, AnalysisError> {
        if self.phase != Phase::Submitting {
            return Err(AnalysisError::Busy);
        }
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.transition(Phase::Analyzing(ticket));
        Ok(ticket)
    }

    /// Settle the call identified by `ticket`.
    pub fn settle(&mut self, ticket: Ticket, succeeded: bool) -> Settlement {
        if self.expected() != Some(ticket) {
            tracing::debug!(%ticket, phase = self.phase.name(), "dropping stale analysis result");
            return Settlement::Stale;
        }
        if succeeded {
            self.transition(Phase::Complete);
            Settlement::Completed
        } else {
            self.transition(Phase::Failed);
            self.transition(Phase::Idle);
            Settlement::Failed
        }
    }

    /// Stop expecting the in-flight call, if any. Returns whether one was out.
    pub fn abandon(&mut self) -> bool {
        if !self.in_flight() {
            return false;
        }
        self.transition(Phase::Idle);
        true
    }

    /// `Complete → Idle` for reclassify; also abandons an in-flight call.
    pub fn reset(&mut self) {
        if self.phase != Phase::Idle {
            self.transition(Phase::Idle);
        }
    }

    /// Resume in `Complete` after restoring a record from storage.
    pub fn resume_complete(&mut self) {
        self.transition(Phase::Complete);
    }
}
