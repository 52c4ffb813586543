//! # GCodePilot Session
//!
//! Session state for a multi-turn CNC programming conversation: the
//! [`JobLedger`] (ordered operations plus current stock), the owned
//! [`Session`] object (ledger, pending output, transcript), the
//! [`Analyzer`] boundary trait, and the [`RequestController`] that
//! commits analysis results exactly once, race-free under cancellation.
//!
//! The ledger is mutated only by the controller; the compiler and the
//! analyzer collaborator receive read-only views and never retain them.

pub mod analyzer;
pub mod controller;
pub mod ledger;
pub mod session;

pub use analyzer::{AnalyzeRequest, Analyzer, AnalyzerResponse, Attachment, MediaKind};
pub use controller::{RequestController, RequestState, TurnOutcome, STOPPED_MESSAGE};
pub use ledger::{JobLedger, JobMode};
pub use session::{shared_session, Session, SharedSession};
