//! The request controller: one cancellable analysis call at a time,
//! exactly-once commitment of its result.
//!
//! Each turn mints a fresh generation number and cancellation token.
//! Commitment is compare-and-commit: the resolving call's effects apply
//! only if its generation still equals the controller's current one.
//! Explicit cancellation bumps the generation, so a result that arrives
//! after the user stopped the turn is discarded without touching the
//! ledger. Every terminal outcome appends exactly one session message
//! and returns the controller to idle; there is no path that leaves it
//! stuck requesting.

use crate::analyzer::{AnalyzeRequest, Analyzer, AnalyzerResponse};
use crate::ledger::JobMode;
use crate::session::SharedSession;
use gcodepilot_core::error::{AnalyzerError, SessionError};
use gcodepilot_core::message::SessionMessage;
use gcodepilot_core::model::{CncOutput, Stock};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// The neutral transcript entry for a stopped turn.
pub const STOPPED_MESSAGE: &str = "Stopped.";

/// Observable controller state. A turn is either outstanding or not;
/// terminal outcomes are reported per call, not held as state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Requesting,
}

/// Terminal outcome of one submitted turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The result was committed; carries the output handed to renderers.
    Success(CncOutput),
    /// The analyzer failed; the error has already been mapped to a
    /// transcript message.
    Failed(AnalyzerError),
    /// The turn was stopped, either by explicit cancellation or by the
    /// analyzer observing its token.
    Cancelled,
}

struct ControllerInner {
    state: RequestState,
    generation: u64,
    cancel: Option<CancellationToken>,
}

/// Orchestrates analysis turns against one shared session.
pub struct RequestController<A: Analyzer> {
    analyzer: A,
    session: SharedSession,
    inner: Mutex<ControllerInner>,
}

impl<A: Analyzer> RequestController<A> {
    pub fn new(analyzer: A, session: SharedSession) -> Self {
        Self {
            analyzer,
            session,
            inner: Mutex::new(ControllerInner {
                state: RequestState::Idle,
                generation: 0,
                cancel: None,
            }),
        }
    }

    pub fn state(&self) -> RequestState {
        self.inner.lock().state
    }

    /// Handle to the session this controller mutates.
    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Runs one analysis turn to a terminal outcome.
    ///
    /// Rejects the call if a turn is already outstanding. The analyzer
    /// call is the only suspension point; ledger mutation, compilation,
    /// and message appending are synchronous once it resolves.
    pub async fn submit(&self, request: AnalyzeRequest) -> Result<TurnOutcome, SessionError> {
        let mode = request.mode;
        let (generation, token) = {
            let mut inner = self.inner.lock();
            if inner.state == RequestState::Requesting {
                return Err(SessionError::RequestInFlight);
            }
            inner.generation += 1;
            inner.state = RequestState::Requesting;
            let token = CancellationToken::new();
            inner.cancel = Some(token.clone());
            (inner.generation, token)
        };
        debug!(generation, ?mode, "analysis turn started");

        let result = self.analyzer.analyze(request, token).await;
        Ok(self.commit(generation, mode, result))
    }

    /// Cooperatively stops the outstanding turn, if any.
    ///
    /// Cancels the in-flight token, invalidates the turn's generation,
    /// appends the single "stopped" message, and returns to idle. The
    /// stale result, whenever it arrives, is discarded silently.
    pub fn cancel(&self) {
        {
            let mut inner = self.inner.lock();
            if inner.state != RequestState::Requesting {
                return;
            }
            if let Some(token) = inner.cancel.take() {
                token.cancel();
            }
            inner.generation += 1;
            inner.state = RequestState::Idle;
            debug!(generation = inner.generation, "turn cancelled by user");
        }
        self.session
            .lock()
            .push_message(SessionMessage::system(STOPPED_MESSAGE));
    }

    /// Stops any outstanding turn without a transcript entry, then
    /// resets the session to the caller-supplied default stock.
    pub fn reset(&self, default_stock: Stock) {
        {
            let mut inner = self.inner.lock();
            if inner.state == RequestState::Requesting {
                if let Some(token) = inner.cancel.take() {
                    token.cancel();
                }
                inner.generation += 1;
                inner.state = RequestState::Idle;
            }
        }
        self.session.lock().reset(default_stock);
    }

    fn commit(
        &self,
        generation: u64,
        mode: JobMode,
        result: Result<AnalyzerResponse, AnalyzerError>,
    ) -> TurnOutcome {
        {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                // Cancellation already finalized this turn; the late
                // result must not mutate anything.
                debug!(generation, "stale analysis result discarded");
                return TurnOutcome::Cancelled;
            }
            inner.state = RequestState::Idle;
            inner.cancel = None;
        }

        let mut session = self.session.lock();
        match result {
            Ok(response) => {
                let AnalyzerResponse {
                    operations,
                    stock,
                    explanation,
                    program,
                } = response;
                session.ledger.apply(operations, stock, mode);
                let output = match (mode, program) {
                    (JobMode::Replace, Some(program)) => CncOutput {
                        program,
                        explanation: explanation.clone(),
                        operations: session.ledger.operations().to_vec(),
                        stock: session.ledger.stock().clone(),
                    },
                    _ => gcodepilot_cam::compile(
                        session.ledger.stock(),
                        session.ledger.operations(),
                        &explanation,
                    ),
                };
                session.set_output(output.clone());
                session.push_message(SessionMessage::assistant(explanation));
                debug!(generation, operations = session.ledger.len(), "turn committed");
                TurnOutcome::Success(output)
            }
            Err(AnalyzerError::Cancelled) => {
                session.push_message(SessionMessage::system(STOPPED_MESSAGE));
                TurnOutcome::Cancelled
            }
            Err(err) => {
                warn!(generation, error = %err, "analysis turn failed");
                session.push_message(SessionMessage::system(failure_message(&err)));
                TurnOutcome::Failed(err)
            }
        }
    }
}

/// Maps a failure to its user-facing transcript entry.
fn failure_message(err: &AnalyzerError) -> String {
    match err {
        AnalyzerError::Cancelled => STOPPED_MESSAGE.to_string(),
        AnalyzerError::Quota { .. } => {
            "The analysis service is rate-limited right now. Wait a moment and try again."
                .to_string()
        }
        AnalyzerError::Parse { .. } => {
            "The analyzer could not produce a structured result. Try a simpler or clearer \
             description of the operation."
                .to_string()
        }
        AnalyzerError::Other { .. } => "Analysis failed. Please try again.".to_string(),
    }
}
