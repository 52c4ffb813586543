//! The owned session object: ledger, pending compiled output, and the
//! message transcript. Shared across turns behind a mutex; there is no
//! ambient global state.

use crate::ledger::JobLedger;
use gcodepilot_core::message::SessionMessage;
use gcodepilot_core::model::{CncOutput, Stock};
use parking_lot::Mutex;
use std::sync::Arc;

/// Thread-safe handle to a session, shared between the controller and
/// the calling shell.
pub type SharedSession = Arc<Mutex<Session>>;

/// Creates a new shared session with the given starting stock.
pub fn shared_session(stock: Stock) -> SharedSession {
    Arc::new(Mutex::new(Session::new(stock)))
}

/// All mutable state for one multi-turn session.
#[derive(Debug)]
pub struct Session {
    pub ledger: JobLedger,
    output: Option<CncOutput>,
    messages: Vec<SessionMessage>,
}

impl Session {
    pub fn new(stock: Stock) -> Self {
        Self {
            ledger: JobLedger::new(stock),
            output: None,
            messages: Vec::new(),
        }
    }

    /// The most recently compiled output, if any.
    pub fn output(&self) -> Option<&CncOutput> {
        self.output.as_ref()
    }

    pub fn set_output(&mut self, output: CncOutput) {
        self.output = Some(output);
    }

    pub fn messages(&self) -> &[SessionMessage] {
        &self.messages
    }

    pub fn push_message(&mut self, message: SessionMessage) {
        self.messages.push(message);
    }

    /// Clears operations, restores the caller-supplied default stock,
    /// and drops any compiled output and the transcript in one mutation.
    /// Callers hold the session lock, so no state is observable
    /// mid-reset.
    pub fn reset(&mut self, default_stock: Stock) {
        self.ledger.clear(default_stock);
        self.output = None;
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcodepilot_core::model::{CutParams, OpKind, Operation};
    use crate::ledger::JobMode;

    #[test]
    fn reset_clears_everything_at_once() {
        let mut session = Session::new(Stock::default());
        session.ledger.apply(
            vec![Operation::new(OpKind::FaceMill, CutParams::default())],
            Stock::default(),
            JobMode::Accumulate,
        );
        session.set_output(gcodepilot_cam::compile(
            session.ledger.stock(),
            session.ledger.operations(),
            "",
        ));
        session.push_message(SessionMessage::assistant("done"));

        let mut fresh = Stock::default();
        fresh.material = "mdf".to_string();
        session.reset(fresh.clone());

        assert!(session.ledger.is_empty());
        assert_eq!(session.ledger.stock(), &fresh);
        assert!(session.output().is_none());
        assert!(session.messages().is_empty());
    }
}
