//! # GCodePilot
//!
//! Deterministic G-code compiler and session controller for AI-assisted
//! CNC programming.
//!
//! ## Architecture
//!
//! GCodePilot is organized as a workspace with multiple crates:
//!
//! 1. **gcodepilot-core** - Geometry model, error taxonomy, session messages
//! 2. **gcodepilot-cam** - The pure, total program compiler
//! 3. **gcodepilot-session** - Job ledger, session state, request controller
//! 4. **gcodepilot** - Thin binary that compiles job files from the command line
//!
//! The AI analysis call, transcript rendering, toolpath visualization,
//! and code display are external collaborators; their only contract with
//! this core is the data they hand in (`AnalyzerResponse`) and the data
//! they read back (`CncOutput`, session messages).

pub use gcodepilot_cam::compile;
pub use gcodepilot_core::{
    AnalyzerError, CncOutput, CutParams, MessageRole, OpKind, Operation, PathSegment, Point,
    SessionError, SessionMessage, Stock, StockShape,
};
pub use gcodepilot_session::{
    shared_session, AnalyzeRequest, Analyzer, AnalyzerResponse, Attachment, JobLedger, JobMode,
    MediaKind, RequestController, RequestState, Session, SharedSession, TurnOutcome,
};

use serde::{Deserialize, Serialize};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A complete job description as accepted by the command-line front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobFile {
    pub stock: Stock,
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub explanation: String,
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr (program text goes to stdout)
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_file_round_trips_from_json() {
        let json = r#"{
            "stock": {
                "shape": "rectangular",
                "width": 100.0,
                "length": 80.0,
                "height": 15.0,
                "material": "aluminum"
            },
            "operations": [
                {
                    "kind": "drill",
                    "at": { "x": 10.0, "y": 10.0 },
                    "diameter": 6.0,
                    "z_start": 0.0,
                    "z_depth": -8.0,
                    "feed_rate": 120.0,
                    "spindle_speed": 9000.0,
                    "tool_diameter": 6.0,
                    "tool_type": "twist drill",
                    "step_down": 3.0
                }
            ],
            "explanation": "one mounting hole"
        }"#;
        let job: JobFile = serde_json::from_str(json).unwrap();
        assert_eq!(job.operations.len(), 1);
        let output = compile(&job.stock, &job.operations, &job.explanation);
        assert!(output.program.contains("G0 X10.000 Y10.000"));
        assert_eq!(output.explanation, "one mounting hole");

        let back: JobFile = serde_json::from_str(&serde_json::to_string(&job).unwrap()).unwrap();
        assert_eq!(job, back);
    }
}
