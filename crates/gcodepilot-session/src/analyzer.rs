//! The analyzer boundary: the contract with the external AI analysis
//! collaborator.
//!
//! The analyzer consumes a prompt (optionally with one attachment), a
//! model selector, and the turn's job mode, and produces at least one
//! well-formed operation, a stock description, and an explanation. It
//! must observe its cancellation token promptly and resolve to
//! [`AnalyzerError::Cancelled`] rather than a generic failure.

use crate::ledger::JobMode;
use async_trait::async_trait;
use gcodepilot_core::error::AnalyzerError;
use gcodepilot_core::model::{Operation, Stock};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Declared media kind of a request attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Pdf,
    Text,
}

/// A single attachment payload accompanying a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub data: Vec<u8>,
    pub media_kind: MediaKind,
}

/// One analysis turn's input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub prompt: String,
    pub attachment: Option<Attachment>,
    /// Model selector, passed through to the service.
    pub model: String,
    pub mode: JobMode,
}

impl AnalyzeRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>, mode: JobMode) -> Self {
        Self {
            prompt: prompt.into(),
            attachment: None,
            model: model.into(),
            mode,
        }
    }
}

/// A structured analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerResponse {
    /// At least one operation, in the order they should be machined.
    pub operations: Vec<Operation>,
    pub stock: Stock,
    /// Human-readable explanation of what was recognized.
    pub explanation: String,
    /// Ready-made program text; only meaningful in replace mode, where
    /// it is used verbatim instead of invoking the compiler.
    pub program: Option<String>,
}

/// External analysis collaborator.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        request: AnalyzeRequest,
        cancel: CancellationToken,
    ) -> Result<AnalyzerResponse, AnalyzerError>;
}
