//! # GCodePilot Core
//!
//! Core value types for GCodePilot: the geometry model (stock, path
//! segments, machining operations), the `CncOutput` export contract,
//! session messages, and the error taxonomy shared by the compiler and
//! session crates.
//!
//! Types here carry shape and validity rules only. Ill-formed values are
//! not rejected at construction; the compiler degrades them to no-op
//! blocks so an upstream producer can never stall the pipeline.

pub mod error;
pub mod message;
pub mod model;

pub use error::{AnalyzerError, SessionError};
pub use message::{MessageRole, SessionMessage};
pub use model::{
    CncOutput, CutParams, OpKind, Operation, PathSegment, Point, Stock, StockShape, GEOM_EPSILON,
};
