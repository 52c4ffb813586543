//! # GCodePilot CAM
//!
//! The program compiler: a pure, deterministic, total translation of
//! (stock, ordered operations, explanation) into G-code text, packaged
//! as an immutable [`CncOutput`].
//!
//! `compile` never fails. Degenerate geometry (a tool wider than its
//! pocket, an empty contour, an unknown operation kind) produces a
//! commented no-op block and the rest of the program is emitted
//! normally.

pub mod compiler;

pub use compiler::{compile, CHIP_CLEAR, FACE_OVERLAP_FRACTION, POCKET_STEPOVER_FRACTION, SAFE_CLEARANCE};
pub use gcodepilot_core::CncOutput;
