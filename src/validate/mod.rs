//! Cross-field validation of resolved settings.
//!
//! This module handles:
//! - The ordered rule battery and its short-circuit evaluation
//! - Structured diagnostics and the sinks that receive them
//! - Slicing-engine selection and which keys each engine consumes

pub mod diagnostic;
pub mod engine;
pub mod rules;

pub use diagnostic::{Diagnostic, DiagnosticSink, Severity, TracingSink};
pub use engine::{EngineLookup, SlicingEngine, StaticEngineLookup};
pub use rules::{SPEED_SETTINGS, Validator, Verdict};
