//! Error types for the recognition engine.
//!
//! The engine is built for best-effort extraction, so the fault taxonomy is
//! deliberately narrow:
//!
//! - **Matcher fault** (`MatchError`): a single matcher failed on a single
//!   node. Caught and logged at the walker boundary; traversal and all other
//!   matchers continue.
//! - **Conversion fault** (`ConvertError`): one accepted match could not be
//!   turned into an idiom record. That record is dropped; recognition
//!   continues.
//! - **Configuration fault** (`ConfigError`): the only error the engine ever
//!   raises to its caller, returned synchronously from configuration calls.
//!
//! A partial failure never aborts a whole recognition run, and no idiom's
//! failure may cause another idiom's loss.

use thiserror::Error;

/// Errors raised to callers from configuration calls.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The confidence threshold must stay inside `[0.0, 1.0]`.
    #[error("confidence threshold {value} is out of range [0.0, 1.0]")]
    ThresholdOutOfRange { value: f64 },
}

/// A matcher failed while inspecting a node.
///
/// Absorbed at the walker boundary; never visible to callers.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The matcher hit a shape it considers malformed beyond "signal absent".
    #[error("matcher failed on `{node_kind}` node: {reason}")]
    Malformed { node_kind: String, reason: String },
}

/// An accepted match could not be converted into an idiom record.
///
/// Absorbed at the registry boundary; never visible to callers.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A match arrived with no involved nodes to build a record from.
    #[error("match for {kind} has no involved nodes")]
    EmptyMatch { kind: &'static str },
}
