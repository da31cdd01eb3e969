//! Syntax tree contract for the idiomap recognition engine.
//!
//! This crate defines the minimal tree shape the engine consumes:
//! - A closed [`Node`] union, one variant per syntactic form
//! - [`Node::kind`] for the kind tag and [`Node::children`] for child-field
//!   access in field-declaration order
//! - [`Span`] source offsets with graceful defaults when a parser provides
//!   no position information
//! - [`build`] constructor helpers for producing trees by hand
//!
//! Parsing source text into this shape is the job of an external
//! collaborator; the engine never reads source files itself.

pub mod build;
mod node;
mod span;

pub use node::{Child, Descendants, Node};
pub use span::Span;
