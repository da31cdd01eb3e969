//! Idiom recognition engine.
//!
//! Turns a parsed syntax tree into a positioned idiom diagram. The pipeline
//! runs strictly left to right:
//!
//! ```text
//! tree + source → walker → raw matches → registry filter → converter
//!     → idiom records → visual mapper → unpositioned graph → layout
//!     → DiagramGraph
//! ```
//!
//! Recognition is single-threaded, synchronous, and deterministic: the same
//! tree and source text always produce byte-identical serialized output.
//! Partial failure never aborts a run — a failing matcher or a record that
//! cannot be converted is logged and skipped, and the only error surfaced to
//! callers is a configuration fault.
//!
//! ```
//! use idiomap::{build_diagram, MatcherRegistry};
//! use idiomap_syntax::build;
//!
//! let tree = build::program(vec![build::var(
//!     "q",
//!     build::string("SELECT id FROM users"),
//! )]);
//! let registry = MatcherRegistry::with_builtin_matchers();
//! let records = registry.recognize(&tree, "");
//! let diagram = build_diagram(&records);
//! assert_eq!(diagram.nodes.len(), 1);
//! ```

mod convert;
pub mod error;
pub mod idiom;
pub mod layout;
pub mod matchers;
pub mod registry;
mod text;
pub mod visual;
pub mod walker;

pub use error::ConfigError;
pub use idiom::{IdiomKind, IdiomRecord};
pub use registry::MatcherRegistry;
pub use visual::{build_diagram, map_records, DiagramGraph};
