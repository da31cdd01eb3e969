//! Idiom matchers: pluggable recognizers offered every node of the walk.
//!
//! Every matcher follows the same two-stage shape:
//!
//! 1. A cheap structural gate — is this node the right syntactic shape at
//!    all (a component-shaped function, a fetch-style call, a SQL-leading
//!    string literal, a try/catch statement)?
//! 2. An enrichment pass over the gated subtree only, extracting the typed
//!    facts the idiom's scoring function weighs.
//!
//! Matchers are pure with respect to the tree and never fail on malformed
//! or partial shapes: a missing field is "signal absent", not an error.
//! Each confidence function is a named, independently tested scoring
//! function over the typed facts, so every weight is testable on its own.

use std::collections::BTreeSet;

use idiomap_syntax::Node;

use crate::error::MatchError;
use crate::idiom::{IdiomKind, MatchFacts};
use crate::walker::TraversalContext;

mod component;
mod counter;
mod error_handling;
mod network;
mod persistence;

pub use component::ComponentMatcher;
pub use counter::CounterMatcher;
pub use error_handling::ErrorHandlingMatcher;
pub use network::NetworkMatcher;
pub use persistence::PersistenceMatcher;

/// An unfiltered, matcher-produced candidate idiom occurrence.
///
/// Ephemeral: raw matches exist between the walk and the registry's
/// threshold filter and are never exposed outside the engine pipeline.
#[derive(Debug)]
pub struct RawMatch<'a> {
    pub kind: IdiomKind,
    /// The gated node the match is anchored on.
    pub root: &'a Node,
    /// Tree nodes participating in the idiom, in matcher-defined order.
    /// The converter builds one idiom node per entry.
    pub involved: Vec<&'a Node>,
    /// Variable names the idiom involves (sorted set for determinism).
    pub variables: BTreeSet<String>,
    /// Function names the idiom involves (sorted set for determinism).
    pub functions: BTreeSet<String>,
    /// Typed per-idiom facts feeding the scoring function.
    pub facts: MatchFacts,
}

/// The matcher plugin interface.
///
/// New idiom kinds are added purely by implementing and registering a new
/// matcher; walker, registry, converter, and mapper need no changes beyond
/// the mapper's default fallback.
pub trait IdiomMatcher {
    /// The idiom kind this matcher produces.
    fn kind(&self) -> IdiomKind;

    /// Inspect one node (with its traversal context) and emit zero or more
    /// raw matches. An `Err` is logged at the walker boundary and skipped.
    fn matches<'a>(
        &self,
        node: &'a Node,
        ctx: &TraversalContext<'_, 'a>,
    ) -> Result<Vec<RawMatch<'a>>, MatchError>;

    /// Score a match this matcher produced. Always in `[0.0, 1.0]`.
    fn confidence(&self, m: &RawMatch<'_>) -> f64;
}

/// The five built-in matchers, in canonical registration order.
pub fn builtin_matchers() -> Vec<Box<dyn IdiomMatcher>> {
    vec![
        Box::new(CounterMatcher),
        Box::new(NetworkMatcher),
        Box::new(PersistenceMatcher),
        Box::new(ErrorHandlingMatcher),
        Box::new(ComponentMatcher),
    ]
}

// ============================================================================
// Shared structural helpers
// ============================================================================

/// True if any node in the subtree is a markup element.
pub(crate) fn contains_element(node: &Node) -> bool {
    node.descendants()
        .any(|n| matches!(n, Node::Element { .. }))
}

/// True if the name starts with an ASCII uppercase letter.
pub(crate) fn is_capitalized(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// The base identifier of a member chain: `a.b.c` → `a`, `x` → `x`.
pub(crate) fn base_identifier(node: &Node) -> Option<&str> {
    match node {
        Node::Identifier { name, .. } => Some(name),
        Node::Member { object, .. } => base_identifier(object),
        _ => None,
    }
}

/// The display name of a callback argument: a bare identifier's name, or a
/// named function literal's name.
pub(crate) fn callback_name(node: &Node) -> Option<&str> {
    match node {
        Node::Identifier { name, .. } => Some(name),
        Node::FunctionExpr {
            name: Some(name), ..
        } => Some(name),
        _ => None,
    }
}
