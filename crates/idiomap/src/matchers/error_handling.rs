//! Error-handling matcher.
//!
//! Gates on `try`/`catch` statements, and on global unhandled-rejection
//! listener registrations (`process.on("unhandledRejection", …)` and
//! `window.addEventListener("unhandledrejection", …)`).

use std::collections::BTreeSet;

use idiomap_syntax::Node;

use crate::error::MatchError;
use crate::idiom::{ErrorHandlingFacts, IdiomKind, MatchFacts};
use crate::walker::TraversalContext;

use super::{callback_name, IdiomMatcher, RawMatch};

/// Objects a global rejection listener may be registered on.
const LISTENER_TARGETS: &[&str] = &["process", "window", "globalThis", "self"];

/// Registration method names, paired with the rejection event they accept.
const LISTENER_METHODS: &[&str] = &["on", "addEventListener", "once"];

/// Event names marking an unhandled-rejection listener.
const REJECTION_EVENTS: &[&str] = &["unhandledRejection", "unhandledrejection"];

pub struct ErrorHandlingMatcher;

impl IdiomMatcher for ErrorHandlingMatcher {
    fn kind(&self) -> IdiomKind {
        IdiomKind::ErrorHandling
    }

    fn matches<'a>(
        &self,
        node: &'a Node,
        _ctx: &TraversalContext<'_, 'a>,
    ) -> Result<Vec<RawMatch<'a>>, MatchError> {
        if let Node::Try {
            block,
            handler,
            finalizer,
            ..
        } = node
        {
            // Only try statements with a catch clause qualify; a bare
            // try/finally has no error path.
            let Some(handler) = handler else {
                return Ok(Vec::new());
            };
            return Ok(vec![self.match_try(node, block, handler, finalizer)]);
        }
        if let Node::Call { callee, args, .. } = node {
            if let Some(m) = self.match_global_listener(node, callee, args) {
                return Ok(vec![m]);
            }
        }
        Ok(Vec::new())
    }

    fn confidence(&self, m: &RawMatch<'_>) -> f64 {
        match &m.facts {
            MatchFacts::ErrorHandling(facts) => score(facts),
            _ => 0.0,
        }
    }
}

/// Additive confidence: base 0.5, +0.4 confirmed handler, +0.1 non-empty
/// handler body, capped at 1.0.
pub(crate) fn score(facts: &ErrorHandlingFacts) -> f64 {
    let mut s = 0.5_f64;
    if facts.confirmed {
        s += 0.4;
    }
    if facts.has_handler_body {
        s += 0.1;
    }
    s.min(1.0)
}

impl ErrorHandlingMatcher {
    fn match_try<'a>(
        &self,
        node: &'a Node,
        block: &'a Node,
        handler: &'a Node,
        finalizer: &Option<Box<Node>>,
    ) -> RawMatch<'a> {
        let (caught_binding, has_handler_body) = match handler {
            Node::CatchClause { param, body, .. } => {
                (param.clone(), !block_is_empty(body))
            }
            _ => (None, false),
        };

        let facts = ErrorHandlingFacts {
            confirmed: true,
            caught_binding: caught_binding.clone(),
            has_finally: finalizer.is_some(),
            has_handler_body,
            is_global_listener: false,
            listener_event: None,
        };

        let mut variables = BTreeSet::new();
        if let Some(name) = &caught_binding {
            variables.insert(name.clone());
        }

        RawMatch {
            kind: IdiomKind::ErrorHandling,
            root: node,
            involved: vec![node, block, handler],
            variables,
            functions: BTreeSet::new(),
            facts: MatchFacts::ErrorHandling(facts),
        }
    }

    fn match_global_listener<'a>(
        &self,
        node: &'a Node,
        callee: &'a Node,
        args: &'a [Node],
    ) -> Option<RawMatch<'a>> {
        let Node::Member {
            object, property, ..
        } = callee
        else {
            return None;
        };
        if !LISTENER_METHODS.contains(&property.as_str()) {
            return None;
        }
        let Node::Identifier { name: target, .. } = object.as_ref() else {
            return None;
        };
        if !LISTENER_TARGETS.contains(&target.as_str()) {
            return None;
        }
        let Some(Node::StringLit { value: event, .. }) = args.first() else {
            return None;
        };
        if !REJECTION_EVENTS.contains(&event.as_str()) {
            return None;
        }

        let listener = args.get(1);
        let facts = ErrorHandlingFacts {
            confirmed: true,
            caught_binding: None,
            has_finally: false,
            has_handler_body: listener.is_some_and(|l| l.is_function()),
            is_global_listener: true,
            listener_event: Some(event.clone()),
        };

        let mut functions = BTreeSet::new();
        if let Some(name) = listener.and_then(callback_name) {
            functions.insert(name.to_string());
        }

        let mut involved = vec![node];
        if let Some(listener) = listener {
            involved.push(listener);
        }

        Some(RawMatch {
            kind: IdiomKind::ErrorHandling,
            root: node,
            involved,
            variables: BTreeSet::new(),
            functions,
            facts: MatchFacts::ErrorHandling(facts),
        })
    }
}

fn block_is_empty(node: &Node) -> bool {
    match node {
        Node::Block { body, .. } => body.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::builtin_matchers;
    use crate::walker::Walker;
    use idiomap_syntax::build;

    fn error_facts(tree: &Node) -> Vec<ErrorHandlingFacts> {
        let matchers = builtin_matchers();
        Walker::new(&matchers)
            .walk(tree, "")
            .into_iter()
            .filter_map(|m| match m.facts {
                MatchFacts::ErrorHandling(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn try_catch_is_confirmed_with_binding_and_body() {
        let tree = build::program(vec![build::try_stmt(
            build::block(vec![build::expr_stmt(build::call(
                build::ident("risky"),
                vec![],
            ))]),
            Some(build::catch(
                Some("err"),
                build::block(vec![build::expr_stmt(build::call(
                    build::member(build::ident("console"), "error"),
                    vec![build::ident("err")],
                ))]),
            )),
            None,
        )]);
        let facts = error_facts(&tree);
        assert_eq!(facts.len(), 1);
        let f = &facts[0];
        assert!(f.confirmed);
        assert_eq!(f.caught_binding.as_deref(), Some("err"));
        assert!(f.has_handler_body);
        assert!(!f.has_finally);
        assert!((score(f) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_catch_body_loses_the_body_credit() {
        let tree = build::program(vec![build::try_stmt(
            build::block(vec![]),
            Some(build::catch(None, build::block(vec![]))),
            None,
        )]);
        let facts = error_facts(&tree);
        let f = &facts[0];
        assert!(f.caught_binding.is_none());
        assert!(!f.has_handler_body);
        assert!((score(f) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn try_finally_without_catch_does_not_match() {
        let tree = build::program(vec![build::try_stmt(
            build::block(vec![]),
            None,
            Some(build::block(vec![])),
        )]);
        assert!(error_facts(&tree).is_empty());
    }

    #[test]
    fn finally_presence_is_recorded() {
        let tree = build::program(vec![build::try_stmt(
            build::block(vec![]),
            Some(build::catch(Some("e"), build::block(vec![]))),
            Some(build::block(vec![])),
        )]);
        let facts = error_facts(&tree);
        assert!(facts[0].has_finally);
    }

    #[test]
    fn process_rejection_listener_matches() {
        let tree = build::program(vec![build::expr_stmt(build::call(
            build::member(build::ident("process"), "on"),
            vec![
                build::string("unhandledRejection"),
                build::arrow(vec![build::ident("reason")], build::block(vec![])),
            ],
        ))]);
        let facts = error_facts(&tree);
        assert_eq!(facts.len(), 1);
        let f = &facts[0];
        assert!(f.is_global_listener);
        assert_eq!(f.listener_event.as_deref(), Some("unhandledRejection"));
        assert!(f.has_handler_body);
    }

    #[test]
    fn unrelated_listener_registration_is_ignored() {
        let tree = build::program(vec![build::expr_stmt(build::call(
            build::member(build::ident("window"), "addEventListener"),
            vec![
                build::string("resize"),
                build::arrow(vec![], build::block(vec![])),
            ],
        ))]);
        assert!(error_facts(&tree).is_empty());
    }
}
