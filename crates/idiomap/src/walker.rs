//! Depth-first tree walker that offers every node to every matcher.
//!
//! Traversal is pre-order and synchronous: the walker visits a node, offers
//! it (with a [`TraversalContext`] view) to each registered matcher in
//! registration order, then recurses into every structural child field in
//! field-declaration order. Child results concatenate after the current
//! node's results, so the output order is a pure function of the tree —
//! the determinism the cacheable-output contract relies on.
//!
//! A failing matcher is logged and skipped; it never stops traversal and
//! never suppresses other matchers' results.

use std::collections::HashMap;

use tracing::warn;

use idiomap_syntax::{Child, Node};

use crate::matchers::{IdiomMatcher, RawMatch};

/// Per-node state threaded through the walk.
///
/// `ancestors` runs from the root down to the direct parent of the offered
/// node; `depth` equals its length. The scope and function tables are
/// append-only for the duration of one walk and shared across all levels.
pub struct TraversalContext<'w, 'a> {
    /// Distance from the root (the root itself is offered at depth 0).
    pub depth: usize,
    /// Ancestor chain, root first, direct parent last.
    pub ancestors: &'w [&'a Node],
    /// Named value bindings observed so far: name → declarator node.
    pub scope: &'w HashMap<String, &'a Node>,
    /// Named functions observed so far, including names bound to function
    /// literals: name → function node.
    pub functions: &'w HashMap<String, &'a Node>,
    /// The original source text, for snippet extraction.
    pub source: &'a str,
}

/// Walk state owned by one traversal.
struct WalkState<'a> {
    ancestors: Vec<&'a Node>,
    scope: HashMap<String, &'a Node>,
    functions: HashMap<String, &'a Node>,
}

/// The tree walker. Borrows the registry's matcher list for one run.
pub struct Walker<'m> {
    matchers: &'m [Box<dyn IdiomMatcher>],
}

impl<'m> Walker<'m> {
    pub fn new(matchers: &'m [Box<dyn IdiomMatcher>]) -> Self {
        Walker { matchers }
    }

    /// Collect all raw matches from a depth-first pre-order traversal.
    pub fn walk<'a>(&self, root: &'a Node, source: &'a str) -> Vec<RawMatch<'a>> {
        let mut state = WalkState {
            ancestors: Vec::new(),
            scope: HashMap::new(),
            functions: HashMap::new(),
        };
        let mut out = Vec::new();
        self.visit(root, source, &mut state, &mut out);
        out
    }

    fn visit<'a>(
        &self,
        node: &'a Node,
        source: &'a str,
        state: &mut WalkState<'a>,
        out: &mut Vec<RawMatch<'a>>,
    ) {
        record_declarations(node, state);

        {
            let ctx = TraversalContext {
                depth: state.ancestors.len(),
                ancestors: &state.ancestors,
                scope: &state.scope,
                functions: &state.functions,
                source,
            };
            for matcher in self.matchers {
                match matcher.matches(node, &ctx) {
                    Ok(found) => out.extend(found),
                    Err(err) => warn!(
                        matcher = matcher.kind().as_str(),
                        node = node.kind(),
                        error = %err,
                        "matcher failed; traversal continues"
                    ),
                }
            }
        }

        state.ancestors.push(node);
        for (_, child) in node.children() {
            match child {
                Child::One(c) => self.visit(c, source, state, out),
                Child::Many(cs) => {
                    for c in cs {
                        self.visit(c, source, state, out);
                    }
                }
            }
        }
        state.ancestors.pop();
    }
}

/// Record named value bindings and named functions as they are discovered.
fn record_declarations<'a>(node: &'a Node, state: &mut WalkState<'a>) {
    match node {
        Node::FunctionDecl { name, .. } => {
            state.functions.insert(name.clone(), node);
        }
        Node::Declarator { target, init, .. } => match target.as_ref() {
            Node::Identifier { name, .. } => {
                state.scope.insert(name.clone(), node);
                if let Some(init) = init {
                    if init.is_function() {
                        state.functions.insert(name.clone(), init);
                    }
                }
            }
            Node::ArrayPattern { elements, .. } => {
                for element in elements {
                    if let Some(name) = element.identifier_name() {
                        state.scope.insert(name.to_string(), node);
                    }
                }
            }
            _ => {}
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatchError;
    use crate::idiom::{IdiomKind, MatchFacts, ErrorHandlingFacts};
    use idiomap_syntax::build;
    use std::collections::BTreeSet;

    /// Fails on every node.
    struct Faulty;

    impl IdiomMatcher for Faulty {
        fn kind(&self) -> IdiomKind {
            IdiomKind::Counter
        }

        fn matches<'a>(
            &self,
            node: &'a Node,
            _ctx: &TraversalContext<'_, 'a>,
        ) -> Result<Vec<RawMatch<'a>>, MatchError> {
            Err(MatchError::Malformed {
                node_kind: node.kind().to_string(),
                reason: "synthetic fault".to_string(),
            })
        }

        fn confidence(&self, _m: &RawMatch<'_>) -> f64 {
            0.0
        }
    }

    /// Matches every identifier, so results survive past a faulty peer.
    struct MatchIdents;

    impl IdiomMatcher for MatchIdents {
        fn kind(&self) -> IdiomKind {
            IdiomKind::ErrorHandling
        }

        fn matches<'a>(
            &self,
            node: &'a Node,
            _ctx: &TraversalContext<'_, 'a>,
        ) -> Result<Vec<RawMatch<'a>>, MatchError> {
            if node.identifier_name().is_some() {
                Ok(vec![RawMatch {
                    kind: IdiomKind::ErrorHandling,
                    root: node,
                    involved: vec![node],
                    variables: BTreeSet::new(),
                    functions: BTreeSet::new(),
                    facts: MatchFacts::ErrorHandling(ErrorHandlingFacts::default()),
                }])
            } else {
                Ok(Vec::new())
            }
        }

        fn confidence(&self, _m: &RawMatch<'_>) -> f64 {
            1.0
        }
    }

    #[test]
    fn offer_order_matches_descendants_order() {
        let tree = build::program(vec![
            build::var("a", build::number(1.0)),
            build::expr_stmt(build::ident("a")),
        ]);
        let offered = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        struct Shared(std::rc::Rc<std::cell::RefCell<Vec<String>>>);
        impl IdiomMatcher for Shared {
            fn kind(&self) -> IdiomKind {
                IdiomKind::ErrorHandling
            }
            fn matches<'a>(
                &self,
                node: &'a Node,
                _ctx: &TraversalContext<'_, 'a>,
            ) -> Result<Vec<RawMatch<'a>>, MatchError> {
                self.0.borrow_mut().push(node.kind().to_string());
                Ok(Vec::new())
            }
            fn confidence(&self, _m: &RawMatch<'_>) -> f64 {
                0.0
            }
        }
        let matchers: Vec<Box<dyn IdiomMatcher>> = vec![Box::new(Shared(offered.clone()))];
        Walker::new(&matchers).walk(&tree, "");

        let expected: Vec<String> = tree.descendants().map(|n| n.kind().to_string()).collect();
        assert_eq!(*offered.borrow(), expected);
    }

    #[test]
    fn faulty_matcher_does_not_suppress_other_matchers() {
        let tree = build::program(vec![build::expr_stmt(build::ident("x"))]);
        let matchers: Vec<Box<dyn IdiomMatcher>> =
            vec![Box::new(Faulty), Box::new(MatchIdents)];
        let matches = Walker::new(&matchers).walk(&tree, "");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].root.identifier_name(), Some("x"));
    }

    #[test]
    fn scope_and_function_tables_fill_during_the_walk() {
        let tree = build::program(vec![
            build::var("total", build::number(0.0)),
            build::var("handler", build::arrow(vec![], build::block(vec![]))),
            build::func_decl("main", vec![], build::block(vec![build::expr_stmt(
                build::ident("total"),
            )])),
        ]);

        struct Probe {
            saw: std::rc::Rc<std::cell::RefCell<(bool, bool, bool)>>,
        }
        impl IdiomMatcher for Probe {
            fn kind(&self) -> IdiomKind {
                IdiomKind::ErrorHandling
            }
            fn matches<'a>(
                &self,
                node: &'a Node,
                ctx: &TraversalContext<'_, 'a>,
            ) -> Result<Vec<RawMatch<'a>>, MatchError> {
                // By the time the inner identifier is offered, all three
                // declarations have been observed.
                if node.identifier_name() == Some("total") && ctx.depth > 2 {
                    let mut saw = self.saw.borrow_mut();
                    saw.0 = ctx.scope.contains_key("total");
                    saw.1 = ctx.functions.contains_key("handler");
                    saw.2 = ctx.functions.contains_key("main");
                }
                Ok(Vec::new())
            }
            fn confidence(&self, _m: &RawMatch<'_>) -> f64 {
                0.0
            }
        }

        let saw = std::rc::Rc::new(std::cell::RefCell::new((false, false, false)));
        let matchers: Vec<Box<dyn IdiomMatcher>> =
            vec![Box::new(Probe { saw: saw.clone() })];
        Walker::new(&matchers).walk(&tree, "");
        assert_eq!(*saw.borrow(), (true, true, true));
    }
}
