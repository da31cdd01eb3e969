//! Stateful-counter matcher.
//!
//! Gates on component-shaped functions (functions whose body produces
//! markup), then looks for the counter signature: a two-element state-pair
//! initializer (`[count, setCount] = useState(0)`) together with a
//! click-style event-handler binding. Further signals (numeric initial
//! value, increment-shaped setter call, counter-like naming) only raise the
//! score.

use std::collections::BTreeSet;

use idiomap_syntax::Node;

use crate::error::MatchError;
use crate::idiom::{CounterFacts, IdiomKind, MatchFacts};
use crate::walker::TraversalContext;

use super::{callback_name, contains_element, IdiomMatcher, RawMatch};

/// The state-pair initializer the gate recognizes.
const STATE_INIT: &str = "useState";

/// Substring vocabulary marking counter-like state names.
const COUNTER_NAMES: &[&str] = &[
    "count", "counter", "num", "value", "index", "score", "total", "tally", "clicks", "steps",
];

pub struct CounterMatcher;

impl IdiomMatcher for CounterMatcher {
    fn kind(&self) -> IdiomKind {
        IdiomKind::Counter
    }

    fn matches<'a>(
        &self,
        node: &'a Node,
        ctx: &TraversalContext<'_, 'a>,
    ) -> Result<Vec<RawMatch<'a>>, MatchError> {
        let Some(body) = node.function_body() else {
            return Ok(Vec::new());
        };
        if !contains_element(body) {
            return Ok(Vec::new());
        }

        let pairs = state_pairs(body);
        let handlers = event_handlers(body);
        // The counter signature needs both halves; anything less is just a
        // component, not a counter.
        if pairs.is_empty() || handlers.is_empty() {
            return Ok(Vec::new());
        }

        let component = component_name(node, ctx);
        let setters: BTreeSet<&str> = pairs.iter().filter_map(|p| p.setter).collect();

        let mut facts = CounterFacts {
            component: component.map(str::to_string),
            state_var: pairs[0].state_var.map(str::to_string),
            setter: pairs[0].setter.map(str::to_string),
            has_state_init: true,
            has_event_handler: true,
            is_numeric_initial: pairs.iter().any(|p| p.numeric_initial),
            has_increment_operation: has_increment_operation(body, &setters),
            has_counter_like_names: false,
            handlers: Vec::new(),
        };

        let mut variables = BTreeSet::new();
        for pair in &pairs {
            for name in [pair.state_var, pair.setter].into_iter().flatten() {
                variables.insert(name.to_string());
                if COUNTER_NAMES
                    .iter()
                    .any(|w| name.to_ascii_lowercase().contains(w))
                {
                    facts.has_counter_like_names = true;
                }
            }
        }

        let mut functions = BTreeSet::new();
        if let Some(name) = component {
            functions.insert(name.to_string());
        }
        for handler in &handlers {
            if let Node::Attribute { name, value, .. } = handler {
                facts.handlers.push(name.clone());
                if let Some(cb) = value.as_deref().and_then(callback_name) {
                    functions.insert(cb.to_string());
                }
            }
        }

        let mut involved: Vec<&Node> = vec![node];
        involved.extend(pairs.iter().map(|p| p.declarator));
        involved.extend(handlers.iter().copied());

        Ok(vec![RawMatch {
            kind: IdiomKind::Counter,
            root: node,
            involved,
            variables,
            functions,
            facts: MatchFacts::Counter(facts),
        }])
    }

    fn confidence(&self, m: &RawMatch<'_>) -> f64 {
        match &m.facts {
            MatchFacts::Counter(facts) => score(facts),
            _ => 0.0,
        }
    }
}

/// Additive confidence: base 0.5; +0.2 state pair, +0.2 event handler,
/// +0.1 numeric initial, +0.15 increment shape, +0.05 counter naming;
/// capped at 1.0.
pub(crate) fn score(facts: &CounterFacts) -> f64 {
    let mut s = 0.5_f64;
    if facts.has_state_init {
        s += 0.2;
    }
    if facts.has_event_handler {
        s += 0.2;
    }
    if facts.is_numeric_initial {
        s += 0.1;
    }
    if facts.has_increment_operation {
        s += 0.15;
    }
    if facts.has_counter_like_names {
        s += 0.05;
    }
    s.min(1.0)
}

/// One recognized `[state, setState] = useState(init)` declarator.
struct StatePair<'a> {
    declarator: &'a Node,
    state_var: Option<&'a str>,
    setter: Option<&'a str>,
    numeric_initial: bool,
}

fn state_pairs(body: &Node) -> Vec<StatePair<'_>> {
    body.descendants()
        .filter_map(|n| {
            let Node::Declarator {
                target,
                init: Some(init),
                ..
            } = n
            else {
                return None;
            };
            let Node::ArrayPattern { elements, .. } = target.as_ref() else {
                return None;
            };
            if elements.len() != 2 {
                return None;
            }
            let Node::Call { callee, args, .. } = init.as_ref() else {
                return None;
            };
            if callee.identifier_name() != Some(STATE_INIT) {
                return None;
            }
            Some(StatePair {
                declarator: n,
                state_var: elements[0].identifier_name(),
                setter: elements[1].identifier_name(),
                numeric_initial: args.first().is_some_and(is_numeric_literal),
            })
        })
        .collect()
}

/// Numeric literal, or unary minus applied to one.
fn is_numeric_literal(node: &Node) -> bool {
    match node {
        Node::NumberLit { .. } => true,
        Node::Unary { op, operand, .. } => {
            op == "-" && matches!(operand.as_ref(), Node::NumberLit { .. })
        }
        _ => false,
    }
}

/// Click-style handler bindings: `on*` markup attributes with a value.
fn event_handlers(body: &Node) -> Vec<&Node> {
    body.descendants()
        .filter(|n| {
            matches!(
                n,
                Node::Attribute { name, value: Some(_), .. }
                    if name.starts_with("on") && name.len() > 2
            )
        })
        .collect()
}

/// Detect `setter(prev => prev ± 1)`, `setter(x ± 1)`, and
/// `setter(++x / x++)` shapes anywhere in the gated subtree.
fn has_increment_operation(body: &Node, setters: &BTreeSet<&str>) -> bool {
    body.descendants().any(|n| {
        let Node::Call { callee, args, .. } = n else {
            return false;
        };
        let Some(callee_name) = callee.identifier_name() else {
            return false;
        };
        if !setters.contains(callee_name) {
            return false;
        }
        args.first().is_some_and(is_increment_shaped)
    })
}

fn is_increment_shaped(arg: &Node) -> bool {
    match arg {
        // setter(prev => prev + 1), concise or block-with-return body
        Node::FunctionExpr { params, body, .. } => {
            let param = params.first().and_then(|p| p.identifier_name());
            returned_expr(body).is_some_and(|expr| is_step_expr(expr, param))
        }
        _ => is_step_expr(arg, None),
    }
}

/// The expression a concise arrow body or single-return block yields.
fn returned_expr(body: &Node) -> Option<&Node> {
    match body {
        Node::Block { body, .. } => body.iter().find_map(|stmt| match stmt {
            Node::Return {
                value: Some(value), ..
            } => Some(value.as_ref()),
            _ => None,
        }),
        expr => Some(expr),
    }
}

/// `x ± literal` (optionally pinned to a parameter name) or `++x`/`x--`.
fn is_step_expr(expr: &Node, param: Option<&str>) -> bool {
    match expr {
        Node::Binary { op, left, right, .. } => {
            if op != "+" && op != "-" {
                return false;
            }
            let left_ok = match param {
                Some(p) => left.identifier_name() == Some(p),
                None => left.identifier_name().is_some(),
            };
            left_ok && matches!(right.as_ref(), Node::NumberLit { .. })
        }
        Node::Update { .. } => true,
        _ => false,
    }
}

/// Component name: the function's own name, or the binding it is assigned to.
fn component_name<'a>(node: &'a Node, ctx: &TraversalContext<'_, 'a>) -> Option<&'a str> {
    if let Some(name) = node.declared_name() {
        return Some(name);
    }
    match ctx.ancestors.last() {
        Some(Node::Declarator { target, .. }) => target.identifier_name(),
        _ => None,
    }
}
