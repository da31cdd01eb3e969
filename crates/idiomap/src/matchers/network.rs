//! Network-call matcher.
//!
//! Gates on two call shapes: a bare `fetch`-style call, and a client-style
//! call — either invoking a known client identifier directly
//! (`axios(url, config)`) or one of its HTTP-verb methods
//! (`axios.get(url)`). Enrichment extracts the endpoint, the HTTP method,
//! and payload presence, then walks the call's ancestor chain for promise
//! chaining (`.then/.catch/.finally`) or an enclosing `await` inside
//! try/catch.

use std::collections::BTreeSet;

use idiomap_syntax::Node;

use crate::error::MatchError;
use crate::idiom::{IdiomKind, MatchFacts, NetworkFacts};
use crate::walker::TraversalContext;

use super::{base_identifier, callback_name, IdiomMatcher, RawMatch};

/// Client identifiers whose calls count as network requests.
const CLIENTS: &[&str] = &["axios", "api", "http", "client"];

/// HTTP-verb method names on a client object.
const VERB_METHODS: &[&str] = &[
    "get", "post", "put", "delete", "patch", "head", "options", "request",
];

/// Verbs that normally carry a request body.
const PAYLOAD_VERBS: &[&str] = &["post", "put", "patch"];

pub struct NetworkMatcher;

impl IdiomMatcher for NetworkMatcher {
    fn kind(&self) -> IdiomKind {
        IdiomKind::NetworkCall
    }

    fn matches<'a>(
        &self,
        node: &'a Node,
        ctx: &TraversalContext<'_, 'a>,
    ) -> Result<Vec<RawMatch<'a>>, MatchError> {
        let Node::Call { callee, args, .. } = node else {
            return Ok(Vec::new());
        };
        let Some(shape) = classify_callee(callee) else {
            return Ok(Vec::new());
        };

        let mut facts = NetworkFacts {
            client: shape.client.to_string(),
            ..NetworkFacts::default()
        };
        let mut variables = BTreeSet::new();
        let mut functions = BTreeSet::new();

        // Endpoint: positional argument, or a `url` field of a config object.
        let mut endpoint_node = None;
        match args.first() {
            Some(Node::ObjectLit { properties, .. }) => {
                if let Some(url) = object_prop(properties, "url") {
                    extract_endpoint(url, &mut facts, &mut variables);
                    endpoint_node = Some(url);
                }
                if let Some(method) = object_prop(properties, "method") {
                    apply_explicit_method(method, &mut facts);
                }
                if object_prop(properties, "body").is_some()
                    || object_prop(properties, "data").is_some()
                {
                    facts.has_payload = true;
                }
            }
            Some(first) => {
                extract_endpoint(first, &mut facts, &mut variables);
                endpoint_node = Some(first);
            }
            None => {}
        }

        // Verb-method calls fix the method; payload verbs take a body arg.
        if let Some(verb) = shape.verb {
            facts.http_method = verb.to_ascii_uppercase();
            facts.method_known = true;
            if PAYLOAD_VERBS.contains(&verb) && args.len() > 1 {
                facts.has_payload = true;
            }
        } else if let Some(Node::ObjectLit { properties, .. }) = args.get(1) {
            // fetch(url, { method, body }) / axios(url, config)
            if let Some(method) = object_prop(properties, "method") {
                apply_explicit_method(method, &mut facts);
            }
            if object_prop(properties, "body").is_some()
                || object_prop(properties, "data").is_some()
            {
                facts.has_payload = true;
            }
        }

        scan_handling(ctx, &mut facts, &mut functions);

        let mut involved: Vec<&Node> = vec![node];
        if let Some(endpoint) = endpoint_node {
            involved.push(endpoint);
        }

        Ok(vec![RawMatch {
            kind: IdiomKind::NetworkCall,
            root: node,
            involved,
            variables,
            functions,
            facts: MatchFacts::NetworkCall(facts),
        }])
    }

    fn confidence(&self, m: &RawMatch<'_>) -> f64 {
        match &m.facts {
            MatchFacts::NetworkCall(facts) => score(facts),
            _ => 0.0,
        }
    }
}

/// Additive confidence: base 0.4; +0.3 confirmed call, +0.1 endpoint known,
/// +0.1 method known, +0.1 error handling, +0.1 success handling, +0.05 when
/// both handlers are present; capped at 1.0.
pub(crate) fn score(facts: &NetworkFacts) -> f64 {
    let mut s = 0.4_f64;
    if !facts.client.is_empty() {
        s += 0.3;
    }
    if facts.endpoint.is_some() {
        s += 0.1;
    }
    if facts.method_known {
        s += 0.1;
    }
    if facts.has_error_handling {
        s += 0.1;
    }
    if facts.has_success_handling {
        s += 0.1;
    }
    if facts.has_error_handling && facts.has_success_handling {
        s += 0.05;
    }
    s.min(1.0)
}

/// A gated callee shape: which client, and the verb method if any.
struct CalleeShape<'a> {
    client: &'a str,
    verb: Option<&'a str>,
}

fn classify_callee(callee: &Node) -> Option<CalleeShape<'_>> {
    match callee {
        Node::Identifier { name, .. } if name == "fetch" => Some(CalleeShape {
            client: name,
            verb: None,
        }),
        Node::Identifier { name, .. } if CLIENTS.contains(&name.as_str()) => Some(CalleeShape {
            client: name,
            verb: None,
        }),
        Node::Member {
            object, property, ..
        } => {
            let base = base_identifier(object)?;
            if CLIENTS.contains(&base) && VERB_METHODS.contains(&property.as_str()) {
                Some(CalleeShape {
                    client: base,
                    verb: Some(property),
                })
            } else {
                None
            }
        }
        _ => None,
    }
}

fn object_prop<'a>(properties: &'a [Node], key: &str) -> Option<&'a Node> {
    properties.iter().find_map(|p| match p {
        Node::ObjectProp { key: k, value, .. } if k == key => Some(value.as_ref()),
        _ => None,
    })
}

/// Endpoint forms: string literal, template literal with interpolations
/// (recorded as dependent variables), or a bare identifier.
fn extract_endpoint(node: &Node, facts: &mut NetworkFacts, variables: &mut BTreeSet<String>) {
    match node {
        Node::StringLit { value, .. } => {
            facts.endpoint = Some(value.clone());
        }
        Node::TemplateLit { quasis, exprs, .. } => {
            let mut rendered = String::new();
            for (i, quasi) in quasis.iter().enumerate() {
                rendered.push_str(quasi);
                if let Some(expr) = exprs.get(i) {
                    if let Some(name) = expr.identifier_name() {
                        rendered.push_str(&format!("${{{name}}}"));
                        variables.insert(name.to_string());
                    } else {
                        rendered.push_str("${…}");
                    }
                }
            }
            facts.endpoint = Some(rendered);
            facts.endpoint_dynamic = true;
        }
        Node::Identifier { name, .. } => {
            facts.endpoint = Some(name.clone());
            facts.endpoint_dynamic = true;
            variables.insert(name.clone());
        }
        _ => {}
    }
}

fn apply_explicit_method(value: &Node, facts: &mut NetworkFacts) {
    if let Node::StringLit { value, .. } = value {
        facts.http_method = value.to_ascii_uppercase();
        facts.method_known = true;
    }
}

/// Detect response handling around the gated call.
///
/// Promise chains appear above the call as alternating member/call pairs:
/// `fetch(u).then(ok).catch(err)` nests the fetch call under
/// `Member(then) → Call → Member(catch) → Call`. Await-style handling is an
/// enclosing `await` together with a try/catch ancestor.
fn scan_handling(
    ctx: &TraversalContext<'_, '_>,
    facts: &mut NetworkFacts,
    functions: &mut BTreeSet<String>,
) {
    let mut idx = ctx.ancestors.len();
    while idx >= 2 {
        let Node::Member { property, .. } = ctx.ancestors[idx - 1] else {
            break;
        };
        let Node::Call { args, .. } = ctx.ancestors[idx - 2] else {
            break;
        };
        match property.as_str() {
            "then" => {
                facts.has_success_handling = true;
                if let Some(name) = args.first().and_then(callback_name) {
                    facts.success_handlers.push(name.to_string());
                    functions.insert(name.to_string());
                }
                // then(onOk, onErr) carries a rejection handler too.
                if let Some(second) = args.get(1) {
                    facts.has_error_handling = true;
                    if let Some(name) = callback_name(second) {
                        facts.error_handlers.push(name.to_string());
                        functions.insert(name.to_string());
                    }
                }
            }
            "catch" => {
                facts.has_error_handling = true;
                if let Some(name) = args.first().and_then(callback_name) {
                    facts.error_handlers.push(name.to_string());
                    functions.insert(name.to_string());
                }
            }
            "finally" => facts.has_finally = true,
            _ => break,
        }
        idx -= 2;
    }

    let awaited = ctx
        .ancestors
        .iter()
        .rev()
        .any(|a| matches!(a, Node::Await { .. }));
    if awaited {
        let try_handler = ctx.ancestors.iter().rev().find_map(|a| match a {
            Node::Try {
                handler: Some(handler),
                ..
            } => Some(handler.as_ref()),
            _ => None,
        });
        if let Some(Node::CatchClause { param, .. }) = try_handler {
            facts.has_error_handling = true;
            if let Some(param) = param {
                facts.error_handlers.push(param.clone());
            }
        }
    }
}
