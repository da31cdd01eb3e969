//! Component-definition matcher.
//!
//! Gates on two shapes: a function (declared or literal-bound) whose body
//! contains a markup element, and a class declaration extending a known
//! component base. Enrichment collects state pairs, effect-style calls,
//! input names, capitalized child element tags, and (for the class form)
//! lifecycle methods and constructor-assigned state fields.

use std::collections::BTreeSet;

use idiomap_syntax::Node;

use crate::error::MatchError;
use crate::idiom::{ComponentFacts, IdiomKind, MatchFacts};
use crate::walker::TraversalContext;

use super::{contains_element, is_capitalized, IdiomMatcher, RawMatch};

/// State-pair initializer call name.
const STATE_INIT: &str = "useState";

/// Superclasses that mark a class as a component.
const COMPONENT_BASES: &[&str] = &[
    "Component",
    "PureComponent",
    "React.Component",
    "React.PureComponent",
];

/// Class lifecycle method names.
const LIFECYCLE_METHODS: &[&str] = &[
    "render",
    "componentDidMount",
    "componentDidUpdate",
    "componentWillUnmount",
    "shouldComponentUpdate",
    "componentDidCatch",
    "getSnapshotBeforeUpdate",
];

pub struct ComponentMatcher;

impl IdiomMatcher for ComponentMatcher {
    fn kind(&self) -> IdiomKind {
        IdiomKind::ComponentDefinition
    }

    fn matches<'a>(
        &self,
        node: &'a Node,
        ctx: &TraversalContext<'_, 'a>,
    ) -> Result<Vec<RawMatch<'a>>, MatchError> {
        if let Some(body) = node.function_body() {
            if contains_element(body) {
                return Ok(vec![self.match_function(node, body, ctx)]);
            }
            return Ok(Vec::new());
        }
        if let Node::ClassDecl {
            name,
            superclass: Some(superclass),
            body,
            ..
        } = node
        {
            if COMPONENT_BASES.contains(&superclass.as_str()) {
                return Ok(vec![self.match_class(node, name, body)]);
            }
        }
        Ok(Vec::new())
    }

    fn confidence(&self, m: &RawMatch<'_>) -> f64 {
        match &m.facts {
            MatchFacts::ComponentDefinition(facts) => score(facts),
            _ => 0.0,
        }
    }
}

/// Additive confidence: base 0.4, +0.2 any state/effect usage, +0.15 state
/// present, +0.15 effect calls present, +0.1 inputs present, capped at 1.0.
/// Markup alone scores 0.4 and falls below the default threshold.
pub(crate) fn score(facts: &ComponentFacts) -> f64 {
    let mut s = 0.4_f64;
    if facts.has_state_or_effect() {
        s += 0.2;
    }
    if !facts.state_vars.is_empty() || !facts.state_fields.is_empty() {
        s += 0.15;
    }
    if !facts.effect_calls.is_empty() {
        s += 0.15;
    }
    if !facts.props.is_empty() {
        s += 0.1;
    }
    s.min(1.0)
}

impl ComponentMatcher {
    fn match_function<'a>(
        &self,
        node: &'a Node,
        body: &'a Node,
        ctx: &TraversalContext<'_, 'a>,
    ) -> RawMatch<'a> {
        let name = node
            .declared_name()
            .map(str::to_string)
            .or_else(|| bound_name(ctx));

        let props = function_inputs(node);

        let mut state_vars = Vec::new();
        let mut effect_calls = Vec::new();
        let mut child_components = Vec::new();
        let mut involved = vec![node];

        for n in body.descendants() {
            match n {
                Node::Declarator {
                    target,
                    init: Some(init),
                    ..
                } => {
                    if let (Node::ArrayPattern { elements, .. }, Node::Call { callee, .. }) =
                        (target.as_ref(), init.as_ref())
                    {
                        if callee.identifier_name() == Some(STATE_INIT) {
                            if let Some(state) =
                                elements.first().and_then(Node::identifier_name)
                            {
                                push_unique(&mut state_vars, state);
                                involved.push(n);
                            }
                        }
                    }
                }
                Node::Call { callee, .. } => {
                    if let Some(name) = callee.identifier_name() {
                        if name != STATE_INIT && is_effect_style(name) {
                            push_unique(&mut effect_calls, name);
                        }
                    }
                }
                Node::Element { tag, .. } => {
                    if is_capitalized(tag) {
                        push_unique(&mut child_components, tag);
                        involved.push(n);
                    }
                }
                _ => {}
            }
        }

        let facts = ComponentFacts {
            name: name.clone(),
            is_class: false,
            state_vars: state_vars.clone(),
            effect_calls: effect_calls.clone(),
            props: props.clone(),
            child_components,
            lifecycle_methods: Vec::new(),
            state_fields: Vec::new(),
        };

        let mut variables: BTreeSet<String> = state_vars.into_iter().collect();
        variables.extend(props);
        let mut functions: BTreeSet<String> = effect_calls.into_iter().collect();
        if let Some(name) = name {
            functions.insert(name);
        }

        RawMatch {
            kind: IdiomKind::ComponentDefinition,
            root: node,
            involved,
            variables,
            functions,
            facts: MatchFacts::ComponentDefinition(facts),
        }
    }

    fn match_class<'a>(&self, node: &'a Node, name: &str, body: &'a [Node]) -> RawMatch<'a> {
        let mut lifecycle_methods = Vec::new();
        let mut state_fields = Vec::new();
        let mut involved = vec![node];

        for member in body {
            let Node::Method {
                name: method_name,
                body: method_body,
                ..
            } = member
            else {
                continue;
            };
            if LIFECYCLE_METHODS.contains(&method_name.as_str()) {
                push_unique(&mut lifecycle_methods, method_name);
                involved.push(member);
            }
            if method_name == "constructor" {
                state_fields.extend(constructor_state_fields(method_body));
            }
        }

        let facts = ComponentFacts {
            name: Some(name.to_string()),
            is_class: true,
            state_vars: Vec::new(),
            effect_calls: Vec::new(),
            props: Vec::new(),
            child_components: Vec::new(),
            lifecycle_methods,
            state_fields: state_fields.clone(),
        };

        let variables: BTreeSet<String> = state_fields.into_iter().collect();
        let mut functions = BTreeSet::new();
        functions.insert(name.to_string());

        RawMatch {
            kind: IdiomKind::ComponentDefinition,
            root: node,
            involved,
            variables,
            functions,
            facts: MatchFacts::ComponentDefinition(facts),
        }
    }
}

/// `use` prefix followed by an uppercase letter (`useEffect`, `useMemo`).
fn is_effect_style(name: &str) -> bool {
    name.strip_prefix("use")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// Input names from the function's parameter list: bare identifiers and
/// destructured property names.
fn function_inputs(node: &Node) -> Vec<String> {
    let params = match node {
        Node::FunctionDecl { params, .. } | Node::FunctionExpr { params, .. } => params,
        _ => return Vec::new(),
    };
    let mut inputs = Vec::new();
    for param in params {
        match param {
            Node::Identifier { name, .. } => push_unique(&mut inputs, name),
            Node::ObjectPattern { properties, .. } => {
                for prop in properties {
                    push_unique(&mut inputs, prop);
                }
            }
            _ => {}
        }
    }
    inputs
}

/// Keys of `this.state = { … }` assignments in a constructor body.
fn constructor_state_fields(body: &Node) -> Vec<String> {
    let mut fields = Vec::new();
    for n in body.descendants() {
        let Node::Assign { target, value, .. } = n else {
            continue;
        };
        let Node::Member {
            object, property, ..
        } = target.as_ref()
        else {
            continue;
        };
        if object.identifier_name() != Some("this") || property != "state" {
            continue;
        }
        if let Node::ObjectLit { properties, .. } = value.as_ref() {
            for prop in properties {
                if let Node::ObjectProp { key, .. } = prop {
                    push_unique(&mut fields, key);
                }
            }
        }
    }
    fields
}

/// Name the enclosing declarator binds, for literal-bound components.
fn bound_name(ctx: &TraversalContext<'_, '_>) -> Option<String> {
    ctx.ancestors.iter().rev().find_map(|a| match a {
        Node::Declarator { target, .. } => target.identifier_name().map(str::to_string),
        _ => None,
    })
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::builtin_matchers;
    use crate::walker::Walker;
    use idiomap_syntax::build;

    fn component_facts(tree: &Node) -> Vec<ComponentFacts> {
        let matchers = builtin_matchers();
        Walker::new(&matchers)
            .walk(tree, "")
            .into_iter()
            .filter_map(|m| match m.facts {
                MatchFacts::ComponentDefinition(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn function_component_collects_state_effects_and_props() {
        let tree = build::program(vec![build::func_decl(
            "Profile",
            vec![build::object_pattern(&["userId", "onClose"])],
            build::block(vec![
                build::array_binding(
                    &["user", "setUser"],
                    build::call(build::ident("useState"), vec![]),
                ),
                build::expr_stmt(build::call(
                    build::ident("useEffect"),
                    vec![build::arrow(vec![], build::block(vec![]))],
                )),
                build::ret(build::element(
                    "div",
                    vec![],
                    vec![build::element("Avatar", vec![], vec![])],
                )),
            ]),
        )]);
        let facts = component_facts(&tree);
        assert_eq!(facts.len(), 1);
        let f = &facts[0];
        assert_eq!(f.name.as_deref(), Some("Profile"));
        assert!(!f.is_class);
        assert_eq!(f.state_vars, vec!["user"]);
        assert_eq!(f.effect_calls, vec!["useEffect"]);
        assert_eq!(f.props, vec!["userId", "onClose"]);
        assert_eq!(f.child_components, vec!["Avatar"]);
        assert_eq!(score(f), 1.0);
    }

    #[test]
    fn arrow_component_takes_its_bound_name() {
        let tree = build::program(vec![build::var(
            "Badge",
            build::arrow(
                vec![build::ident("label")],
                build::block(vec![build::ret(build::element("span", vec![], vec![]))]),
            ),
        )]);
        let facts = component_facts(&tree);
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].name.as_deref(), Some("Badge"));
        assert_eq!(facts[0].props, vec!["label"]);
    }

    #[test]
    fn markup_only_function_scores_below_the_threshold() {
        let tree = build::program(vec![build::func_decl(
            "Divider",
            vec![],
            build::block(vec![build::ret(build::element("hr", vec![], vec![]))]),
        )]);
        let facts = component_facts(&tree);
        assert_eq!(facts.len(), 1);
        assert!(score(&facts[0]) < 0.6);
    }

    #[test]
    fn function_without_markup_is_not_a_component() {
        let tree = build::program(vec![build::func_decl(
            "sum",
            vec![build::ident("a"), build::ident("b")],
            build::block(vec![build::ret(build::binary(
                "+",
                build::ident("a"),
                build::ident("b"),
            ))]),
        )]);
        assert!(component_facts(&tree).is_empty());
    }

    #[test]
    fn class_component_collects_lifecycle_and_state_fields() {
        let tree = build::program(vec![build::class_decl(
            "Timer",
            Some("Component"),
            vec![
                build::method(
                    "constructor",
                    vec![build::ident("props")],
                    build::block(vec![build::expr_stmt(build::assign(
                        build::member(build::ident("this"), "state"),
                        build::object(vec![
                            ("elapsed", build::number(0.0)),
                            ("running", build::number(0.0)),
                        ]),
                    ))]),
                ),
                build::method("componentDidMount", vec![], build::block(vec![])),
                build::method("render", vec![], build::block(vec![])),
            ],
        )]);
        let facts = component_facts(&tree);
        assert_eq!(facts.len(), 1);
        let f = &facts[0];
        assert!(f.is_class);
        assert_eq!(f.name.as_deref(), Some("Timer"));
        assert_eq!(f.lifecycle_methods, vec!["componentDidMount", "render"]);
        assert_eq!(f.state_fields, vec!["elapsed", "running"]);
        assert!(score(f) > 0.6);
    }

    #[test]
    fn class_extending_unknown_base_is_ignored() {
        let tree = build::program(vec![build::class_decl(
            "Repository",
            Some("BaseStore"),
            vec![build::method("render", vec![], build::block(vec![]))],
        )]);
        assert!(component_facts(&tree).is_empty());
    }

    mod scoring {
        use super::*;

        #[test]
        fn each_signal_adds_its_weight() {
            let base = ComponentFacts::default();
            assert!((score(&base) - 0.4).abs() < 1e-9);

            let with_state = ComponentFacts {
                state_vars: vec!["count".to_string()],
                ..ComponentFacts::default()
            };
            assert!((score(&with_state) - 0.75).abs() < 1e-9);

            let with_props = ComponentFacts {
                props: vec!["label".to_string()],
                ..ComponentFacts::default()
            };
            assert!((score(&with_props) - 0.5).abs() < 1e-9);
        }

        #[test]
        fn full_signal_set_caps_at_one() {
            let facts = ComponentFacts {
                state_vars: vec!["count".to_string()],
                effect_calls: vec!["useEffect".to_string()],
                props: vec!["label".to_string()],
                ..ComponentFacts::default()
            };
            assert_eq!(score(&facts), 1.0);
        }
    }
}
