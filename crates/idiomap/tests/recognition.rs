//! End-to-end recognition tests: tree in, positioned diagram out.

use idiomap::idiom::{Complexity, MatchFacts};
use idiomap::{build_diagram, IdiomKind, MatcherRegistry};
use idiomap_syntax::{build, Node, Span};

/// `function Counter() { const [count, setCount] = useState(0);
///  return <button onClick={() => setCount(prev => prev + 1)}/>; }`
fn counter_tree() -> Node {
    build::program(vec![build::func_decl(
        "Counter",
        vec![],
        build::block(vec![
            build::array_binding(
                &["count", "setCount"],
                build::call(build::ident("useState"), vec![build::number(0.0)]),
            ),
            build::ret(build::element(
                "button",
                vec![build::attr(
                    "onClick",
                    build::arrow(
                        vec![],
                        build::call(
                            build::ident("setCount"),
                            vec![build::arrow(
                                vec![build::ident("prev")],
                                build::binary("+", build::ident("prev"), build::number(1.0)),
                            )],
                        ),
                    ),
                )],
                vec![],
            )),
        ]),
    )])
}

#[test]
fn full_counter_scores_above_point_eight() {
    let records = MatcherRegistry::with_builtin_matchers().recognize(&counter_tree(), "");
    let counters: Vec<_> = records
        .iter()
        .filter(|r| r.kind == IdiomKind::Counter)
        .collect();
    assert_eq!(counters.len(), 1);
    let counter = counters[0];
    assert!(counter.metadata.confidence > 0.8);

    let MatchFacts::Counter(facts) = &counter.metadata.facts else {
        panic!("counter facts expected");
    };
    assert!(facts.has_state_init);
    assert!(facts.has_event_handler);
    assert!(facts.is_numeric_initial);
    assert!(facts.has_increment_operation);
    assert!(facts.has_counter_like_names);
}

#[test]
fn bare_fetch_defaults_to_get_with_no_handling() {
    let tree = build::program(vec![build::expr_stmt(build::call(
        build::ident("fetch"),
        vec![build::string("/api/users")],
    ))]);
    let records = MatcherRegistry::with_builtin_matchers().recognize(&tree, "");
    let network = records
        .iter()
        .find(|r| r.kind == IdiomKind::NetworkCall)
        .expect("network idiom recognized");

    let MatchFacts::NetworkCall(facts) = &network.metadata.facts else {
        panic!("network facts expected");
    };
    assert_eq!(facts.endpoint.as_deref(), Some("/api/users"));
    assert_eq!(facts.http_method, "GET");
    assert!(!facts.has_success_handling);
    assert!(!facts.has_error_handling);
}

#[test]
fn sql_literal_is_recognized_and_plain_text_is_not() {
    let registry = MatcherRegistry::with_builtin_matchers();

    let sql = build::program(vec![build::var(
        "q",
        build::string("SELECT id FROM users WHERE id = 1"),
    )]);
    let records = registry.recognize(&sql, "");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, IdiomKind::Persistence);
    let MatchFacts::Persistence(facts) = &records[0].metadata.facts else {
        panic!("persistence facts expected");
    };
    assert_eq!(facts.operation_type.as_deref(), Some("select"));
    assert_eq!(facts.tables, vec!["users"]);

    let plain = build::program(vec![build::var("s", build::string("Hello world"))]);
    assert!(registry.recognize(&plain, "").is_empty());
}

#[test]
fn try_catch_becomes_an_error_handling_record() {
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
    let records = MatcherRegistry::with_builtin_matchers().recognize(&tree, "");
    let record = records
        .iter()
        .find(|r| r.kind == IdiomKind::ErrorHandling)
        .expect("error-handling idiom recognized");
    assert!(record.metadata.variables.contains(&"err".to_string()));
}

#[test]
fn confidence_threshold_is_honored_across_the_range() {
    let tree = counter_tree();

    let mut lax = MatcherRegistry::with_builtin_matchers();
    lax.set_threshold(0.0).unwrap();
    let lax_count = lax.recognize(&tree, "").len();

    let mut strict = MatcherRegistry::with_builtin_matchers();
    strict.set_threshold(1.0).unwrap();
    let strict_count = strict.recognize(&tree, "").len();

    assert!(lax_count >= strict_count);
    // The markup-only default component score is visible only below 0.6.
    let default_count = MatcherRegistry::with_builtin_matchers()
        .recognize(&tree, "")
        .len();
    assert!(lax_count >= default_count);
}

#[test]
fn every_confidence_is_within_the_unit_interval_and_threshold() {
    let tree = counter_tree();
    let records = MatcherRegistry::with_builtin_matchers().recognize(&tree, "");
    assert!(!records.is_empty());
    for record in &records {
        assert!(record.metadata.confidence >= 0.6);
        assert!(record.metadata.confidence <= 1.0);
    }
}

#[test]
fn record_and_node_ids_are_deterministic_and_well_formed() {
    let tree = counter_tree();
    let registry = MatcherRegistry::with_builtin_matchers();
    let records = registry.recognize(&tree, "");
    for (r, record) in records.iter().enumerate() {
        assert_eq!(record.id, format!("idiom-{r}"));
        for (i, node) in record.nodes.iter().enumerate() {
            assert_eq!(node.id, format!("idiom-{r}-node-{i}"));
        }
        for (i, conn) in record.connections.iter().enumerate() {
            assert_eq!(conn.id, format!("idiom-{r}-conn-{i}"));
            assert!(record.nodes.iter().any(|n| n.id == conn.source_id));
            assert!(record.nodes.iter().any(|n| n.id == conn.target_id));
        }
    }
}

#[test]
fn identical_input_serializes_identically() {
    let tree = counter_tree();
    let registry = MatcherRegistry::with_builtin_matchers();
    let first = serde_json::to_string(&build_diagram(&registry.recognize(&tree, ""))).unwrap();
    let second = serde_json::to_string(&build_diagram(&registry.recognize(&tree, ""))).unwrap();
    assert_eq!(first, second);
}

#[test]
fn context_snippet_windows_the_root_span() {
    let source = "x".repeat(300);
    let tree = build::program(vec![build::var(
        "q",
        build::with_span(
            build::string("SELECT id FROM users"),
            Span::new(150, 170),
        ),
    )]);
    let records = MatcherRegistry::with_builtin_matchers().recognize(&tree, &source);
    assert_eq!(records.len(), 1);
    // 50 bytes each side of the 20-byte span.
    assert_eq!(records[0].metadata.context_snippet.len(), 120);
}

#[test]
fn complexity_reflects_structure_counts() {
    let records = MatcherRegistry::with_builtin_matchers().recognize(&counter_tree(), "");
    let counter = records
        .iter()
        .find(|r| r.kind == IdiomKind::Counter)
        .expect("counter idiom recognized");
    // 3 involved nodes + 2*2 variables + 3*1 functions = 10.
    assert_eq!(counter.metadata.complexity, Complexity::Medium);
}

#[test]
fn empty_recognition_builds_an_empty_diagram() {
    let tree = build::program(vec![]);
    let records = MatcherRegistry::with_builtin_matchers().recognize(&tree, "");
    let diagram = build_diagram(&records);
    assert!(diagram.nodes.is_empty());
    assert!(diagram.edges.is_empty());
}

#[test]
fn diagram_positions_follow_the_layered_layout() {
    let tree = counter_tree();
    let records = MatcherRegistry::with_builtin_matchers().recognize(&tree, "");
    let diagram = build_diagram(&records);
    assert!(!diagram.nodes.is_empty());
    for node in &diagram.nodes {
        assert_eq!(node.position.y % diagram.layout.level_spacing, 0.0);
    }
}
