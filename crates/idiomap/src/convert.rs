//! Raw-match to idiom-record conversion.
//!
//! Each surviving raw match becomes exactly one [`IdiomRecord`]: one typed
//! node per involved tree node, a linear chain of connections between them,
//! and metadata carrying confidence, structure counts, and the typed facts.
//! Ids are derived from a sequential record index, so identical input always
//! produces identical ids.

use serde_json::{Map, Value};

use idiomap_syntax::Node;

use crate::error::ConvertError;
use crate::idiom::{
    Complexity, IdiomConnection, IdiomConnectionKind, IdiomKind, IdiomMetadata, IdiomNode,
    IdiomNodeKind, IdiomRecord, MatchFacts,
};
use crate::matchers::RawMatch;
use crate::text::context_snippet;

/// Convert one accepted raw match into an idiom record.
///
/// `record_index` is the sequential index assigned by the registry and is
/// embedded in every generated id.
pub(crate) fn convert(
    m: &RawMatch<'_>,
    confidence: f64,
    record_index: usize,
    source: &str,
) -> Result<IdiomRecord, ConvertError> {
    if m.involved.is_empty() {
        return Err(ConvertError::EmptyMatch {
            kind: m.kind.as_str(),
        });
    }

    let record_id = format!("idiom-{record_index}");

    let nodes: Vec<IdiomNode> = m
        .involved
        .iter()
        .enumerate()
        .map(|(i, tree_node)| {
            let mut properties = Map::new();
            properties.insert(
                "tree_kind".to_string(),
                Value::String(tree_node.kind().to_string()),
            );
            IdiomNode {
                id: format!("{record_id}-node-{i}"),
                kind: default_node_kind(tree_node),
                label: node_label(tree_node),
                source_span: tree_node.span(),
                properties,
            }
        })
        .collect();

    let connections: Vec<IdiomConnection> = (0..nodes.len().saturating_sub(1))
        .map(|i| IdiomConnection {
            id: format!("{record_id}-conn-{i}"),
            source_id: nodes[i].id.clone(),
            target_id: nodes[i + 1].id.clone(),
            kind: connection_kind(m.kind, &m.facts, i),
            label: None,
            properties: Map::new(),
        })
        .collect();

    let weighted = nodes.len() + 2 * m.variables.len() + 3 * m.functions.len();

    let metadata = IdiomMetadata {
        confidence,
        source_span: m.root.span(),
        variables: m.variables.iter().cloned().collect(),
        functions: m.functions.iter().cloned().collect(),
        complexity: Complexity::from_weighted_count(weighted),
        context_snippet: context_snippet(source, m.root.span()),
        facts: m.facts.clone(),
    };

    Ok(IdiomRecord {
        id: record_id,
        kind: m.kind,
        nodes,
        connections,
        metadata,
    })
}

/// Default node-kind inference from tree-node shape.
fn default_node_kind(node: &Node) -> IdiomNodeKind {
    if node.is_function() {
        return IdiomNodeKind::Behavior;
    }
    match node {
        Node::StringLit { .. } | Node::NumberLit { .. } | Node::TemplateLit { .. } => {
            IdiomNodeKind::Value
        }
        _ => IdiomNodeKind::BuildingBlock,
    }
}

/// Label: the node's declared name when present, else its raw kind tag.
fn node_label(node: &Node) -> String {
    node.declared_name()
        .map(str::to_string)
        .unwrap_or_else(|| node.kind().to_string())
}

/// Connection kind for the `i`th edge of the linear chain, informed by the
/// idiom: counter chains lead with the triggering event, network chains lead
/// with control flow and continue along the observed outcome path,
/// error-handling chains are all error path, everything else is data flow.
fn connection_kind(kind: IdiomKind, facts: &MatchFacts, index: usize) -> IdiomConnectionKind {
    match kind {
        IdiomKind::Counter => {
            if index == 0 {
                IdiomConnectionKind::Event
            } else {
                IdiomConnectionKind::DataFlow
            }
        }
        IdiomKind::NetworkCall => {
            if index == 0 {
                return IdiomConnectionKind::ControlFlow;
            }
            match facts {
                MatchFacts::NetworkCall(f) if f.has_success_handling => {
                    IdiomConnectionKind::SuccessPath
                }
                MatchFacts::NetworkCall(f) if f.has_error_handling => {
                    IdiomConnectionKind::ErrorPath
                }
                _ => IdiomConnectionKind::ControlFlow,
            }
        }
        IdiomKind::ErrorHandling => IdiomConnectionKind::ErrorPath,
        IdiomKind::Persistence | IdiomKind::ComponentDefinition => IdiomConnectionKind::DataFlow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idiom::{CounterFacts, ErrorHandlingFacts, PersistenceFacts};
    use idiomap_syntax::build;
    use std::collections::BTreeSet;

    fn raw<'a>(kind: IdiomKind, involved: Vec<&'a Node>, facts: MatchFacts) -> RawMatch<'a> {
        RawMatch {
            kind,
            root: involved[0],
            involved,
            variables: BTreeSet::new(),
            functions: BTreeSet::new(),
            facts,
        }
    }

    #[test]
    fn ids_embed_the_record_index() {
        let a = build::ident("a");
        let b = build::ident("b");
        let m = raw(
            IdiomKind::Persistence,
            vec![&a, &b],
            MatchFacts::Persistence(PersistenceFacts::default()),
        );
        let record = convert(&m, 0.8, 3, "").unwrap();
        assert_eq!(record.id, "idiom-3");
        assert_eq!(record.nodes[0].id, "idiom-3-node-0");
        assert_eq!(record.nodes[1].id, "idiom-3-node-1");
        assert_eq!(record.connections[0].id, "idiom-3-conn-0");
        assert_eq!(record.connections[0].source_id, "idiom-3-node-0");
        assert_eq!(record.connections[0].target_id, "idiom-3-node-1");
    }

    #[test]
    fn empty_match_is_a_conversion_error() {
        let root = build::ident("x");
        let m = RawMatch {
            kind: IdiomKind::Counter,
            root: &root,
            involved: vec![],
            variables: BTreeSet::new(),
            functions: BTreeSet::new(),
            facts: MatchFacts::Counter(CounterFacts::default()),
        };
        assert!(convert(&m, 0.9, 0, "").is_err());
    }

    #[test]
    fn node_kinds_follow_tree_shape() {
        let f = build::func_decl("handler", vec![], build::block(vec![]));
        let s = build::string("SELECT 1");
        let e = build::expr_stmt(build::ident("x"));
        let m = raw(
            IdiomKind::Persistence,
            vec![&f, &s, &e],
            MatchFacts::Persistence(PersistenceFacts::default()),
        );
        let record = convert(&m, 0.7, 0, "").unwrap();
        assert_eq!(record.nodes[0].kind, IdiomNodeKind::Behavior);
        assert_eq!(record.nodes[0].label, "handler");
        assert_eq!(record.nodes[1].kind, IdiomNodeKind::Value);
        assert_eq!(record.nodes[2].kind, IdiomNodeKind::BuildingBlock);
        assert_eq!(record.nodes[2].label, "expr_stmt");
    }

    #[test]
    fn counter_chains_lead_with_an_event_edge() {
        let a = build::ident("a");
        let b = build::ident("b");
        let c = build::ident("c");
        let m = raw(
            IdiomKind::Counter,
            vec![&a, &b, &c],
            MatchFacts::Counter(CounterFacts::default()),
        );
        let record = convert(&m, 0.9, 0, "").unwrap();
        assert_eq!(record.connections[0].kind, IdiomConnectionKind::Event);
        assert_eq!(record.connections[1].kind, IdiomConnectionKind::DataFlow);
    }

    #[test]
    fn error_handling_chains_are_error_paths() {
        let a = build::ident("a");
        let b = build::ident("b");
        let m = raw(
            IdiomKind::ErrorHandling,
            vec![&a, &b],
            MatchFacts::ErrorHandling(ErrorHandlingFacts::default()),
        );
        let record = convert(&m, 0.9, 0, "").unwrap();
        assert_eq!(record.connections[0].kind, IdiomConnectionKind::ErrorPath);
    }

    #[test]
    fn complexity_counts_nodes_variables_and_functions() {
        let a = build::ident("a");
        let b = build::ident("b");
        let mut m = raw(
            IdiomKind::Persistence,
            vec![&a, &b],
            MatchFacts::Persistence(PersistenceFacts::default()),
        );
        m.variables.insert("users".to_string());
        // 2 nodes + 2*1 variables = 4 → simple
        let record = convert(&m, 0.7, 0, "").unwrap();
        assert_eq!(record.metadata.complexity, Complexity::Simple);

        m.functions.insert("run".to_string());
        m.functions.insert("load".to_string());
        // 2 + 2 + 3*2 = 10 → medium
        let record = convert(&m, 0.7, 0, "").unwrap();
        assert_eq!(record.metadata.complexity, Complexity::Medium);
    }
}
