//! Persistence-operation matcher.
//!
//! Gates on three shapes:
//!
//! 1. A string/template literal whose text begins (after leading whitespace,
//!    case-insensitive) with a SQL operation keyword.
//! 2. A call establishing a connection or pool, by identifier or method name
//!    against a per-library vocabulary.
//! 3. An ORM-style method call on a capitalized model object or a known
//!    client object.
//!
//! SQL text is mined with anchored regexes for the operation type and the
//! referenced table names. A SQL literal passed directly to an execution
//! call is reported once, from the literal's own visit, with the execution
//! context credited; the enclosing call is skipped.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use idiomap_syntax::Node;

use crate::error::MatchError;
use crate::idiom::{IdiomKind, LibraryIdentity, MatchFacts, PersistenceFacts};
use crate::walker::TraversalContext;

use super::{base_identifier, is_capitalized, IdiomMatcher, RawMatch};

/// Leading SQL operation keyword, anchored past leading whitespace.
static SQL_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(select|insert|update|delete|create|drop|alter)\b").unwrap()
});

/// Table references: `FROM|INTO|UPDATE|JOIN <identifier>`.
static SQL_TABLES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:from|into|update|join)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap()
});

/// Identifiers that name a persistence library.
const LIBRARIES: &[&str] = &[
    "mysql",
    "pg",
    "postgres",
    "sqlite",
    "sqlite3",
    "mongoose",
    "mongodb",
    "prisma",
    "sequelize",
    "knex",
    "redis",
];

/// Client-ish object names an ORM call may hang off.
const CLIENT_OBJECTS: &[&str] = &[
    "db",
    "database",
    "pool",
    "conn",
    "connection",
    "client",
    "repo",
    "repository",
];

/// Connection/pool-establishing call names.
const CONNECT_METHODS: &[&str] = &["createConnection", "createPool", "connect", "createClient"];

/// Query-execution method names.
const EXEC_METHODS: &[&str] = &["query", "execute", "run", "all", "get", "prepare"];

/// ORM method name → inferred operation type.
const ORM_METHODS: &[(&str, &str)] = &[
    ("find", "select"),
    ("findOne", "select"),
    ("findAll", "select"),
    ("findById", "select"),
    ("findMany", "select"),
    ("findFirst", "select"),
    ("aggregate", "select"),
    ("count", "select"),
    ("create", "insert"),
    ("insert", "insert"),
    ("insertOne", "insert"),
    ("insertMany", "insert"),
    ("save", "insert"),
    ("update", "update"),
    ("updateOne", "update"),
    ("updateMany", "update"),
    ("upsert", "update"),
    ("delete", "delete"),
    ("deleteOne", "delete"),
    ("deleteMany", "delete"),
    ("destroy", "delete"),
    ("remove", "delete"),
];

pub struct PersistenceMatcher;

impl IdiomMatcher for PersistenceMatcher {
    fn kind(&self) -> IdiomKind {
        IdiomKind::Persistence
    }

    fn matches<'a>(
        &self,
        node: &'a Node,
        ctx: &TraversalContext<'_, 'a>,
    ) -> Result<Vec<RawMatch<'a>>, MatchError> {
        if let Some(text) = literal_text(node) {
            return Ok(self.match_sql_literal(node, &text, ctx));
        }
        if let Node::Call { callee, args, .. } = node {
            if let Some(m) = self.match_connection(node, callee) {
                return Ok(vec![m]);
            }
            if let Some(m) = self.match_orm_call(node, callee, args, ctx) {
                return Ok(vec![m]);
            }
        }
        Ok(Vec::new())
    }

    fn confidence(&self, m: &RawMatch<'_>) -> f64 {
        match &m.facts {
            MatchFacts::Persistence(facts) => score(facts),
            _ => 0.0,
        }
    }
}

/// Additive confidence per signal: +0.35 confirmed SQL (+0.1 with extracted
/// tables), +0.1 connection, +0.15 known library (+0.1 when only generically
/// inferred), +0.15 execution context, +0.05 surrounding data flow, +0.05
/// error handling, +0.15 bonus when SQL, execution, and a known library all
/// line up, −0.1 penalty for a bare connection; clamped to `[0.1, 1.0]`.
pub(crate) fn score(facts: &PersistenceFacts) -> f64 {
    let mut s = 0.0_f64;
    if facts.sql_confirmed {
        s += 0.35;
        if !facts.tables.is_empty() {
            s += 0.1;
        }
    }
    if facts.has_connection {
        s += 0.1;
    }
    s += match facts.library {
        LibraryIdentity::Known(_) => 0.15,
        LibraryIdentity::Inferred => 0.1,
        LibraryIdentity::Unknown => 0.0,
    };
    if facts.in_execution_context {
        s += 0.15;
    }
    if facts.has_data_flow {
        s += 0.05;
    }
    if facts.has_error_handling {
        s += 0.05;
    }
    if facts.sql_confirmed && facts.in_execution_context && facts.library.is_known() {
        s += 0.15;
    }
    if facts.has_connection
        && !facts.sql_confirmed
        && !facts.is_orm_call
        && !facts.in_execution_context
    {
        s -= 0.1;
    }
    s.clamp(0.1, 1.0)
}

impl PersistenceMatcher {
    fn match_sql_literal<'a>(
        &self,
        node: &'a Node,
        text: &str,
        ctx: &TraversalContext<'_, 'a>,
    ) -> Vec<RawMatch<'a>> {
        let Some(caps) = SQL_START.captures(text) else {
            return Vec::new();
        };
        let operation = caps[1].to_ascii_lowercase();

        let mut tables = Vec::new();
        for caps in SQL_TABLES.captures_iter(text) {
            let table = caps[1].to_string();
            if !tables.contains(&table) {
                tables.push(table);
            }
        }

        let exec = enclosing_execution_call(ctx);
        let library = match exec.as_ref().and_then(|e| e.library.clone()) {
            Some(lib) => LibraryIdentity::Known(lib),
            // SQL text alone still implies some SQL library.
            None => LibraryIdentity::Inferred,
        };

        let facts = PersistenceFacts {
            operation_type: Some(operation),
            tables,
            sql_confirmed: true,
            is_orm_call: false,
            has_connection: false,
            library,
            in_execution_context: exec.is_some(),
            has_data_flow: has_surrounding_data_flow(ctx),
            has_error_handling: has_enclosing_try(ctx),
        };

        let mut variables = BTreeSet::new();
        for table in &facts.tables {
            variables.insert(table.clone());
        }

        vec![RawMatch {
            kind: IdiomKind::Persistence,
            root: node,
            involved: vec![node],
            variables,
            functions: BTreeSet::new(),
            facts: MatchFacts::Persistence(facts),
        }]
    }

    fn match_connection<'a>(&self, node: &'a Node, callee: &'a Node) -> Option<RawMatch<'a>> {
        let library = match callee {
            Node::Identifier { name, .. } if CONNECT_METHODS.contains(&name.as_str()) => {
                LibraryIdentity::Inferred
            }
            Node::Member {
                object, property, ..
            } if CONNECT_METHODS.contains(&property.as_str()) => {
                match base_identifier(object) {
                    Some(base) if LIBRARIES.contains(&base) => {
                        LibraryIdentity::Known(base.to_string())
                    }
                    _ => LibraryIdentity::Inferred,
                }
            }
            _ => return None,
        };

        let facts = PersistenceFacts {
            has_connection: true,
            library,
            ..PersistenceFacts::default()
        };

        Some(RawMatch {
            kind: IdiomKind::Persistence,
            root: node,
            involved: vec![node],
            variables: BTreeSet::new(),
            functions: BTreeSet::new(),
            facts: MatchFacts::Persistence(facts),
        })
    }

    fn match_orm_call<'a>(
        &self,
        node: &'a Node,
        callee: &'a Node,
        args: &'a [Node],
        ctx: &TraversalContext<'_, 'a>,
    ) -> Option<RawMatch<'a>> {
        let Node::Member {
            object, property, ..
        } = callee
        else {
            return None;
        };
        let base = base_identifier(object)?;
        let model_like = is_capitalized(base) || CLIENT_OBJECTS.contains(&base);
        if !model_like && !LIBRARIES.contains(&base) {
            return None;
        }

        let orm_operation = ORM_METHODS
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, op)| *op);
        let is_exec = EXEC_METHODS.contains(&property.as_str());
        if orm_operation.is_none() && !is_exec {
            return None;
        }
        // A SQL literal argument is reported from the literal's own visit.
        if args.iter().any(|a| {
            literal_text(a)
                .as_deref()
                .is_some_and(|t| SQL_START.is_match(t))
        }) {
            return None;
        }

        let library = if LIBRARIES.contains(&base) {
            LibraryIdentity::Known(base.to_string())
        } else {
            LibraryIdentity::Inferred
        };

        let facts = PersistenceFacts {
            operation_type: orm_operation.map(str::to_string),
            tables: Vec::new(),
            sql_confirmed: orm_operation.is_some(),
            is_orm_call: true,
            has_connection: false,
            library,
            in_execution_context: true,
            has_data_flow: has_surrounding_data_flow(ctx),
            has_error_handling: has_enclosing_try(ctx),
        };

        let mut variables = BTreeSet::new();
        variables.insert(base.to_string());

        Some(RawMatch {
            kind: IdiomKind::Persistence,
            root: node,
            involved: vec![node],
            variables,
            functions: BTreeSet::new(),
            facts: MatchFacts::Persistence(facts),
        })
    }
}

/// Text of a string literal, or a template literal's quasis joined.
fn literal_text(node: &Node) -> Option<String> {
    match node {
        Node::StringLit { value, .. } => Some(value.clone()),
        Node::TemplateLit { quasis, .. } => Some(quasis.join(" ")),
        _ => None,
    }
}

/// An enclosing execution call (`db.query(…)`, `conn.execute(…)`), with the
/// library name when its client is a known library identifier.
struct ExecutionCall {
    library: Option<String>,
}

fn enclosing_execution_call(ctx: &TraversalContext<'_, '_>) -> Option<ExecutionCall> {
    ctx.ancestors.iter().rev().find_map(|a| {
        let Node::Call { callee, .. } = a else {
            return None;
        };
        match callee.as_ref() {
            Node::Member {
                object, property, ..
            } if EXEC_METHODS.contains(&property.as_str()) => {
                let library = base_identifier(object)
                    .filter(|b| LIBRARIES.contains(b))
                    .map(str::to_string);
                Some(ExecutionCall { library })
            }
            Node::Identifier { name, .. } if EXEC_METHODS.contains(&name.as_str()) => {
                Some(ExecutionCall { library: None })
            }
            _ => None,
        }
    })
}

/// The value participates in surrounding data flow: bound, assigned, or
/// returned.
fn has_surrounding_data_flow(ctx: &TraversalContext<'_, '_>) -> bool {
    ctx.ancestors.iter().rev().any(|a| {
        matches!(
            a,
            Node::Declarator { .. } | Node::Assign { .. } | Node::Return { .. }
        )
    })
}

fn has_enclosing_try(ctx: &TraversalContext<'_, '_>) -> bool {
    ctx.ancestors
        .iter()
        .rev()
        .any(|a| matches!(a, Node::Try { .. }))
}
