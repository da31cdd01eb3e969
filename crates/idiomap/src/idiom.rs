//! Idiom records: the structured, confidence-accepted output of recognition.
//!
//! A matcher's raw match is converted into exactly one [`IdiomRecord`]:
//! typed internal nodes, labeled connections between them, and metadata
//! carrying the confidence score plus per-idiom facts. Records are immutable
//! after creation and live only for one recognition run.
//!
//! Per-idiom metadata is a closed tagged union ([`MatchFacts`]) rather than
//! an open string-keyed map, so every fact a matcher can report is a typed,
//! exhaustively-matchable field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use idiomap_syntax::Span;

// ============================================================================
// Idiom kinds
// ============================================================================

/// The closed set of idioms the built-in matchers recognize.
///
/// New idiom kinds require a new variant here plus a matcher implementation;
/// the walker, registry, converter, and mapper need no changes beyond the
/// mapper's default fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdiomKind {
    /// Stateful counter: state pair + event handler + increment.
    Counter,
    /// Outbound network call (fetch-style or client-method-style).
    NetworkCall,
    /// Persistence operation: SQL text, connection setup, or ORM call.
    Persistence,
    /// Error-handling block.
    ErrorHandling,
    /// UI component definition (function or class form).
    ComponentDefinition,
}

impl IdiomKind {
    /// Stable string form used in ids and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdiomKind::Counter => "counter",
            IdiomKind::NetworkCall => "network_call",
            IdiomKind::Persistence => "persistence",
            IdiomKind::ErrorHandling => "error_handling",
            IdiomKind::ComponentDefinition => "component_definition",
        }
    }
}

impl std::fmt::Display for IdiomKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Per-idiom facts
// ============================================================================

/// Typed per-idiom facts, one variant per [`IdiomKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "idiom", rename_all = "snake_case")]
pub enum MatchFacts {
    Counter(CounterFacts),
    NetworkCall(NetworkFacts),
    Persistence(PersistenceFacts),
    ErrorHandling(ErrorHandlingFacts),
    ComponentDefinition(ComponentFacts),
}

impl MatchFacts {
    /// The idiom kind these facts belong to.
    pub fn kind(&self) -> IdiomKind {
        match self {
            MatchFacts::Counter(_) => IdiomKind::Counter,
            MatchFacts::NetworkCall(_) => IdiomKind::NetworkCall,
            MatchFacts::Persistence(_) => IdiomKind::Persistence,
            MatchFacts::ErrorHandling(_) => IdiomKind::ErrorHandling,
            MatchFacts::ComponentDefinition(_) => IdiomKind::ComponentDefinition,
        }
    }
}

/// Signals extracted for a stateful-counter idiom.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CounterFacts {
    /// Name of the enclosing component function, when declared.
    pub component: Option<String>,
    /// The state variable of the first state pair.
    pub state_var: Option<String>,
    /// The setter of the first state pair.
    pub setter: Option<String>,
    /// A two-element state-pair initializer call was found.
    pub has_state_init: bool,
    /// A click-style event-handler binding was found.
    pub has_event_handler: bool,
    /// The initial state value is a numeric literal (or unary minus of one).
    pub is_numeric_initial: bool,
    /// The setter is called in an increment/decrement shape.
    pub has_increment_operation: bool,
    /// A state-pair name matches the counter vocabulary.
    pub has_counter_like_names: bool,
    /// Handler attribute names, in markup order.
    pub handlers: Vec<String>,
}

/// Signals extracted for a network-call idiom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkFacts {
    /// The client identifier the call was made through (`fetch`, `axios`, …).
    pub client: String,
    /// Request target, when extractable.
    pub endpoint: Option<String>,
    /// The endpoint depends on runtime values (template/identifier form).
    pub endpoint_dynamic: bool,
    /// Resolved HTTP method, defaulting to `GET`.
    pub http_method: String,
    /// The method was stated explicitly or derived from a client method name
    /// (as opposed to the bare default).
    pub method_known: bool,
    /// A request payload was supplied.
    pub has_payload: bool,
    /// `.then` chaining or equivalent success handling was observed.
    pub has_success_handling: bool,
    /// `.catch` chaining or an enclosing try/catch was observed.
    pub has_error_handling: bool,
    /// `.finally` chaining was observed.
    pub has_finally: bool,
    /// Named success handlers, innermost first.
    pub success_handlers: Vec<String>,
    /// Named error handlers (chained handler or catch binding).
    pub error_handlers: Vec<String>,
}

impl Default for NetworkFacts {
    fn default() -> Self {
        NetworkFacts {
            client: String::new(),
            endpoint: None,
            endpoint_dynamic: false,
            http_method: "GET".to_string(),
            method_known: false,
            has_payload: false,
            has_success_handling: false,
            has_error_handling: false,
            has_finally: false,
            success_handlers: Vec::new(),
            error_handlers: Vec::new(),
        }
    }
}

/// How confidently a persistence library was identified.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "source", content = "name", rename_all = "snake_case")]
pub enum LibraryIdentity {
    /// Matched a known library vocabulary entry.
    Known(String),
    /// Inferred generically (e.g. "some SQL library" from SQL text alone).
    Inferred,
    /// No library signal at all.
    #[default]
    Unknown,
}

impl LibraryIdentity {
    /// True only for vocabulary-confirmed libraries.
    pub fn is_known(&self) -> bool {
        matches!(self, LibraryIdentity::Known(_))
    }
}

/// Signals extracted for a persistence-operation idiom.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersistenceFacts {
    /// Operation type: `select`, `insert`, `update`, `delete`, `create`,
    /// `drop`, `alter`.
    pub operation_type: Option<String>,
    /// Table names referenced by the SQL text, deduplicated in order.
    pub tables: Vec<String>,
    /// A SQL operation (literal keyword or recognized ORM method) was
    /// confirmed.
    pub sql_confirmed: bool,
    /// The match is an ORM method call rather than SQL text.
    pub is_orm_call: bool,
    /// A connection/pool-establishing call was observed.
    pub has_connection: bool,
    /// Library identification.
    pub library: LibraryIdentity,
    /// The operation sits inside a query-execution call.
    pub in_execution_context: bool,
    /// The result participates in surrounding data flow (bound, assigned,
    /// or returned).
    pub has_data_flow: bool,
    /// An enclosing error-handling block was observed.
    pub has_error_handling: bool,
}

/// Signals extracted for an error-handling idiom.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ErrorHandlingFacts {
    /// A try/catch statement (or handler registration) was confirmed.
    pub confirmed: bool,
    /// Name bound to the caught error, when present.
    pub caught_binding: Option<String>,
    /// A `finally` block is present.
    pub has_finally: bool,
    /// The handler body contains at least one statement.
    pub has_handler_body: bool,
    /// The match is a global unhandled-rejection listener registration.
    pub is_global_listener: bool,
    /// The listened-for event name for listener-form matches.
    pub listener_event: Option<String>,
}

/// Signals extracted for a component-definition idiom.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentFacts {
    /// Component name, when declared or bound.
    pub name: Option<String>,
    /// True for the class form.
    pub is_class: bool,
    /// State variables from state-pair initializations.
    pub state_vars: Vec<String>,
    /// Names of effect-style calls (`use` prefix + capitalized word).
    pub effect_calls: Vec<String>,
    /// Parameter-derived input names.
    pub props: Vec<String>,
    /// Capitalized nested element tags (child component references).
    pub child_components: Vec<String>,
    /// Declared lifecycle method names (class form).
    pub lifecycle_methods: Vec<String>,
    /// Constructor-assigned state field names (class form).
    pub state_fields: Vec<String>,
}

impl ComponentFacts {
    /// Any state or effect usage at all, in either component form.
    pub fn has_state_or_effect(&self) -> bool {
        !self.state_vars.is_empty()
            || !self.effect_calls.is_empty()
            || !self.state_fields.is_empty()
    }
}

// ============================================================================
// Idiom records
// ============================================================================

/// Role a node plays inside an idiom graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdiomNodeKind {
    Trigger,
    Counter,
    Network,
    Store,
    Person,
    BuildingBlock,
    Fault,
    Behavior,
    Value,
}

/// Kind of a connection between two idiom nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdiomConnectionKind {
    DataFlow,
    ControlFlow,
    Event,
    ErrorPath,
    SuccessPath,
}

/// Complexity bucket computed from node/variable/function counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    /// Bucket a weighted structure count: `nodes + 2*variables + 3*functions`.
    pub fn from_weighted_count(count: usize) -> Self {
        match count {
            0..=5 => Complexity::Simple,
            6..=15 => Complexity::Medium,
            _ => Complexity::Complex,
        }
    }
}

/// One typed node inside an idiom graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdiomNode {
    /// Deterministic id: `idiom-{record}-node-{index}`.
    pub id: String,
    pub kind: IdiomNodeKind,
    pub label: String,
    pub source_span: Span,
    /// Open auxiliary properties (tree kind tag, role hints).
    pub properties: Map<String, Value>,
}

/// A labeled connection between two nodes of the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdiomConnection {
    /// Deterministic id: `idiom-{record}-conn-{index}`.
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub kind: IdiomConnectionKind,
    pub label: Option<String>,
    pub properties: Map<String, Value>,
}

/// Metadata attached to one idiom record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdiomMetadata {
    /// Matcher confidence, always in `[0.0, 1.0]` and at or above the
    /// registry threshold.
    pub confidence: f64,
    /// Span of the match root.
    pub source_span: Span,
    /// Variable names the match involves, sorted.
    pub variables: Vec<String>,
    /// Function names the match involves, sorted.
    pub functions: Vec<String>,
    pub complexity: Complexity,
    /// Source text around the match root (±50 bytes, clipped).
    pub context_snippet: String,
    /// Typed per-idiom facts.
    pub facts: MatchFacts,
}

/// A confidence-accepted, structurally converted idiom occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdiomRecord {
    /// Deterministic id: `idiom-{record}`.
    pub id: String,
    pub kind: IdiomKind,
    pub nodes: Vec<IdiomNode>,
    pub connections: Vec<IdiomConnection>,
    pub metadata: IdiomMetadata,
}
