//! The closed syntax tree union.
//!
//! One variant per syntactic form of the JavaScript-like source language the
//! engine inspects. The set is deliberately closed: [`Node::children`]
//! enumerates every structural child field explicitly, in field-declaration
//! order, so traversal order is exhaustively checkable instead of depending
//! on runtime property discovery. Forms outside the closed set arrive as
//! [`Node::Unknown`] and still participate in traversal.

use serde::{Deserialize, Serialize};

use crate::span::Span;

/// A structural child field: either a single node or an ordered list.
#[derive(Debug, Clone, Copy)]
pub enum Child<'a> {
    /// A field holding exactly one child node.
    One(&'a Node),
    /// A field holding an ordered list of child nodes.
    Many(&'a [Node]),
}

/// A node in the parsed syntax tree.
///
/// Every variant carries a [`Span`]; parsers without position tracking use
/// `Span::default()`. String-valued fields (`name`, `property`, `op`, …) are
/// lexical atoms, not child nodes, and are not visited during traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Top-level source unit.
    Program { body: Vec<Node>, span: Span },
    /// `function name(params) { body }`
    FunctionDecl {
        name: String,
        params: Vec<Node>,
        body: Box<Node>,
        is_async: bool,
        span: Span,
    },
    /// Function literal: anonymous, named, or arrow form.
    FunctionExpr {
        name: Option<String>,
        params: Vec<Node>,
        body: Box<Node>,
        is_arrow: bool,
        is_async: bool,
        span: Span,
    },
    /// `{ statements }`
    Block { body: Vec<Node>, span: Span },
    /// `const/let/var declarators`
    VariableDecl { declarators: Vec<Node>, span: Span },
    /// One `target = init` binding inside a variable declaration.
    Declarator {
        target: Box<Node>,
        init: Option<Box<Node>>,
        span: Span,
    },
    /// Array destructuring target: `[a, b]`.
    ArrayPattern { elements: Vec<Node>, span: Span },
    /// Object destructuring target: `{ a, b }`. Property names only.
    ObjectPattern { properties: Vec<String>, span: Span },
    /// A bare name reference.
    Identifier { name: String, span: Span },
    /// String literal.
    StringLit { value: String, span: Span },
    /// Template literal: interleaved quasis and interpolated expressions.
    TemplateLit {
        quasis: Vec<String>,
        exprs: Vec<Node>,
        span: Span,
    },
    /// Numeric literal.
    NumberLit { value: f64, span: Span },
    /// Object literal.
    ObjectLit { properties: Vec<Node>, span: Span },
    /// One `key: value` property inside an object literal.
    ObjectProp {
        key: String,
        value: Box<Node>,
        span: Span,
    },
    /// `callee(args)`
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
        span: Span,
    },
    /// `object.property`
    Member {
        object: Box<Node>,
        property: String,
        span: Span,
    },
    /// Prefix unary operation, e.g. `-1`, `!x`.
    Unary {
        op: String,
        operand: Box<Node>,
        span: Span,
    },
    /// Increment/decrement: `++x`, `x--`.
    Update {
        op: String,
        prefix: bool,
        operand: Box<Node>,
        span: Span,
    },
    /// Binary operation, e.g. `a + 1`.
    Binary {
        op: String,
        left: Box<Node>,
        right: Box<Node>,
        span: Span,
    },
    /// Assignment expression.
    Assign {
        target: Box<Node>,
        value: Box<Node>,
        span: Span,
    },
    /// `return value?`
    Return {
        value: Option<Box<Node>>,
        span: Span,
    },
    /// Expression used as a statement.
    ExprStmt { expr: Box<Node>, span: Span },
    /// `if (test) consequent else alternate?`
    If {
        test: Box<Node>,
        consequent: Box<Node>,
        alternate: Option<Box<Node>>,
        span: Span,
    },
    /// `try { block } catch? finally?`
    Try {
        block: Box<Node>,
        handler: Option<Box<Node>>,
        finalizer: Option<Box<Node>>,
        span: Span,
    },
    /// `catch (param?) { body }`
    CatchClause {
        param: Option<String>,
        body: Box<Node>,
        span: Span,
    },
    /// `await operand`
    Await { operand: Box<Node>, span: Span },
    /// Markup-producing expression: `<tag attrs>children</tag>`.
    Element {
        tag: String,
        attributes: Vec<Node>,
        children: Vec<Node>,
        span: Span,
    },
    /// One markup attribute: `name={value}` or bare `name`.
    Attribute {
        name: String,
        value: Option<Box<Node>>,
        span: Span,
    },
    /// `class name extends superclass? { body }`
    ClassDecl {
        name: String,
        superclass: Option<String>,
        body: Vec<Node>,
        span: Span,
    },
    /// A method inside a class body.
    Method {
        name: String,
        params: Vec<Node>,
        body: Box<Node>,
        span: Span,
    },
    /// A field inside a class body.
    Property {
        name: String,
        value: Option<Box<Node>>,
        span: Span,
    },
    /// Escape hatch for syntactic forms outside the closed set.
    Unknown {
        #[serde(rename = "unknown_kind")]
        kind: String,
        children: Vec<Node>,
        span: Span,
    },
}

impl Node {
    /// The kind tag of this node.
    ///
    /// For [`Node::Unknown`] this is the parser-supplied tag.
    pub fn kind(&self) -> &str {
        match self {
            Node::Program { .. } => "program",
            Node::FunctionDecl { .. } => "function_decl",
            Node::FunctionExpr { .. } => "function_expr",
            Node::Block { .. } => "block",
            Node::VariableDecl { .. } => "variable_decl",
            Node::Declarator { .. } => "declarator",
            Node::ArrayPattern { .. } => "array_pattern",
            Node::ObjectPattern { .. } => "object_pattern",
            Node::Identifier { .. } => "identifier",
            Node::StringLit { .. } => "string_lit",
            Node::TemplateLit { .. } => "template_lit",
            Node::NumberLit { .. } => "number_lit",
            Node::ObjectLit { .. } => "object_lit",
            Node::ObjectProp { .. } => "object_prop",
            Node::Call { .. } => "call",
            Node::Member { .. } => "member",
            Node::Unary { .. } => "unary",
            Node::Update { .. } => "update",
            Node::Binary { .. } => "binary",
            Node::Assign { .. } => "assign",
            Node::Return { .. } => "return",
            Node::ExprStmt { .. } => "expr_stmt",
            Node::If { .. } => "if",
            Node::Try { .. } => "try",
            Node::CatchClause { .. } => "catch_clause",
            Node::Await { .. } => "await",
            Node::Element { .. } => "element",
            Node::Attribute { .. } => "attribute",
            Node::ClassDecl { .. } => "class_decl",
            Node::Method { .. } => "method",
            Node::Property { .. } => "property",
            Node::Unknown { kind, .. } => kind,
        }
    }

    /// The source span of this node.
    pub fn span(&self) -> Span {
        match self {
            Node::Program { span, .. }
            | Node::FunctionDecl { span, .. }
            | Node::FunctionExpr { span, .. }
            | Node::Block { span, .. }
            | Node::VariableDecl { span, .. }
            | Node::Declarator { span, .. }
            | Node::ArrayPattern { span, .. }
            | Node::ObjectPattern { span, .. }
            | Node::Identifier { span, .. }
            | Node::StringLit { span, .. }
            | Node::TemplateLit { span, .. }
            | Node::NumberLit { span, .. }
            | Node::ObjectLit { span, .. }
            | Node::ObjectProp { span, .. }
            | Node::Call { span, .. }
            | Node::Member { span, .. }
            | Node::Unary { span, .. }
            | Node::Update { span, .. }
            | Node::Binary { span, .. }
            | Node::Assign { span, .. }
            | Node::Return { span, .. }
            | Node::ExprStmt { span, .. }
            | Node::If { span, .. }
            | Node::Try { span, .. }
            | Node::CatchClause { span, .. }
            | Node::Await { span, .. }
            | Node::Element { span, .. }
            | Node::Attribute { span, .. }
            | Node::ClassDecl { span, .. }
            | Node::Method { span, .. }
            | Node::Property { span, .. }
            | Node::Unknown { span, .. } => *span,
        }
    }

    /// The name this node declares or labels, when one exists.
    ///
    /// For destructuring declarators this is the first bound identifier.
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            Node::FunctionDecl { name, .. }
            | Node::ClassDecl { name, .. }
            | Node::Method { name, .. }
            | Node::Property { name, .. }
            | Node::Attribute { name, .. }
            | Node::Identifier { name, .. } => Some(name),
            Node::FunctionExpr { name, .. } => name.as_deref(),
            Node::ObjectProp { key, .. } => Some(key),
            Node::Element { tag, .. } => Some(tag),
            Node::Declarator { target, .. } => match target.as_ref() {
                Node::Identifier { name, .. } => Some(name),
                Node::ArrayPattern { elements, .. } => {
                    elements.iter().find_map(|e| e.declared_name())
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Structural child fields in field-declaration order.
    ///
    /// Absent optional fields contribute nothing. The `(name, child)` pairs
    /// define the canonical traversal order for the whole crate.
    pub fn children(&self) -> Vec<(&'static str, Child<'_>)> {
        match self {
            Node::Program { body, .. } => vec![("body", Child::Many(body))],
            Node::FunctionDecl { params, body, .. } => {
                vec![("params", Child::Many(params)), ("body", Child::One(body))]
            }
            Node::FunctionExpr { params, body, .. } => {
                vec![("params", Child::Many(params)), ("body", Child::One(body))]
            }
            Node::Block { body, .. } => vec![("body", Child::Many(body))],
            Node::VariableDecl { declarators, .. } => {
                vec![("declarators", Child::Many(declarators))]
            }
            Node::Declarator { target, init, .. } => {
                let mut fields = vec![("target", Child::One(target))];
                if let Some(init) = init {
                    fields.push(("init", Child::One(init)));
                }
                fields
            }
            Node::ArrayPattern { elements, .. } => vec![("elements", Child::Many(elements))],
            Node::ObjectPattern { .. } => Vec::new(),
            Node::Identifier { .. }
            | Node::StringLit { .. }
            | Node::NumberLit { .. } => Vec::new(),
            Node::TemplateLit { exprs, .. } => vec![("exprs", Child::Many(exprs))],
            Node::ObjectLit { properties, .. } => vec![("properties", Child::Many(properties))],
            Node::ObjectProp { value, .. } => vec![("value", Child::One(value))],
            Node::Call { callee, args, .. } => {
                vec![("callee", Child::One(callee)), ("args", Child::Many(args))]
            }
            Node::Member { object, .. } => vec![("object", Child::One(object))],
            Node::Unary { operand, .. } | Node::Update { operand, .. } => {
                vec![("operand", Child::One(operand))]
            }
            Node::Binary { left, right, .. } => {
                vec![("left", Child::One(left)), ("right", Child::One(right))]
            }
            Node::Assign { target, value, .. } => {
                vec![("target", Child::One(target)), ("value", Child::One(value))]
            }
            Node::Return { value, .. } => match value {
                Some(value) => vec![("value", Child::One(value))],
                None => Vec::new(),
            },
            Node::ExprStmt { expr, .. } => vec![("expr", Child::One(expr))],
            Node::If {
                test,
                consequent,
                alternate,
                ..
            } => {
                let mut fields = vec![
                    ("test", Child::One(test)),
                    ("consequent", Child::One(consequent)),
                ];
                if let Some(alternate) = alternate {
                    fields.push(("alternate", Child::One(alternate)));
                }
                fields
            }
            Node::Try {
                block,
                handler,
                finalizer,
                ..
            } => {
                let mut fields = vec![("block", Child::One(block))];
                if let Some(handler) = handler {
                    fields.push(("handler", Child::One(handler)));
                }
                if let Some(finalizer) = finalizer {
                    fields.push(("finalizer", Child::One(finalizer)));
                }
                fields
            }
            Node::CatchClause { body, .. } => vec![("body", Child::One(body))],
            Node::Await { operand, .. } => vec![("operand", Child::One(operand))],
            Node::Element {
                attributes,
                children,
                ..
            } => vec![
                ("attributes", Child::Many(attributes)),
                ("children", Child::Many(children)),
            ],
            Node::Attribute { value, .. } => match value {
                Some(value) => vec![("value", Child::One(value))],
                None => Vec::new(),
            },
            Node::ClassDecl { body, .. } => vec![("body", Child::Many(body))],
            Node::Method { params, body, .. } => {
                vec![("params", Child::Many(params)), ("body", Child::One(body))]
            }
            Node::Property { value, .. } => match value {
                Some(value) => vec![("value", Child::One(value))],
                None => Vec::new(),
            },
            Node::Unknown { children, .. } => vec![("children", Child::Many(children))],
        }
    }

    /// Pre-order iterator over this node and its whole subtree, following
    /// the same field order as [`Node::children`].
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// True for function declarations and function literals.
    pub fn is_function(&self) -> bool {
        matches!(
            self,
            Node::FunctionDecl { .. } | Node::FunctionExpr { .. }
        )
    }

    /// The body of a function-like node (declaration, literal, or method).
    pub fn function_body(&self) -> Option<&Node> {
        match self {
            Node::FunctionDecl { body, .. }
            | Node::FunctionExpr { body, .. }
            | Node::Method { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The identifier name, if this node is a bare identifier.
    pub fn identifier_name(&self) -> Option<&str> {
        match self {
            Node::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Iterator state for [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push in reverse so the first-declared field pops first.
        for (_, child) in node.children().into_iter().rev() {
            match child {
                Child::One(c) => self.stack.push(c),
                Child::Many(cs) => self.stack.extend(cs.iter().rev()),
            }
        }
        Some(node)
    }
}
