//! Constructor helpers for assembling trees by hand.
//!
//! External parsers usually build [`Node`] values directly; these helpers
//! keep hand-written trees (fixtures, adapter glue) readable. Every
//! constructor uses `Span::default()`; attach real positions with
//! [`with_span`].

use crate::node::Node;
use crate::span::Span;

/// Replace the span of a node, returning it.
pub fn with_span(mut node: Node, span: Span) -> Node {
    match &mut node {
        Node::Program { span: s, .. }
        | Node::FunctionDecl { span: s, .. }
        | Node::FunctionExpr { span: s, .. }
        | Node::Block { span: s, .. }
        | Node::VariableDecl { span: s, .. }
        | Node::Declarator { span: s, .. }
        | Node::ArrayPattern { span: s, .. }
        | Node::ObjectPattern { span: s, .. }
        | Node::Identifier { span: s, .. }
        | Node::StringLit { span: s, .. }
        | Node::TemplateLit { span: s, .. }
        | Node::NumberLit { span: s, .. }
        | Node::ObjectLit { span: s, .. }
        | Node::ObjectProp { span: s, .. }
        | Node::Call { span: s, .. }
        | Node::Member { span: s, .. }
        | Node::Unary { span: s, .. }
        | Node::Update { span: s, .. }
        | Node::Binary { span: s, .. }
        | Node::Assign { span: s, .. }
        | Node::Return { span: s, .. }
        | Node::ExprStmt { span: s, .. }
        | Node::If { span: s, .. }
        | Node::Try { span: s, .. }
        | Node::CatchClause { span: s, .. }
        | Node::Await { span: s, .. }
        | Node::Element { span: s, .. }
        | Node::Attribute { span: s, .. }
        | Node::ClassDecl { span: s, .. }
        | Node::Method { span: s, .. }
        | Node::Property { span: s, .. }
        | Node::Unknown { span: s, .. } => *s = span,
    }
    node
}

/// Top-level source unit.
pub fn program(body: Vec<Node>) -> Node {
    Node::Program {
        body,
        span: Span::default(),
    }
}

/// A bare identifier.
pub fn ident(name: &str) -> Node {
    Node::Identifier {
        name: name.to_string(),
        span: Span::default(),
    }
}

/// A string literal.
pub fn string(value: &str) -> Node {
    Node::StringLit {
        value: value.to_string(),
        span: Span::default(),
    }
}

/// A numeric literal.
pub fn number(value: f64) -> Node {
    Node::NumberLit {
        value,
        span: Span::default(),
    }
}

/// A template literal. `quasis` must be one longer than `exprs`.
pub fn template(quasis: &[&str], exprs: Vec<Node>) -> Node {
    Node::TemplateLit {
        quasis: quasis.iter().map(|q| q.to_string()).collect(),
        exprs,
        span: Span::default(),
    }
}

/// `callee(args)`
pub fn call(callee: Node, args: Vec<Node>) -> Node {
    Node::Call {
        callee: Box::new(callee),
        args,
        span: Span::default(),
    }
}

/// `object.property`
pub fn member(object: Node, property: &str) -> Node {
    Node::Member {
        object: Box::new(object),
        property: property.to_string(),
        span: Span::default(),
    }
}

/// `function name(params) { body }`
pub fn func_decl(name: &str, params: Vec<Node>, body: Node) -> Node {
    Node::FunctionDecl {
        name: name.to_string(),
        params,
        body: Box::new(body),
        is_async: false,
        span: Span::default(),
    }
}

/// Async variant of [`func_decl`].
pub fn async_func_decl(name: &str, params: Vec<Node>, body: Node) -> Node {
    Node::FunctionDecl {
        name: name.to_string(),
        params,
        body: Box::new(body),
        is_async: true,
        span: Span::default(),
    }
}

/// An arrow function literal.
pub fn arrow(params: Vec<Node>, body: Node) -> Node {
    Node::FunctionExpr {
        name: None,
        params,
        body: Box::new(body),
        is_arrow: true,
        is_async: false,
        span: Span::default(),
    }
}

/// `{ statements }`
pub fn block(body: Vec<Node>) -> Node {
    Node::Block {
        body,
        span: Span::default(),
    }
}

/// `const name = init`
pub fn var(name: &str, init: Node) -> Node {
    Node::VariableDecl {
        declarators: vec![Node::Declarator {
            target: Box::new(ident(name)),
            init: Some(Box::new(init)),
            span: Span::default(),
        }],
        span: Span::default(),
    }
}

/// `const [a, b] = init`
pub fn array_binding(names: &[&str], init: Node) -> Node {
    Node::VariableDecl {
        declarators: vec![Node::Declarator {
            target: Box::new(Node::ArrayPattern {
                elements: names.iter().map(|n| ident(n)).collect(),
                span: Span::default(),
            }),
            init: Some(Box::new(init)),
            span: Span::default(),
        }],
        span: Span::default(),
    }
}

/// Expression statement.
pub fn expr_stmt(expr: Node) -> Node {
    Node::ExprStmt {
        expr: Box::new(expr),
        span: Span::default(),
    }
}

/// `return value`
pub fn ret(value: Node) -> Node {
    Node::Return {
        value: Some(Box::new(value)),
        span: Span::default(),
    }
}

/// Prefix unary operation.
pub fn unary(op: &str, operand: Node) -> Node {
    Node::Unary {
        op: op.to_string(),
        operand: Box::new(operand),
        span: Span::default(),
    }
}

/// Binary operation.
pub fn binary(op: &str, left: Node, right: Node) -> Node {
    Node::Binary {
        op: op.to_string(),
        left: Box::new(left),
        right: Box::new(right),
        span: Span::default(),
    }
}

/// Increment/decrement expression.
pub fn update(op: &str, prefix: bool, operand: Node) -> Node {
    Node::Update {
        op: op.to_string(),
        prefix,
        operand: Box::new(operand),
        span: Span::default(),
    }
}

/// Assignment expression.
pub fn assign(target: Node, value: Node) -> Node {
    Node::Assign {
        target: Box::new(target),
        value: Box::new(value),
        span: Span::default(),
    }
}

/// `await operand`
pub fn awaited(operand: Node) -> Node {
    Node::Await {
        operand: Box::new(operand),
        span: Span::default(),
    }
}

/// `try { block } catch? finally?`
pub fn try_stmt(block: Node, handler: Option<Node>, finalizer: Option<Node>) -> Node {
    Node::Try {
        block: Box::new(block),
        handler: handler.map(Box::new),
        finalizer: finalizer.map(Box::new),
        span: Span::default(),
    }
}

/// `catch (param?) { body }`
pub fn catch(param: Option<&str>, body: Node) -> Node {
    Node::CatchClause {
        param: param.map(|p| p.to_string()),
        body: Box::new(body),
        span: Span::default(),
    }
}

/// Markup element.
pub fn element(tag: &str, attributes: Vec<Node>, children: Vec<Node>) -> Node {
    Node::Element {
        tag: tag.to_string(),
        attributes,
        children,
        span: Span::default(),
    }
}

/// Markup attribute with a value.
pub fn attr(name: &str, value: Node) -> Node {
    Node::Attribute {
        name: name.to_string(),
        value: Some(Box::new(value)),
        span: Span::default(),
    }
}

/// Object literal from `(key, value)` pairs.
pub fn object(props: Vec<(&str, Node)>) -> Node {
    Node::ObjectLit {
        properties: props
            .into_iter()
            .map(|(key, value)| Node::ObjectProp {
                key: key.to_string(),
                value: Box::new(value),
                span: Span::default(),
            })
            .collect(),
        span: Span::default(),
    }
}

/// `class name extends superclass? { body }`
pub fn class_decl(name: &str, superclass: Option<&str>, body: Vec<Node>) -> Node {
    Node::ClassDecl {
        name: name.to_string(),
        superclass: superclass.map(|s| s.to_string()),
        body,
        span: Span::default(),
    }
}

/// A class method.
pub fn method(name: &str, params: Vec<Node>, body: Node) -> Node {
    Node::Method {
        name: name.to_string(),
        params,
        body: Box::new(body),
        span: Span::default(),
    }
}

/// Object destructuring pattern (parameter position).
pub fn object_pattern(properties: &[&str]) -> Node {
    Node::ObjectPattern {
        properties: properties.iter().map(|p| p.to_string()).collect(),
        span: Span::default(),
    }
}
