//! Typed language tree for configuration documents.
//!
//! Covers the statement and expression forms the analyzer resolves:
//! assignments, local values, literals, `null`, `this`, property accesses
//! and function calls with an optional trailing configure block.

use std::fmt;

use rowan::TextRange;

// ── Blocks and statements ────────────────────────────────────────────────

/// A sequence of statements: either the whole document or the body of a
/// configure block such as `inner { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<DataStatement>,
    pub range: TextRange,
}

impl Block {
    pub fn new(statements: Vec<DataStatement>, range: TextRange) -> Self {
        Block { statements, range }
    }
}

/// A statement inside a block.
#[derive(Debug, Clone, PartialEq)]
pub enum DataStatement {
    /// `lhs = rhs` where `lhs` is a property access.
    Assignment(Assignment),
    /// `val name = rhs`
    LocalValue(LocalValue),
    /// An expression used as a statement, usually a function call.
    Expr(Expr),
}

impl DataStatement {
    pub fn range(&self) -> TextRange {
        match self {
            DataStatement::Assignment(assignment) => assignment.range,
            DataStatement::LocalValue(local) => local.range,
            DataStatement::Expr(expr) => expr.range(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub lhs: PropertyAccess,
    pub rhs: Expr,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalValue {
    pub name: String,
    pub rhs: Expr,
    pub range: TextRange,
}

// ── Expressions ──────────────────────────────────────────────────────────

/// Any expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Null(TextRange),
    This(TextRange),
    PropertyAccess(PropertyAccess),
    FunctionCall(FunctionCall),
}

impl Expr {
    pub fn range(&self) -> TextRange {
        match self {
            Expr::Literal(literal) => literal.range,
            Expr::Null(range) | Expr::This(range) => *range,
            Expr::PropertyAccess(access) => access.range,
            Expr::FunctionCall(call) => call.range,
        }
    }
}

/// A literal constant value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    Int(i32),
    Long(i64),
    String(String),
    Boolean(bool),
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(v) => write!(f, "{v}"),
            LiteralValue::Long(v) => write!(f, "{v}L"),
            LiteralValue::String(v) => write!(f, "{v:?}"),
            LiteralValue::Boolean(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: LiteralValue,
    pub range: TextRange,
}

/// `name` or `receiver.name`.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAccess {
    pub receiver: Option<Box<Expr>>,
    pub name: String,
    pub range: TextRange,
}

impl PropertyAccess {
    /// An unqualified access resolved against the receivers in scope.
    pub fn implicit(name: impl Into<String>, range: TextRange) -> Self {
        PropertyAccess {
            receiver: None,
            name: name.into(),
            range,
        }
    }

    /// An access through an explicit receiver expression.
    pub fn on(receiver: Expr, name: impl Into<String>, range: TextRange) -> Self {
        PropertyAccess {
            receiver: Some(Box::new(receiver)),
            name: name.into(),
            range,
        }
    }
}

/// `name(args)`, `receiver.name(args)`, optionally followed by a
/// configure block: `name(args) { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub receiver: Option<Box<Expr>>,
    pub name: String,
    pub args: Vec<Expr>,
    pub configure_block: Option<Block>,
    pub range: TextRange,
}

impl FunctionCall {
    pub fn implicit(name: impl Into<String>, args: Vec<Expr>, range: TextRange) -> Self {
        FunctionCall {
            receiver: None,
            name: name.into(),
            args,
            configure_block: None,
            range,
        }
    }

    pub fn on(receiver: Expr, name: impl Into<String>, args: Vec<Expr>, range: TextRange) -> Self {
        FunctionCall {
            receiver: Some(Box::new(receiver)),
            name: name.into(),
            args,
            configure_block: None,
            range,
        }
    }

    /// Attach a trailing configure block.
    pub fn with_block(mut self, block: Block) -> Self {
        self.configure_block = Some(block);
        self
    }
}

// ── Element view ─────────────────────────────────────────────────────────

/// A borrowed view of a tree element that can serve as an error site.
#[derive(Debug, Clone, Copy)]
pub enum LanguageTreeElement<'a> {
    Statement(&'a DataStatement),
    PropertyAccess(&'a PropertyAccess),
    FunctionCall(&'a FunctionCall),
}

impl LanguageTreeElement<'_> {
    pub fn range(&self) -> TextRange {
        match self {
            LanguageTreeElement::Statement(statement) => statement.range(),
            LanguageTreeElement::PropertyAccess(access) => access.range,
            LanguageTreeElement::FunctionCall(call) => call.range,
        }
    }
}
