//! Helpers for building language trees over real source text.
//!
//! Ranges are located inside the document text, so diagnostics render
//! against exactly the source the tree stands for.

#![allow(dead_code)]

use decl_common::{
    Assignment, Block, DataStatement, Expr, FunctionCall, Literal, LiteralValue, LocalValue,
    PropertyAccess, TextRange, TextSize,
};

pub struct Doc {
    pub text: &'static str,
}

impl Doc {
    pub fn new(text: &'static str) -> Self {
        Doc { text }
    }

    /// Range of the `nth` (0-based) occurrence of `needle`.
    pub fn find(&self, needle: &str, nth: usize) -> TextRange {
        let (start, _) = self
            .text
            .match_indices(needle)
            .nth(nth)
            .unwrap_or_else(|| panic!("`{needle}` occurrence {nth} not in document"));
        TextRange::at(
            TextSize::from(start as u32),
            TextSize::from(needle.len() as u32),
        )
    }

    /// Range of the whole document.
    pub fn whole(&self) -> TextRange {
        TextRange::up_to(TextSize::from(self.text.len() as u32))
    }

    /// The document as a top-level block.
    pub fn root(&self, statements: Vec<DataStatement>) -> Block {
        Block::new(statements, self.whole())
    }
}

pub fn int(value: i32, range: TextRange) -> Expr {
    Expr::Literal(Literal {
        value: LiteralValue::Int(value),
        range,
    })
}

pub fn long(value: i64, range: TextRange) -> Expr {
    Expr::Literal(Literal {
        value: LiteralValue::Long(value),
        range,
    })
}

pub fn string(value: &str, range: TextRange) -> Expr {
    Expr::Literal(Literal {
        value: LiteralValue::String(value.to_string()),
        range,
    })
}

pub fn boolean(value: bool, range: TextRange) -> Expr {
    Expr::Literal(Literal {
        value: LiteralValue::Boolean(value),
        range,
    })
}

/// `name`
pub fn prop(name: &str, range: TextRange) -> PropertyAccess {
    PropertyAccess::implicit(name, range)
}

/// `receiver.name`
pub fn prop_on(receiver: Expr, name: &str, range: TextRange) -> PropertyAccess {
    PropertyAccess::on(receiver, name, range)
}

pub fn read(access: PropertyAccess) -> Expr {
    Expr::PropertyAccess(access)
}

/// `name(args)`
pub fn call(name: &str, args: Vec<Expr>, range: TextRange) -> FunctionCall {
    FunctionCall::implicit(name, args, range)
}

/// `receiver.name(args)`
pub fn call_on(receiver: Expr, name: &str, args: Vec<Expr>, range: TextRange) -> FunctionCall {
    FunctionCall::on(receiver, name, args, range)
}

/// `call { statements }`
pub fn configure(
    call: FunctionCall,
    statements: Vec<DataStatement>,
    range: TextRange,
) -> DataStatement {
    DataStatement::Expr(Expr::FunctionCall(call.with_block(Block::new(statements, range))))
}

pub fn stmt(call: FunctionCall) -> DataStatement {
    DataStatement::Expr(Expr::FunctionCall(call))
}

/// `lhs = rhs`
pub fn assign(lhs: PropertyAccess, rhs: Expr) -> DataStatement {
    let range = lhs.range.cover(rhs.range());
    DataStatement::Assignment(Assignment { lhs, rhs, range })
}

/// `val name = rhs`
pub fn local(name: &str, rhs: Expr, range: TextRange) -> DataStatement {
    DataStatement::LocalValue(LocalValue {
        name: name.to_string(),
        rhs,
        range,
    })
}
