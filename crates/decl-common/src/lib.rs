//! Shared types for the declarative configuration analyzer.
//!
//! The analyzer does not parse source text. An external parser produces the
//! typed language tree defined in [`tree`], and every element carries the
//! `TextRange` it was parsed from so errors can point back into the source.

pub mod tree;

pub use rowan::{TextRange, TextSize};
pub use tree::{
    Assignment, Block, DataStatement, Expr, FunctionCall, LanguageTreeElement, Literal,
    LiteralValue, LocalValue, PropertyAccess,
};
