//! Resolution errors.
//!
//! Errors are recorded against the tree element they were found at and
//! accumulated in the analysis context. Recording one never stops the pass,
//! so a single run reports every independent problem in a document.

use std::fmt;

use rowan::TextRange;

use decl_schema::DataType;

/// Why an element failed to resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorReason {
    /// A member restricted to the current receiver was reached through an
    /// explicit receiver or through an outer scope.
    AccessOnCurrentReceiverOnlyViolation,
    /// A name matched no local value, property or external object.
    UnresolvedReference { name: String },
    /// No function with this name accepts the given arguments.
    UnresolvedFunctionCall { name: String, arg_count: usize },
    /// The assigned value's type is not assignable to the property type.
    AssignmentTypeMismatch { expected: DataType, actual: DataType },
    /// Assignment to a property declared read-only.
    ReadOnlyPropertyAssignment { property: String },
    /// A second `val` with the same name in one block.
    DuplicateLocalValue { name: String },
    /// A configuring function was called without a block.
    MissingConfigureBlock { function: String },
    /// A block was passed to a function that does not configure anything.
    UnexpectedConfigureBlock { function: String },
    /// A member was accessed on a value that is not a schema object.
    NotAnObject { ty: DataType },
}

/// A resolution error: a reason recorded at a tree element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionError {
    pub site: TextRange,
    pub reason: ErrorReason,
}

impl ResolutionError {
    pub fn new(site: TextRange, reason: ErrorReason) -> Self {
        ResolutionError { site, reason }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorReason::AccessOnCurrentReceiverOnlyViolation => {
                write!(f, "member can only be accessed on the current receiver")
            }
            ErrorReason::UnresolvedReference { name } => {
                write!(f, "unresolved reference `{}`", name)
            }
            ErrorReason::UnresolvedFunctionCall { name, arg_count } => {
                write!(
                    f,
                    "no function `{}` accepts {} argument(s) of these types",
                    name, arg_count
                )
            }
            ErrorReason::AssignmentTypeMismatch { expected, actual } => {
                write!(
                    f,
                    "type mismatch: expected `{}`, found `{}`",
                    expected, actual
                )
            }
            ErrorReason::ReadOnlyPropertyAssignment { property } => {
                write!(f, "property `{}` is read-only", property)
            }
            ErrorReason::DuplicateLocalValue { name } => {
                write!(f, "value `{}` is already declared in this block", name)
            }
            ErrorReason::MissingConfigureBlock { function } => {
                write!(f, "`{}` must be followed by a configure block", function)
            }
            ErrorReason::UnexpectedConfigureBlock { function } => {
                write!(f, "`{}` does not accept a configure block", function)
            }
            ErrorReason::NotAnObject { ty } => {
                write!(f, "`{}` has no members", ty)
            }
        }
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for ResolutionError {}
