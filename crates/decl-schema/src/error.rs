use std::fmt;

use crate::ty::FqName;

/// An error found while loading or validating a schema.
#[derive(Debug)]
pub enum SchemaError {
    /// The document is not valid schema JSON.
    Json(serde_json::Error),
    /// The top-level receiver names a class the schema does not declare.
    UnknownTopLevelReceiver(FqName),
    /// Two data classes share a name.
    DuplicateDataClass(FqName),
    /// A member refers to a data class the schema does not declare.
    UnresolvedTypeRef {
        name: FqName,
        referenced_from: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Json(err) => write!(f, "invalid schema document: {err}"),
            SchemaError::UnknownTopLevelReceiver(name) => {
                write!(f, "top-level receiver type `{name}` is not declared")
            }
            SchemaError::DuplicateDataClass(name) => {
                write!(f, "data class `{name}` is declared more than once")
            }
            SchemaError::UnresolvedTypeRef {
                name,
                referenced_from,
            } => write!(
                f,
                "`{referenced_from}` refers to undeclared type `{name}`"
            ),
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemaError::Json(err) => Some(err),
            SchemaError::UnknownTopLevelReceiver(_)
            | SchemaError::DuplicateDataClass(_)
            | SchemaError::UnresolvedTypeRef { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_display() {
        let err = SchemaError::UnresolvedTypeRef {
            name: FqName::parse("a.Missing"),
            referenced_from: "a.Top.inner".into(),
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"`a.Top.inner` refers to undeclared type `a.Missing`"
        );
        assert_eq!(
            SchemaError::DuplicateDataClass(FqName::parse("a.B")).to_string(),
            "data class `a.B` is declared more than once"
        );
    }
}
