//! Schema model for the declarative configuration analyzer.
//!
//! # Architecture
//!
//! - [`ty`]: the closed static type lattice (`DataType`) and lazy `DataTypeRef`s
//! - [`schema`]: data classes, members, functions and the `AnalysisSchema` registry
//! - [`type_ref`]: `TypeRefContext`, the on-demand type-reference resolver
//! - [`error`]: schema loading and validation errors

pub mod error;
pub mod schema;
pub mod ty;
pub mod type_ref;

pub use error::SchemaError;
pub use schema::{
    AnalysisSchema, ConfigureAccessor, ConfigureBlockRequirement, DataClass, DataParameter,
    DataProperty, DataTopLevelFunction, ExternalObjectKey, FunctionSemantics,
    SchemaMemberFunction,
};
pub use ty::{ConstantType, DataType, DataTypeRef, FqName};
pub use type_ref::TypeRefContext;
