//! Static type lattice.
//!
//! Defines the closed `DataType` set, the constant kinds, fully qualified
//! names, and `DataTypeRef`, the lazy reference a schema member uses to name
//! its type before that type is fully known.

use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use crate::schema::DataClass;

/// A fully qualified type name: `com.example.Project`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "String")]
pub struct FqName {
    pub package_name: String,
    pub simple_name: String,
}

impl FqName {
    pub fn new(package_name: impl Into<String>, simple_name: impl Into<String>) -> Self {
        FqName {
            package_name: package_name.into(),
            simple_name: simple_name.into(),
        }
    }

    /// Split a dotted name at its last dot. A name without dots lives in
    /// the root package.
    pub fn parse(qualified: &str) -> Self {
        match qualified.rsplit_once('.') {
            Some((package, simple)) => FqName::new(package, simple),
            None => FqName::new("", qualified),
        }
    }
}

impl From<String> for FqName {
    fn from(qualified: String) -> Self {
        FqName::parse(&qualified)
    }
}

impl From<&str> for FqName {
    fn from(qualified: &str) -> Self {
        FqName::parse(qualified)
    }
}

impl fmt::Display for FqName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package_name.is_empty() {
            write!(f, "{}", self.simple_name)
        } else {
            write!(f, "{}.{}", self.package_name, self.simple_name)
        }
    }
}

/// Primitive kinds a literal can have. Two constant types are compatible
/// only when their kinds match exactly.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstantType {
    Int,
    Long,
    String,
    Boolean,
}

impl ConstantType {
    pub fn name(self) -> &'static str {
        match self {
            ConstantType::Int => "Int",
            ConstantType::Long => "Long",
            ConstantType::String => "String",
            ConstantType::Boolean => "Boolean",
        }
    }
}

impl fmt::Display for ConstantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A static type.
///
/// - `Constant`: a primitive literal kind
/// - `DataClass`: a nominal schema type with its flattened supertype names
/// - `Null`: the type of `null`
/// - `Unit`: the type of calls that produce no value
///
/// The set is closed. Every consumer matches it exhaustively, so a new
/// variant forces an update at each dispatch site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataType {
    Constant(ConstantType),
    DataClass(Rc<DataClass>),
    Null,
    Unit,
}

impl DataType {
    pub fn int() -> DataType {
        DataType::Constant(ConstantType::Int)
    }

    pub fn long() -> DataType {
        DataType::Constant(ConstantType::Long)
    }

    pub fn string() -> DataType {
        DataType::Constant(ConstantType::String)
    }

    pub fn boolean() -> DataType {
        DataType::Constant(ConstantType::Boolean)
    }

    /// The data class behind this type, if it is one.
    pub fn as_data_class(&self) -> Option<&Rc<DataClass>> {
        match self {
            DataType::DataClass(class) => Some(class),
            DataType::Constant(_) | DataType::Null | DataType::Unit => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Constant(constant) => write!(f, "{}", constant),
            DataType::DataClass(class) => write!(f, "{}", class.name),
            DataType::Null => write!(f, "Null"),
            DataType::Unit => write!(f, "Unit"),
        }
    }
}

/// A reference to a type as written in the schema.
///
/// `Name` references are resolved through a
/// [`TypeRefContext`](crate::TypeRefContext) only when a type is needed,
/// so classes may refer to each other in any order.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum DataTypeRef {
    Type(DataType),
    Name(FqName),
}

impl DataTypeRef {
    pub fn name(name: impl Into<FqName>) -> Self {
        DataTypeRef::Name(name.into())
    }
}

impl From<DataType> for DataTypeRef {
    fn from(ty: DataType) -> Self {
        DataTypeRef::Type(ty)
    }
}

/// Builtin type names are taken as-is; anything else names a data class.
impl From<String> for DataTypeRef {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Int" => DataTypeRef::Type(DataType::int()),
            "Long" => DataTypeRef::Type(DataType::long()),
            "String" => DataTypeRef::Type(DataType::string()),
            "Boolean" => DataTypeRef::Type(DataType::boolean()),
            "Unit" => DataTypeRef::Type(DataType::Unit),
            "Null" => DataTypeRef::Type(DataType::Null),
            _ => DataTypeRef::Name(FqName::parse(&name)),
        }
    }
}

impl fmt::Display for DataTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataTypeRef::Type(ty) => write!(f, "{}", ty),
            DataTypeRef::Name(name) => write!(f, "{}", name),
        }
    }
}
