//! Lazy type-reference resolution.
//!
//! Schema members name their types with `DataTypeRef`s that may be created
//! before the referenced class exists. They are turned into `DataType`s
//! only on demand, through a `TypeRefContext`.

use crate::schema::AnalysisSchema;
use crate::ty::{DataType, DataTypeRef};

/// Resolves type references to concrete types.
pub trait TypeRefContext {
    fn resolve_ref(&self, type_ref: &DataTypeRef) -> DataType;
}

impl TypeRefContext for AnalysisSchema {
    /// # Panics
    ///
    /// Panics on a name the schema does not declare. Schemas are validated
    /// on construction, so this only happens for references built outside
    /// of it.
    fn resolve_ref(&self, type_ref: &DataTypeRef) -> DataType {
        match type_ref {
            DataTypeRef::Type(ty) => ty.clone(),
            DataTypeRef::Name(name) => match self.data_class(name) {
                Some(class) => DataType::DataClass(class.clone()),
                None => panic!("type reference `{name}` does not name a schema class"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DataClass, DataProperty};

    #[test]
    fn forward_references_resolve_after_construction() {
        // `A` refers to `B` before `B` is declared, and back.
        let a = DataClass::new("t.A")
            .with_property(DataProperty::new("b", DataTypeRef::name("t.B")));
        let b = DataClass::new("t.B")
            .with_property(DataProperty::new("a", DataTypeRef::name("t.A")));
        let schema = AnalysisSchema::new("t.A".into(), vec![a, b], vec![], vec![]).unwrap();

        let b_ty = schema.resolve_ref(&DataTypeRef::name("t.B"));
        let b_class = b_ty.as_data_class().unwrap();
        let back = schema.resolve_ref(&b_class.property("a").unwrap().value_type);
        assert_eq!(back.as_data_class().unwrap().name.simple_name, "A");
    }

    #[test]
    fn direct_types_are_returned_as_is() {
        let schema =
            AnalysisSchema::new("t.A".into(), vec![DataClass::new("t.A")], vec![], vec![]).unwrap();
        assert_eq!(schema.resolve_ref(&DataType::long().into()), DataType::long());
    }

    #[test]
    #[should_panic(expected = "does not name a schema class")]
    fn unknown_name_panics() {
        let schema =
            AnalysisSchema::new("t.A".into(), vec![DataClass::new("t.A")], vec![], vec![]).unwrap();
        schema.resolve_ref(&DataTypeRef::name("t.Nope"));
    }
}
