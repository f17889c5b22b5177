//! Assignability between static types.

use decl_schema::DataType;

/// Whether a value of type `value_type` may be used where `target` is
/// expected.
///
/// Constants must match exactly; there is no widening between numeric
/// kinds. A data class is assignable to itself and to any class named in
/// its supertypes. `Null` is never assignable, not even to `Null`, because
/// nullable types are not modelled yet.
pub fn is_assignable(value_type: &DataType, target: &DataType) -> bool {
    match target {
        DataType::Constant(_) => value_type == target,
        DataType::DataClass(target_class) => match value_type {
            DataType::DataClass(value_class) => {
                value_class == target_class || value_class.supertypes.contains(&target_class.name)
            }
            DataType::Constant(_) | DataType::Null | DataType::Unit => false,
        },
        DataType::Null => false,
        DataType::Unit => matches!(value_type, DataType::Unit),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use decl_schema::DataClass;

    use super::*;

    fn class(class: DataClass) -> DataType {
        DataType::DataClass(Rc::new(class))
    }

    #[test]
    fn every_type_but_null_is_assignable_to_itself() {
        let types = [
            DataType::int(),
            DataType::long(),
            DataType::string(),
            DataType::boolean(),
            DataType::Unit,
            class(DataClass::new("t.A")),
        ];
        for ty in &types {
            assert!(is_assignable(ty, ty), "{ty} should be assignable to itself");
        }
        assert!(!is_assignable(&DataType::Null, &DataType::Null));
    }

    #[test]
    fn constants_do_not_widen() {
        assert!(!is_assignable(&DataType::int(), &DataType::long()));
        assert!(!is_assignable(&DataType::long(), &DataType::int()));
        assert!(!is_assignable(&DataType::Unit, &DataType::int()));
        assert!(!is_assignable(&DataType::Null, &DataType::string()));
    }

    #[test]
    fn subclass_is_assignable_to_supertype_only() {
        let base = class(DataClass::new("t.Base"));
        let derived = class(DataClass::new("t.Derived").with_supertype("t.Base"));
        assert!(is_assignable(&derived, &base));
        assert!(!is_assignable(&base, &derived));
    }

    #[test]
    fn unrelated_classes_are_not_assignable() {
        let a = class(DataClass::new("t.A"));
        let b = class(DataClass::new("t.B"));
        assert!(!is_assignable(&a, &b));
        assert!(!is_assignable(&DataType::int(), &a));
        assert!(!is_assignable(&a, &DataType::Unit));
    }

    #[test]
    fn nothing_is_assignable_to_null() {
        for ty in [DataType::int(), DataType::Unit, class(DataClass::new("t.A"))] {
            assert!(!is_assignable(&ty, &DataType::Null));
        }
    }
}
