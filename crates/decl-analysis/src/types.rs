//! Static type derivation for value origins.

use decl_common::LiteralValue;
use decl_schema::{ConstantType, DataType, TypeRefContext};

use crate::origin::ObjectOrigin;

/// The constant kind of a literal.
pub fn literal_type(value: &LiteralValue) -> ConstantType {
    match value {
        LiteralValue::Int(_) => ConstantType::Int,
        LiteralValue::Long(_) => ConstantType::Long,
        LiteralValue::String(_) => ConstantType::String,
        LiteralValue::Boolean(_) => ConstantType::Boolean,
    }
}

/// Derive the static type of a value from its origin.
///
/// Declared types go through `type_refs`, so references to classes that
/// were still being built when the origin was created resolve correctly.
/// Local-value aliases and builder receivers are followed in a loop rather
/// than by recursion, so arbitrarily long chains are fine.
pub fn get_data_type<C>(type_refs: &C, origin: &ObjectOrigin) -> DataType
where
    C: TypeRefContext + ?Sized,
{
    let mut current = origin;
    loop {
        return match current {
            ObjectOrigin::ConstantOrigin { value, .. } => DataType::Constant(literal_type(value)),
            ObjectOrigin::External { key, .. } => type_refs.resolve_ref(&key.value_type),
            ObjectOrigin::NewObjectFromMemberFunction { function, .. } => {
                type_refs.resolve_ref(&function.return_value_type())
            }
            ObjectOrigin::NewObjectFromTopLevelFunction { function, .. } => {
                type_refs.resolve_ref(&function.return_value_type())
            }
            ObjectOrigin::PropertyReference { property, .. }
            | ObjectOrigin::PropertyDefaultValue { property, .. } => {
                type_refs.resolve_ref(&property.value_type)
            }
            ObjectOrigin::TopLevelReceiver { ty, .. } => ty.clone(),
            ObjectOrigin::FromLocalValue { assigned, .. } => {
                current = &**assigned;
                continue;
            }
            ObjectOrigin::NullObjectOrigin { .. } => DataType::Null,
            ObjectOrigin::ConfigureReceiver { accessor, .. } => {
                type_refs.resolve_ref(&accessor.object_type)
            }
            ObjectOrigin::BuilderReturnedReceiver { receiver, .. } => {
                current = &**receiver;
                continue;
            }
        };
    }
}
