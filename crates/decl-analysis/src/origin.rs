//! Value provenance.
//!
//! Every expression the resolver accepts becomes an `ObjectOrigin` that
//! records how the value came to exist. Origins compare by value: two
//! receivers are the same receiver only if they were produced by the same
//! construct at the same site, which is what the current-receiver check
//! relies on. Composite origins point only at origins built before them,
//! so the origin graph is acyclic.
//!
//! Alias and builder chains can be as long as the document is, so origins
//! are torn down with a work list instead of recursive drops.

use std::rc::Rc;

use rowan::TextRange;

use decl_common::LiteralValue;
use decl_schema::{
    ConfigureAccessor, DataProperty, DataTopLevelFunction, DataType, ExternalObjectKey,
    SchemaMemberFunction,
};

/// How a resolved value was produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectOrigin {
    /// A literal constant.
    ConstantOrigin {
        value: LiteralValue,
        origin_element: TextRange,
    },
    /// A value bound by the host environment.
    External {
        key: ExternalObjectKey,
        origin_element: TextRange,
    },
    /// The result of calling a member function.
    NewObjectFromMemberFunction {
        receiver: Rc<ObjectOrigin>,
        function: SchemaMemberFunction,
        arguments: Vec<ObjectOrigin>,
        invocation_id: u64,
        origin_element: TextRange,
    },
    /// The result of calling a top-level function.
    NewObjectFromTopLevelFunction {
        function: DataTopLevelFunction,
        arguments: Vec<ObjectOrigin>,
        invocation_id: u64,
        origin_element: TextRange,
    },
    /// A read of a declared property.
    PropertyReference {
        receiver: Rc<ObjectOrigin>,
        property: DataProperty,
        origin_element: TextRange,
    },
    /// The default value of a property nobody assigned.
    PropertyDefaultValue {
        receiver: Rc<ObjectOrigin>,
        property: DataProperty,
        origin_element: TextRange,
    },
    /// The receiver of the whole document.
    TopLevelReceiver {
        ty: DataType,
        origin_element: TextRange,
    },
    /// A `val` binding; stands for the value it was assigned.
    FromLocalValue {
        name: String,
        assigned: Rc<ObjectOrigin>,
        origin_element: TextRange,
    },
    /// The `null` literal.
    NullObjectOrigin { origin_element: TextRange },
    /// The implicit receiver of a configure block entered through an
    /// accessor, as in `inner { ... }`.
    ConfigureReceiver {
        receiver: Rc<ObjectOrigin>,
        function: SchemaMemberFunction,
        invocation_id: u64,
        accessor: ConfigureAccessor,
        origin_element: TextRange,
    },
    /// The receiver handed back by a builder function.
    BuilderReturnedReceiver {
        receiver: Rc<ObjectOrigin>,
        function: SchemaMemberFunction,
        arguments: Vec<ObjectOrigin>,
        invocation_id: u64,
        origin_element: TextRange,
    },
}

impl ObjectOrigin {
    /// The tree element this origin was produced at.
    pub fn origin_element(&self) -> TextRange {
        match self {
            ObjectOrigin::ConstantOrigin { origin_element, .. }
            | ObjectOrigin::External { origin_element, .. }
            | ObjectOrigin::NewObjectFromMemberFunction { origin_element, .. }
            | ObjectOrigin::NewObjectFromTopLevelFunction { origin_element, .. }
            | ObjectOrigin::PropertyReference { origin_element, .. }
            | ObjectOrigin::PropertyDefaultValue { origin_element, .. }
            | ObjectOrigin::TopLevelReceiver { origin_element, .. }
            | ObjectOrigin::FromLocalValue { origin_element, .. }
            | ObjectOrigin::NullObjectOrigin { origin_element }
            | ObjectOrigin::ConfigureReceiver { origin_element, .. }
            | ObjectOrigin::BuilderReturnedReceiver { origin_element, .. } => *origin_element,
        }
    }

    /// The receiver this origin was reached through, if any.
    pub fn receiver(&self) -> Option<&ObjectOrigin> {
        match self {
            ObjectOrigin::NewObjectFromMemberFunction { receiver, .. }
            | ObjectOrigin::PropertyReference { receiver, .. }
            | ObjectOrigin::PropertyDefaultValue { receiver, .. }
            | ObjectOrigin::ConfigureReceiver { receiver, .. }
            | ObjectOrigin::BuilderReturnedReceiver { receiver, .. } => Some(receiver),
            ObjectOrigin::ConstantOrigin { .. }
            | ObjectOrigin::External { .. }
            | ObjectOrigin::NewObjectFromTopLevelFunction { .. }
            | ObjectOrigin::TopLevelReceiver { .. }
            | ObjectOrigin::FromLocalValue { .. }
            | ObjectOrigin::NullObjectOrigin { .. } => None,
        }
    }

    /// The object this origin stands for, looking through local-value
    /// aliases and builder calls, which hand back the object they were
    /// called on.
    pub fn resolved_object(&self) -> &ObjectOrigin {
        let mut current = self;
        loop {
            current = match current {
                ObjectOrigin::FromLocalValue { assigned, .. } => &**assigned,
                ObjectOrigin::BuilderReturnedReceiver { receiver, .. } => &**receiver,
                ObjectOrigin::ConstantOrigin { .. }
                | ObjectOrigin::External { .. }
                | ObjectOrigin::NewObjectFromMemberFunction { .. }
                | ObjectOrigin::NewObjectFromTopLevelFunction { .. }
                | ObjectOrigin::PropertyReference { .. }
                | ObjectOrigin::PropertyDefaultValue { .. }
                | ObjectOrigin::TopLevelReceiver { .. }
                | ObjectOrigin::NullObjectOrigin { .. }
                | ObjectOrigin::ConfigureReceiver { .. } => return current,
            };
        }
    }

    /// Whether this origin owns other origins.
    fn has_links(&self) -> bool {
        match self {
            ObjectOrigin::NewObjectFromMemberFunction { .. }
            | ObjectOrigin::PropertyReference { .. }
            | ObjectOrigin::PropertyDefaultValue { .. }
            | ObjectOrigin::FromLocalValue { .. }
            | ObjectOrigin::ConfigureReceiver { .. }
            | ObjectOrigin::BuilderReturnedReceiver { .. } => true,
            ObjectOrigin::NewObjectFromTopLevelFunction { arguments, .. } => !arguments.is_empty(),
            ObjectOrigin::ConstantOrigin { .. }
            | ObjectOrigin::External { .. }
            | ObjectOrigin::TopLevelReceiver { .. }
            | ObjectOrigin::NullObjectOrigin { .. } => false,
        }
    }

    /// Move every linked origin this one solely owns onto `pending`.
    fn detach_links(&mut self, pending: &mut Vec<Rc<ObjectOrigin>>) {
        match self {
            ObjectOrigin::NewObjectFromMemberFunction {
                receiver, arguments, ..
            }
            | ObjectOrigin::BuilderReturnedReceiver {
                receiver, arguments, ..
            } => {
                detach(receiver, pending);
                pending.extend(std::mem::take(arguments).into_iter().map(Rc::new));
            }
            ObjectOrigin::NewObjectFromTopLevelFunction { arguments, .. } => {
                pending.extend(std::mem::take(arguments).into_iter().map(Rc::new));
            }
            ObjectOrigin::PropertyReference { receiver, .. }
            | ObjectOrigin::PropertyDefaultValue { receiver, .. }
            | ObjectOrigin::ConfigureReceiver { receiver, .. } => detach(receiver, pending),
            ObjectOrigin::FromLocalValue { assigned, .. } => detach(assigned, pending),
            ObjectOrigin::ConstantOrigin { .. }
            | ObjectOrigin::External { .. }
            | ObjectOrigin::TopLevelReceiver { .. }
            | ObjectOrigin::NullObjectOrigin { .. } => {}
        }
    }
}

/// Swap out a link whose target would be freed along with it. Shared
/// targets and leaves are left in place; dropping them never recurses.
fn detach(link: &mut Rc<ObjectOrigin>, pending: &mut Vec<Rc<ObjectOrigin>>) {
    if Rc::strong_count(link) == 1 && link.has_links() {
        let leaf = Rc::new(ObjectOrigin::NullObjectOrigin {
            origin_element: TextRange::default(),
        });
        pending.push(std::mem::replace(link, leaf));
    }
}

impl Drop for ObjectOrigin {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_links(&mut pending);
        while let Some(link) = pending.pop() {
            if let Ok(mut origin) = Rc::try_unwrap(link) {
                origin.detach_links(&mut pending);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rowan::TextSize;

    use decl_schema::{DataClass, FunctionSemantics};

    use super::*;

    fn at(offset: u32) -> TextRange {
        TextRange::empty(TextSize::from(offset))
    }

    fn top() -> ObjectOrigin {
        ObjectOrigin::TopLevelReceiver {
            ty: DataType::DataClass(Rc::new(DataClass::new("t.Top"))),
            origin_element: at(0),
        }
    }

    fn alias(name: &str, assigned: ObjectOrigin, offset: u32) -> ObjectOrigin {
        ObjectOrigin::FromLocalValue {
            name: name.to_string(),
            assigned: Rc::new(assigned),
            origin_element: at(offset),
        }
    }

    #[test]
    fn resolved_object_looks_through_aliases_and_builders() {
        let builder = ObjectOrigin::BuilderReturnedReceiver {
            receiver: Rc::new(top()),
            function: SchemaMemberFunction::new(
                "touch",
                vec![],
                FunctionSemantics::Builder {
                    return_value_type: DataType::Unit.into(),
                },
            ),
            arguments: vec![],
            invocation_id: 0,
            origin_element: at(1),
        };
        let aliased = alias("t", builder, 2);
        assert_eq!(aliased.resolved_object(), &top());

        let property = ObjectOrigin::PropertyReference {
            receiver: Rc::new(top()),
            property: DataProperty::new("p", DataType::int()),
            origin_element: at(3),
        };
        assert_eq!(property.resolved_object(), &property);
    }

    #[test]
    fn dropping_a_long_alias_chain_does_not_overflow() {
        let mut chain = top();
        for i in 0..200_000 {
            chain = alias("v", chain, i);
        }
        drop(chain);
    }

    #[test]
    fn shared_links_survive_teardown() {
        let shared = Rc::new(alias("a", top(), 1));
        let holder = ObjectOrigin::FromLocalValue {
            name: "b".to_string(),
            assigned: shared.clone(),
            origin_element: at(2),
        };
        drop(holder);
        assert_eq!(Rc::strong_count(&shared), 1);
        assert_eq!(shared.resolved_object(), &top());
    }
}
