//! Resolution of configuration documents.
//!
//! Walks a document's top-level block, turning every expression into an
//! `ObjectOrigin`. Configure blocks open a nested scope whose receiver is
//! the configured object. Assignments and call arguments are type-checked,
//! members flagged current-receiver-only are run through the access guard,
//! and every problem is recorded in the context rather than aborting.
//!
//! Unqualified names resolve from the innermost scope outward: the scope's
//! local values first, then members of the scope's receiver, then the next
//! enclosing scope. External objects and top-level functions come last.

use std::rc::Rc;

use decl_common::{
    Assignment, Block, DataStatement, Expr, FunctionCall, LanguageTreeElement, LocalValue,
    PropertyAccess,
};
use decl_schema::{
    AnalysisSchema, ConfigureBlockRequirement, DataParameter, DataProperty, DataTopLevelFunction,
    DataType, FunctionSemantics, SchemaMemberFunction, TypeRefContext,
};

use crate::access::check_access_on_current_receiver;
use crate::assignability::is_assignable;
use crate::context::{AnalysisContext, AnalysisScope};
use crate::error::{ErrorReason, ResolutionError};
use crate::origin::ObjectOrigin;
use crate::types::get_data_type;
use crate::ResolutionResult;

/// A property as reached through a specific receiver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyReferenceResolution {
    pub receiver: ObjectOrigin,
    pub property: DataProperty,
}

/// An accepted assignment `lhs = rhs`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignmentRecord {
    pub lhs: PropertyReferenceResolution,
    pub rhs: ObjectOrigin,
    pub range: rowan::TextRange,
}

/// An object created by an adding function and attached to its container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataAddition {
    pub container: ObjectOrigin,
    pub data_object: ObjectOrigin,
}

/// Resolve a document against a schema.
///
/// This is the main entry point. Opens the top-level scope, resolves every
/// statement, and returns the recorded assignments, additions and errors.
pub fn resolve(schema: &AnalysisSchema, document: &Block) -> ResolutionResult {
    let mut ctx = AnalysisContext::new(schema);
    let top_level_receiver = ObjectOrigin::TopLevelReceiver {
        ty: DataType::DataClass(schema.top_level_receiver_type().clone()),
        origin_element: document.range,
    };

    let mut resolver = Resolver::default();
    ctx.with_scope(AnalysisScope::new(top_level_receiver.clone()), |ctx| {
        resolver.resolve_block(ctx, document)
    });

    let errors = ctx.into_errors();
    tracing::debug!(
        assignments = resolver.assignments.len(),
        additions = resolver.additions.len(),
        errors = errors.len(),
        "resolved document"
    );

    ResolutionResult {
        top_level_receiver,
        assignments: resolver.assignments,
        additions: resolver.additions,
        errors,
    }
}

/// The function a call resolved to.
enum CallTarget {
    Member {
        receiver: ObjectOrigin,
        function: SchemaMemberFunction,
    },
    TopLevel(DataTopLevelFunction),
}

#[derive(Default)]
struct Resolver {
    assignments: Vec<AssignmentRecord>,
    additions: Vec<DataAddition>,
}

impl Resolver {
    fn resolve_block(&mut self, ctx: &mut AnalysisContext<'_>, block: &Block) {
        for statement in &block.statements {
            match statement {
                DataStatement::Assignment(assignment) => self.resolve_assignment(ctx, assignment),
                DataStatement::LocalValue(local) => self.resolve_local_value(ctx, local),
                DataStatement::Expr(expr) => {
                    self.resolve_expr(ctx, expr);
                }
            }
        }
    }

    // ── Statements ─────────────────────────────────────────────────────

    fn resolve_assignment(&mut self, ctx: &mut AnalysisContext<'_>, assignment: &Assignment) {
        let target = self.resolve_property_target(ctx, &assignment.lhs);
        let value = self.resolve_expr(ctx, &assignment.rhs);
        let (Some(target), Some(value)) = (target, value) else {
            return;
        };

        if target.property.is_read_only {
            ctx.report(ResolutionError::new(
                assignment.lhs.range,
                ErrorReason::ReadOnlyPropertyAssignment {
                    property: target.property.name.clone(),
                },
            ));
            return;
        }

        let expected = ctx.resolve_ref(&target.property.value_type);
        let actual = get_data_type(ctx, &value);
        if !is_assignable(&actual, &expected) {
            ctx.report(ResolutionError::new(
                assignment.rhs.range(),
                ErrorReason::AssignmentTypeMismatch { expected, actual },
            ));
            return;
        }

        self.assignments.push(AssignmentRecord {
            lhs: target,
            rhs: value,
            range: assignment.range,
        });
    }

    fn resolve_local_value(&mut self, ctx: &mut AnalysisContext<'_>, local: &LocalValue) {
        let Some(value) = self.resolve_expr(ctx, &local.rhs) else {
            return;
        };
        let alias = ObjectOrigin::FromLocalValue {
            name: local.name.clone(),
            assigned: Rc::new(value),
            origin_element: local.range,
        };
        if !ctx.current_scope_mut().declare_local(local.name.clone(), alias) {
            ctx.report(ResolutionError::new(
                local.range,
                ErrorReason::DuplicateLocalValue {
                    name: local.name.clone(),
                },
            ));
        }
    }

    // ── Expressions ────────────────────────────────────────────────────

    fn resolve_expr(&mut self, ctx: &mut AnalysisContext<'_>, expr: &Expr) -> Option<ObjectOrigin> {
        match expr {
            Expr::Literal(literal) => Some(ObjectOrigin::ConstantOrigin {
                value: literal.value.clone(),
                origin_element: literal.range,
            }),
            Expr::Null(range) => Some(ObjectOrigin::NullObjectOrigin {
                origin_element: *range,
            }),
            Expr::This(_) => Some(ctx.current_receiver().clone()),
            Expr::PropertyAccess(access) => self.resolve_property_read(ctx, access),
            Expr::FunctionCall(call) => self.resolve_call(ctx, call),
        }
    }

    /// A property access used as a value. Unqualified names may also be
    /// local values or external objects.
    fn resolve_property_read(
        &mut self,
        ctx: &mut AnalysisContext<'_>,
        access: &PropertyAccess,
    ) -> Option<ObjectOrigin> {
        if access.receiver.is_none() {
            if let Some(value) = lookup_implicit_value(ctx, access) {
                return Some(value);
            }
        }
        let target = self.resolve_property_target(ctx, access)?;
        Some(ObjectOrigin::PropertyReference {
            receiver: Rc::new(target.receiver),
            property: target.property,
            origin_element: access.range,
        })
    }

    /// Find the receiver and property an access refers to, checking the
    /// current-receiver restriction on the way.
    fn resolve_property_target(
        &mut self,
        ctx: &mut AnalysisContext<'_>,
        access: &PropertyAccess,
    ) -> Option<PropertyReferenceResolution> {
        let found = match &access.receiver {
            Some(receiver_expr) => {
                let receiver = self.resolve_expr(ctx, receiver_expr)?;
                let receiver_type = get_data_type(ctx, &receiver);
                let Some(class) = receiver_type.as_data_class() else {
                    ctx.report(ResolutionError::new(
                        receiver_expr.range(),
                        ErrorReason::NotAnObject {
                            ty: receiver_type.clone(),
                        },
                    ));
                    return None;
                };
                let property = class.property(&access.name).cloned();
                property.map(|property| PropertyReferenceResolution { receiver, property })
            }
            None => lookup_implicit_property(ctx, &access.name),
        };

        let Some(found) = found else {
            ctx.report(ResolutionError::new(
                access.range,
                ErrorReason::UnresolvedReference {
                    name: access.name.clone(),
                },
            ));
            return None;
        };

        if found.property.access_from_current_receiver_only {
            check_access_on_current_receiver(
                ctx,
                &found.receiver,
                LanguageTreeElement::PropertyAccess(access),
            );
        }
        Some(found)
    }

    fn resolve_call(
        &mut self,
        ctx: &mut AnalysisContext<'_>,
        call: &FunctionCall,
    ) -> Option<ObjectOrigin> {
        // Resolve the receiver and every argument before giving up so their
        // errors are reported too.
        let explicit_receiver = call
            .receiver
            .as_deref()
            .map(|receiver_expr| (receiver_expr, self.resolve_expr(ctx, receiver_expr)));
        let arguments: Vec<Option<ObjectOrigin>> =
            call.args.iter().map(|arg| self.resolve_expr(ctx, arg)).collect();
        let arg_types: Vec<Option<DataType>> = arguments
            .iter()
            .map(|arg| arg.as_ref().map(|arg| get_data_type(ctx, arg)))
            .collect();

        let target = match explicit_receiver {
            Some((_, None)) => return None,
            Some((receiver_expr, Some(receiver))) => {
                let receiver_type = get_data_type(ctx, &receiver);
                let Some(class) = receiver_type.as_data_class() else {
                    ctx.report(ResolutionError::new(
                        receiver_expr.range(),
                        ErrorReason::NotAnObject {
                            ty: receiver_type.clone(),
                        },
                    ));
                    return None;
                };
                let function = class
                    .functions_named(&call.name)
                    .find(|f| accepts_arguments(ctx, &f.parameters, &arg_types))
                    .cloned();
                function.map(|function| CallTarget::Member { receiver, function })
            }
            None => lookup_implicit_function(ctx, &call.name, &arg_types),
        };

        let Some(target) = target else {
            // A call with unresolved arguments has already been reported.
            if arguments.iter().all(Option::is_some) {
                ctx.report(ResolutionError::new(
                    call.range,
                    ErrorReason::UnresolvedFunctionCall {
                        name: call.name.clone(),
                        arg_count: arg_types.len(),
                    },
                ));
            }
            return None;
        };

        match target {
            CallTarget::Member { receiver, function } => {
                if function.access_from_current_receiver_only {
                    check_access_on_current_receiver(
                        ctx,
                        &receiver,
                        LanguageTreeElement::FunctionCall(call),
                    );
                }
                self.invoke_member(ctx, call, receiver, function, arguments)
            }
            CallTarget::TopLevel(function) => {
                self.invoke_top_level(ctx, call, function, arguments)
            }
        }
    }

    /// Invoke a member function. When an argument failed to resolve, the
    /// configure block is still checked, but the call yields no value and
    /// records no addition.
    fn invoke_member(
        &mut self,
        ctx: &mut AnalysisContext<'_>,
        call: &FunctionCall,
        receiver: ObjectOrigin,
        function: SchemaMemberFunction,
        arguments: Vec<Option<ObjectOrigin>>,
    ) -> Option<ObjectOrigin> {
        let complete = arguments.iter().all(Option::is_some);
        let arguments: Vec<ObjectOrigin> = arguments.into_iter().flatten().collect();
        let block = checked_configure_block(ctx, call, &function.semantics);
        let invocation_id = ctx.next_invocation_id();
        let receiver = Rc::new(receiver);

        let result = match &function.semantics {
            FunctionSemantics::AccessAndConfigure { accessor } => {
                if let Some(block) = block {
                    let configured = ObjectOrigin::ConfigureReceiver {
                        receiver: receiver.clone(),
                        function: function.clone(),
                        invocation_id,
                        accessor: accessor.clone(),
                        origin_element: call.range,
                    };
                    ctx.with_scope(AnalysisScope::new(configured), |ctx| {
                        self.resolve_block(ctx, block)
                    });
                }
                ObjectOrigin::NewObjectFromMemberFunction {
                    receiver,
                    function,
                    arguments,
                    invocation_id,
                    origin_element: call.range,
                }
            }
            FunctionSemantics::AddAndConfigure { .. } => {
                let added = ObjectOrigin::NewObjectFromMemberFunction {
                    receiver: receiver.clone(),
                    function,
                    arguments,
                    invocation_id,
                    origin_element: call.range,
                };
                if complete {
                    self.additions.push(DataAddition {
                        container: (*receiver).clone(),
                        data_object: added.clone(),
                    });
                }
                if let Some(block) = block {
                    ctx.with_scope(AnalysisScope::new(added.clone()), |ctx| {
                        self.resolve_block(ctx, block)
                    });
                }
                added
            }
            FunctionSemantics::Builder { .. } => ObjectOrigin::BuilderReturnedReceiver {
                receiver,
                function,
                arguments,
                invocation_id,
                origin_element: call.range,
            },
            FunctionSemantics::Pure { .. } => ObjectOrigin::NewObjectFromMemberFunction {
                receiver,
                function,
                arguments,
                invocation_id,
                origin_element: call.range,
            },
        };
        complete.then_some(result)
    }

    fn invoke_top_level(
        &mut self,
        ctx: &mut AnalysisContext<'_>,
        call: &FunctionCall,
        function: DataTopLevelFunction,
        arguments: Vec<Option<ObjectOrigin>>,
    ) -> Option<ObjectOrigin> {
        let complete = arguments.iter().all(Option::is_some);
        let block = checked_configure_block(ctx, call, &function.semantics);
        let invocation_id = ctx.next_invocation_id();
        let created = ObjectOrigin::NewObjectFromTopLevelFunction {
            function,
            arguments: arguments.into_iter().flatten().collect(),
            invocation_id,
            origin_element: call.range,
        };
        if let Some(block) = block {
            ctx.with_scope(AnalysisScope::new(created.clone()), |ctx| {
                self.resolve_block(ctx, block)
            });
        }
        complete.then_some(created)
    }
}

// ── Lookup helpers ─────────────────────────────────────────────────────

/// A local value or external object visible under `name`. Properties of a
/// closer receiver shadow locals of outer scopes.
fn lookup_implicit_value(
    ctx: &AnalysisContext<'_>,
    access: &PropertyAccess,
) -> Option<ObjectOrigin> {
    let name = access.name.as_str();
    for scope in ctx.current_scopes().iter().rev() {
        if let Some(local) = scope.local(name) {
            return Some(local.clone());
        }
        let receiver_type = get_data_type(ctx, scope.receiver());
        if receiver_type
            .as_data_class()
            .is_some_and(|class| class.property(name).is_some())
        {
            return None;
        }
    }
    let key = ctx.schema().external_object(name)?;
    Some(ObjectOrigin::External {
        key: key.clone(),
        origin_element: access.range,
    })
}

/// The innermost receiver declaring a property called `name`.
fn lookup_implicit_property(
    ctx: &AnalysisContext<'_>,
    name: &str,
) -> Option<PropertyReferenceResolution> {
    ctx.current_scopes().iter().rev().find_map(|scope| {
        let receiver_type = get_data_type(ctx, scope.receiver());
        let property = receiver_type.as_data_class()?.property(name)?.clone();
        Some(PropertyReferenceResolution {
            receiver: scope.receiver().clone(),
            property,
        })
    })
}

/// The innermost receiver with a matching member function, else a matching
/// top-level function.
fn lookup_implicit_function(
    ctx: &AnalysisContext<'_>,
    name: &str,
    arg_types: &[Option<DataType>],
) -> Option<CallTarget> {
    let member = ctx.current_scopes().iter().rev().find_map(|scope| {
        let receiver_type = get_data_type(ctx, scope.receiver());
        let function = receiver_type
            .as_data_class()?
            .functions_named(name)
            .find(|f| accepts_arguments(ctx, &f.parameters, arg_types))?
            .clone();
        Some(CallTarget::Member {
            receiver: scope.receiver().clone(),
            function,
        })
    });
    if member.is_some() {
        return member;
    }
    ctx.schema()
        .top_level_functions_named(name)
        .find(|f| accepts_arguments(ctx, &f.parameters, arg_types))
        .cloned()
        .map(CallTarget::TopLevel)
}

/// Whether a function with `parameters` accepts arguments of `arg_types`.
/// An argument that failed to resolve matches any parameter.
fn accepts_arguments(
    ctx: &AnalysisContext<'_>,
    parameters: &[DataParameter],
    arg_types: &[Option<DataType>],
) -> bool {
    parameters.len() == arg_types.len()
        && parameters.iter().zip(arg_types).all(|(param, arg)| {
            arg.as_ref()
                .map_or(true, |arg| is_assignable(arg, &ctx.resolve_ref(&param.value_type)))
        })
}

/// The configure block to resolve for a call, after reporting a missing or
/// unexpected one.
fn checked_configure_block<'a>(
    ctx: &mut AnalysisContext<'_>,
    call: &'a FunctionCall,
    semantics: &FunctionSemantics,
) -> Option<&'a Block> {
    match (semantics.configure_block_requirement(), &call.configure_block) {
        (ConfigureBlockRequirement::Required, None) => {
            ctx.report(ResolutionError::new(
                call.range,
                ErrorReason::MissingConfigureBlock {
                    function: call.name.clone(),
                },
            ));
            None
        }
        (ConfigureBlockRequirement::NotAllowed, Some(block)) => {
            ctx.report(ResolutionError::new(
                block.range,
                ErrorReason::UnexpectedConfigureBlock {
                    function: call.name.clone(),
                },
            ));
            None
        }
        (ConfigureBlockRequirement::Required | ConfigureBlockRequirement::Optional, block) => {
            block.as_ref()
        }
        (ConfigureBlockRequirement::NotAllowed, None) => None,
    }
}
