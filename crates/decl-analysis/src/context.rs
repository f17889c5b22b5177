//! Analysis context with the receiver scope stack.
//!
//! Each open configure block contributes one `AnalysisScope` bound to the
//! receiver that unqualified names resolve against inside it. The scope
//! stack grows as blocks are entered and shrinks as they are left; the
//! innermost scope holds the current receiver.
//!
//! Scopes are opened through [`AnalysisContext::with_scope`] (or the
//! [`ScopeGuard`] it is built on), which pops the scope on every exit path,
//! unwinding included.

use std::ops::{Deref, DerefMut};

use rustc_hash::FxHashMap;

use decl_schema::{AnalysisSchema, DataType, DataTypeRef, TypeRefContext};

use crate::error::ResolutionError;
use crate::origin::ObjectOrigin;

/// The receiver in effect inside one configure block, plus the local
/// values declared in that block.
#[derive(Clone, Debug)]
pub struct AnalysisScope {
    receiver: ObjectOrigin,
    locals: FxHashMap<String, ObjectOrigin>,
}

impl AnalysisScope {
    pub fn new(receiver: ObjectOrigin) -> Self {
        AnalysisScope {
            receiver,
            locals: FxHashMap::default(),
        }
    }

    pub fn receiver(&self) -> &ObjectOrigin {
        &self.receiver
    }

    /// Declare a local value. Returns `false` if the name is already taken
    /// in this scope; the first declaration wins.
    pub fn declare_local(&mut self, name: String, value: ObjectOrigin) -> bool {
        if self.locals.contains_key(&name) {
            return false;
        }
        self.locals.insert(name, value);
        true
    }

    pub fn local(&self, name: &str) -> Option<&ObjectOrigin> {
        self.locals.get(name)
    }
}

/// Position of an entered scope on the stack.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScopeId(usize);

/// State of one analysis run: the schema, the scope stack and the errors
/// recorded so far.
///
/// A context is owned by a single in-flight analysis.
pub struct AnalysisContext<'s> {
    schema: &'s AnalysisSchema,
    scopes: Vec<AnalysisScope>,
    errors: Vec<ResolutionError>,
    next_invocation_id: u64,
}

impl<'s> AnalysisContext<'s> {
    /// Create a context with an empty scope stack.
    pub fn new(schema: &'s AnalysisSchema) -> Self {
        AnalysisContext {
            schema,
            scopes: Vec::new(),
            errors: Vec::new(),
            next_invocation_id: 0,
        }
    }

    pub fn schema(&self) -> &'s AnalysisSchema {
        self.schema
    }

    /// Push a scope. Prefer [`with_scope`](Self::with_scope), which also
    /// guarantees the matching [`leave_scope`](Self::leave_scope).
    pub fn enter_scope(&mut self, scope: AnalysisScope) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(scope);
        tracing::trace!(depth = self.scopes.len(), "entered analysis scope");
        id
    }

    /// Pop the scope entered as `id` and return it.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not the innermost scope.
    pub fn leave_scope(&mut self, id: ScopeId) -> AnalysisScope {
        assert_eq!(
            id.0 + 1,
            self.scopes.len(),
            "left a scope that is not the innermost one"
        );
        let scope = self
            .scopes
            .pop()
            .expect("scope stack should not be empty when leaving a scope");
        tracing::trace!(depth = self.scopes.len(), "left analysis scope");
        scope
    }

    /// Enter `scope` and return a guard that leaves it when dropped.
    pub fn enter(&mut self, scope: AnalysisScope) -> ScopeGuard<'_, 's> {
        let id = self.enter_scope(scope);
        ScopeGuard { context: self, id }
    }

    /// Run `action` exactly once with `scope` entered, then leave it. The
    /// scope is left even if `action` panics.
    pub fn with_scope<R>(
        &mut self,
        scope: AnalysisScope,
        action: impl FnOnce(&mut AnalysisContext<'s>) -> R,
    ) -> R {
        let mut guard = self.enter(scope);
        action(&mut *guard)
    }

    /// Open scopes, outermost first.
    pub fn current_scopes(&self) -> &[AnalysisScope] {
        &self.scopes
    }

    /// The innermost scope.
    ///
    /// # Panics
    ///
    /// Panics if no scope is open.
    pub fn current_scope(&self) -> &AnalysisScope {
        self.scopes
            .last()
            .expect("no analysis scope is open")
    }

    pub fn current_scope_mut(&mut self) -> &mut AnalysisScope {
        self.scopes
            .last_mut()
            .expect("no analysis scope is open")
    }

    /// The receiver of the innermost scope.
    ///
    /// # Panics
    ///
    /// Panics if no scope is open.
    pub fn current_receiver(&self) -> &ObjectOrigin {
        self.current_scope().receiver()
    }

    /// Whether `origin` is the receiver of the innermost scope.
    pub fn is_current_receiver(&self, origin: &ObjectOrigin) -> bool {
        self.current_receiver() == origin
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Record an error and keep going.
    pub fn report(&mut self, error: ResolutionError) {
        tracing::debug!(site = ?error.site, reason = %error.reason, "resolution error");
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[ResolutionError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ResolutionError> {
        self.errors
    }

    /// A fresh id distinguishing one call site evaluation from another.
    pub fn next_invocation_id(&mut self) -> u64 {
        let id = self.next_invocation_id;
        self.next_invocation_id += 1;
        id
    }
}

impl TypeRefContext for AnalysisContext<'_> {
    fn resolve_ref(&self, type_ref: &DataTypeRef) -> DataType {
        self.schema.resolve_ref(type_ref)
    }
}

/// Keeps a scope entered for as long as it lives.
///
/// Dereferences to the context, so resolution inside the scope goes
/// through the guard.
pub struct ScopeGuard<'c, 's> {
    context: &'c mut AnalysisContext<'s>,
    id: ScopeId,
}

impl<'s> Deref for ScopeGuard<'_, 's> {
    type Target = AnalysisContext<'s>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl<'s> DerefMut for ScopeGuard<'_, 's> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl Drop for ScopeGuard<'_, '_> {
    fn drop(&mut self) {
        self.context.leave_scope(self.id);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use rowan::{TextRange, TextSize};

    use decl_common::LiteralValue;
    use decl_schema::DataClass;

    use super::*;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    fn schema() -> AnalysisSchema {
        AnalysisSchema::new("t.Top".into(), vec![DataClass::new("t.Top")], vec![], vec![])
            .unwrap()
    }

    fn receiver(schema: &AnalysisSchema, at: u32) -> ObjectOrigin {
        ObjectOrigin::TopLevelReceiver {
            ty: DataType::DataClass(schema.top_level_receiver_type().clone()),
            origin_element: range(at, at + 1),
        }
    }

    #[test]
    fn with_scope_sets_current_receiver() {
        let schema = schema();
        let mut ctx = AnalysisContext::new(&schema);
        let outer = receiver(&schema, 0);
        let inner = receiver(&schema, 10);

        ctx.with_scope(AnalysisScope::new(outer.clone()), |ctx| {
            assert!(ctx.is_current_receiver(&outer));
            ctx.with_scope(AnalysisScope::new(inner.clone()), |ctx| {
                assert_eq!(ctx.depth(), 2);
                assert!(ctx.is_current_receiver(&inner));
                assert!(!ctx.is_current_receiver(&outer));
            });
            assert!(ctx.is_current_receiver(&outer));
        });
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn with_scope_returns_action_result() {
        let schema = schema();
        let mut ctx = AnalysisContext::new(&schema);
        let depth = ctx.with_scope(AnalysisScope::new(receiver(&schema, 0)), |ctx| ctx.depth());
        assert_eq!(depth, 1);
    }

    #[test]
    fn scope_is_left_when_action_panics() {
        let schema = schema();
        let mut ctx = AnalysisContext::new(&schema);
        let outer = receiver(&schema, 0);

        ctx.with_scope(AnalysisScope::new(outer.clone()), |ctx| {
            let before = ctx.depth();
            let result = catch_unwind(AssertUnwindSafe(|| {
                ctx.with_scope(AnalysisScope::new(receiver(&schema, 5)), |ctx| {
                    ctx.with_scope(AnalysisScope::new(receiver(&schema, 9)), |_| {
                        panic!("body failed");
                    })
                })
            }));
            assert!(result.is_err());
            assert_eq!(ctx.depth(), before);
            assert!(ctx.is_current_receiver(&outer));
        });
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn scope_is_left_on_early_return() {
        fn body(ctx: &mut AnalysisContext<'_>, fail: bool) -> Result<(), ()> {
            if fail {
                return Err(());
            }
            ctx.next_invocation_id();
            Ok(())
        }

        let schema = schema();
        let mut ctx = AnalysisContext::new(&schema);
        let result =
            ctx.with_scope(AnalysisScope::new(receiver(&schema, 0)), |ctx| body(ctx, true));
        assert!(result.is_err());
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    #[should_panic(expected = "left a scope that is not the innermost one")]
    fn leaving_out_of_order_panics() {
        let schema = schema();
        let mut ctx = AnalysisContext::new(&schema);
        let outer = ctx.enter_scope(AnalysisScope::new(receiver(&schema, 0)));
        let _inner = ctx.enter_scope(AnalysisScope::new(receiver(&schema, 1)));
        ctx.leave_scope(outer);
    }

    #[test]
    #[should_panic(expected = "no analysis scope is open")]
    fn current_receiver_without_scope_panics() {
        let schema = schema();
        let ctx = AnalysisContext::new(&schema);
        ctx.current_receiver();
    }

    #[test]
    fn locals_are_per_scope() {
        let value = ObjectOrigin::ConstantOrigin {
            value: LiteralValue::Int(1),
            origin_element: range(0, 1),
        };
        let schema = schema();
        let mut scope = AnalysisScope::new(receiver(&schema, 0));
        assert!(scope.declare_local("a".into(), value.clone()));
        assert!(!scope.declare_local("a".into(), value.clone()));
        assert_eq!(scope.local("a"), Some(&value));
        assert_eq!(scope.local("b"), None);
    }

    #[test]
    fn invocation_ids_are_fresh() {
        let schema = schema();
        let mut ctx = AnalysisContext::new(&schema);
        let a = ctx.next_invocation_id();
        let b = ctx.next_invocation_id();
        assert_ne!(a, b);
    }
}
