//! Current-receiver-only access checks.
//!
//! Schema members flagged `access_from_current_receiver_only` may only be
//! used against the receiver of the innermost open block: `x = 1` inside
//! `inner { ... }` is fine, while `inner.x = 1` or `x = 1` from a block
//! nested deeper inside `inner` is not. The check compares origins, not
//! types.

use decl_common::LanguageTreeElement;

use crate::context::AnalysisContext;
use crate::error::{ErrorReason, ResolutionError};
use crate::origin::ObjectOrigin;

/// Record a violation at `access` unless `receiver` is the current
/// receiver. Resolution continues either way.
pub fn check_access_on_current_receiver(
    context: &mut AnalysisContext<'_>,
    receiver: &ObjectOrigin,
    access: LanguageTreeElement<'_>,
) {
    if !context.is_current_receiver(receiver) {
        context.report(ResolutionError::new(
            access.range(),
            ErrorReason::AccessOnCurrentReceiverOnlyViolation,
        ));
    }
}
