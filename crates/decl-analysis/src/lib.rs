//! Scoped name resolution and static typing for configuration documents.
//!
//! This crate resolves what each expression of a document stands for,
//! checks that assigned values fit their properties, and enforces that
//! members flagged current-receiver-only are used only against the
//! innermost implicit receiver.
//!
//! # Architecture
//!
//! - [`origin`]: `ObjectOrigin`, the provenance of every resolved value
//! - [`context`]: the receiver scope stack and error sink (`AnalysisContext`)
//! - [`types`]: static type derivation from origins
//! - [`assignability`]: the assignability relation between static types
//! - [`access`]: the current-receiver-only access guard
//! - [`resolve`]: the document walker that drives all of the above
//! - [`error`]: resolution errors
//! - [`diagnostics`]: ariadne rendering of resolution errors

pub mod access;
pub mod assignability;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod origin;
pub mod resolve;
pub mod types;

use std::rc::Rc;

use decl_schema::TypeRefContext;

use crate::error::ResolutionError;
use crate::origin::ObjectOrigin;
use crate::resolve::{AssignmentRecord, DataAddition};

pub use crate::resolve::resolve;

/// The result of resolving a document.
pub struct ResolutionResult {
    /// The receiver of the whole document.
    pub top_level_receiver: ObjectOrigin,
    /// Accepted assignments, in source order.
    pub assignments: Vec<AssignmentRecord>,
    /// Objects created by adding functions, in source order.
    pub additions: Vec<DataAddition>,
    /// Errors found during resolution.
    pub errors: Vec<ResolutionError>,
}

impl ResolutionResult {
    /// The value a property of `receiver` ends up with: the last accepted
    /// assignment, else its default value if it declares one.
    ///
    /// Assignments made through a local alias of `receiver` or through a
    /// builder call on it count as assignments to `receiver`.
    pub fn assigned_value<C>(
        &self,
        type_refs: &C,
        receiver: &ObjectOrigin,
        property_name: &str,
    ) -> Option<ObjectOrigin>
    where
        C: TypeRefContext + ?Sized,
    {
        let object = receiver.resolved_object();
        let assigned = self.assignments.iter().rev().find(|a| {
            a.lhs.property.name == property_name && a.lhs.receiver.resolved_object() == object
        });
        if let Some(assignment) = assigned {
            return Some(assignment.rhs.clone());
        }

        let receiver_type = types::get_data_type(type_refs, receiver);
        let property = receiver_type.as_data_class()?.property(property_name)?.clone();
        if !property.has_default_value {
            return None;
        }
        Some(ObjectOrigin::PropertyDefaultValue {
            receiver: Rc::new(receiver.clone()),
            property,
            origin_element: receiver.origin_element(),
        })
    }

    /// Render every error as a diagnostic string.
    pub fn render_errors(&self, source: &str, filename: &str) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| diagnostics::render_diagnostic(e, source, filename))
            .collect()
    }
}
