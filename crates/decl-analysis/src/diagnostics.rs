//! Ariadne-based diagnostic rendering for resolution errors.
//!
//! Renders `ResolutionError`s into labeled, colorless reports with one
//! error code per reason and a help line when a fix is plausible.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

use decl_schema::{ConstantType, DataType};

use crate::error::{ErrorReason, ResolutionError};

// ── Error Codes ────────────────────────────────────────────────────────

/// Assign a unique error code to each ErrorReason variant.
fn error_code(reason: &ErrorReason) -> &'static str {
    match reason {
        ErrorReason::AccessOnCurrentReceiverOnlyViolation => "E0101",
        ErrorReason::UnresolvedReference { .. } => "E0102",
        ErrorReason::UnresolvedFunctionCall { .. } => "E0103",
        ErrorReason::AssignmentTypeMismatch { .. } => "E0104",
        ErrorReason::ReadOnlyPropertyAssignment { .. } => "E0105",
        ErrorReason::DuplicateLocalValue { .. } => "E0106",
        ErrorReason::MissingConfigureBlock { .. } => "E0107",
        ErrorReason::UnexpectedConfigureBlock { .. } => "E0108",
        ErrorReason::NotAnObject { .. } => "E0109",
    }
}

/// Convert a rowan TextRange to a Rust Range<usize> for ariadne.
fn text_range_to_range(range: rowan::TextRange) -> Range<usize> {
    let start: usize = range.start().into();
    let end: usize = range.end().into();
    start..end
}

/// The label shown under the error site.
fn label_message(reason: &ErrorReason) -> String {
    match reason {
        ErrorReason::AccessOnCurrentReceiverOnlyViolation => {
            "not accessed on the current receiver".to_string()
        }
        ErrorReason::UnresolvedReference { .. } => "not found in any enclosing scope".to_string(),
        ErrorReason::UnresolvedFunctionCall { arg_count, .. } => {
            format!("no matching overload for {} argument(s)", arg_count)
        }
        ErrorReason::AssignmentTypeMismatch { expected, actual } => {
            format!("expected {}, found {}", expected, actual)
        }
        ErrorReason::ReadOnlyPropertyAssignment { .. } => "cannot be assigned".to_string(),
        ErrorReason::DuplicateLocalValue { .. } => "declared again here".to_string(),
        ErrorReason::MissingConfigureBlock { .. } => "block expected after this call".to_string(),
        ErrorReason::UnexpectedConfigureBlock { .. } => "unexpected block".to_string(),
        ErrorReason::NotAnObject { ty } => format!("this is a {}", ty),
    }
}

// ── Fix Suggestions ────────────────────────────────────────────────────

fn fix_suggestion(reason: &ErrorReason) -> Option<String> {
    match reason {
        ErrorReason::AccessOnCurrentReceiverOnlyViolation => Some(
            "move this into the block that configures its owner and use it without a receiver"
                .to_string(),
        ),
        ErrorReason::AssignmentTypeMismatch { expected, actual } => match (expected, actual) {
            (
                DataType::Constant(ConstantType::Long),
                DataType::Constant(ConstantType::Int),
            ) => Some("use a Long literal such as `1L`".to_string()),
            (_, DataType::Null) => Some("null values are not supported here".to_string()),
            _ => None,
        },
        ErrorReason::ReadOnlyPropertyAssignment { property } => {
            Some(format!("configure `{}` with a block instead", property))
        }
        ErrorReason::UnresolvedReference { .. }
        | ErrorReason::UnresolvedFunctionCall { .. }
        | ErrorReason::DuplicateLocalValue { .. }
        | ErrorReason::MissingConfigureBlock { .. }
        | ErrorReason::UnexpectedConfigureBlock { .. }
        | ErrorReason::NotAnObject { .. } => None,
    }
}

// ── Main Rendering Function ────────────────────────────────────────────

/// Render a resolution error into a formatted diagnostic string.
///
/// The output is colorless for stable test output. `filename` names the
/// source in the report header.
pub fn render_diagnostic(error: &ResolutionError, source: &str, filename: &str) -> String {
    let config = Config::default().with_color(false);
    let source_len = source.len();

    // Clamp to the source and keep at least one character for ariadne.
    let clamp = |r: Range<usize>| -> Range<usize> {
        let s = r.start.min(source_len);
        let e = r.end.min(source_len).max(s);
        if s == e {
            s..e.saturating_add(1).min(source_len)
        } else {
            s..e
        }
    };

    let span = clamp(text_range_to_range(error.site));
    let mut builder = Report::build(ReportKind::Error, (filename, span.clone()))
        .with_code(error_code(&error.reason))
        .with_message(error.reason.to_string())
        .with_config(config)
        .with_label(
            Label::new((filename, span))
                .with_message(label_message(&error.reason))
                .with_color(Color::Red),
        );
    if let Some(fix) = fix_suggestion(&error.reason) {
        builder.set_help(fix);
    }
    let report = builder.finish();

    let mut buf = Vec::new();
    report
        .write((filename, Source::from(source)), &mut buf)
        .expect("failed to write diagnostic");
    String::from_utf8(buf).expect("diagnostic output should be valid UTF-8")
}
