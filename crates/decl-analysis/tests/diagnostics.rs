//! Rendering of resolution errors through the ariadne diagnostic pipeline.
//!
//! Each test triggers a specific error, renders it, and checks for the
//! error code, the message, the labeled source line and any fix
//! suggestion.

mod common;

use common::*;
use decl_analysis::diagnostics::render_diagnostic;
use decl_analysis::{resolve, ResolutionResult};
use decl_common::{DataStatement, Expr};
use decl_schema::{
    AnalysisSchema, ConfigureAccessor, DataClass, DataProperty, DataType, DataTypeRef,
    FunctionSemantics, SchemaMemberFunction,
};

// ── Helpers ────────────────────────────────────────────────────────────

fn schema() -> AnalysisSchema {
    let top = DataClass::new("test.Top")
        .with_property(DataProperty::new("count", DataType::long()))
        .with_property(DataProperty::new("name", DataType::string()))
        .with_property(DataProperty::new("inner", DataTypeRef::name("test.Inner")).read_only())
        .with_function(SchemaMemberFunction::new(
            "inner",
            vec![],
            FunctionSemantics::AccessAndConfigure {
                accessor: ConfigureAccessor::new("inner", DataTypeRef::name("test.Inner")),
            },
        ));
    let inner = DataClass::new("test.Inner")
        .with_property(DataProperty::new("x", DataType::int()).current_receiver_only());
    AnalysisSchema::new("test.Top".into(), vec![top, inner], vec![], vec![]).unwrap()
}

fn check(doc: &Doc, statements: Vec<DataStatement>) -> ResolutionResult {
    resolve(&schema(), &doc.root(statements))
}

/// Render the first error of a document as a diagnostic string.
fn render_first_error(doc: &Doc, statements: Vec<DataStatement>) -> String {
    let result = check(doc, statements);
    assert!(
        !result.errors.is_empty(),
        "expected at least one error for source: {:?}",
        doc.text
    );
    render_diagnostic(&result.errors[0], doc.text, "test.decl")
}

// ── Diagnostic Tests ───────────────────────────────────────────────────

#[test]
fn test_diag_access_on_outer_receiver() {
    let doc = Doc::new("inner.x = 1");
    let output = render_first_error(
        &doc,
        vec![assign(
            prop_on(
                read(prop("inner", doc.find("inner", 0))),
                "x",
                doc.find("inner.x", 0),
            ),
            int(1, doc.find("1", 0)),
        )],
    );

    assert!(output.contains("E0101"), "{output}");
    assert!(output.contains("member can only be accessed on the current receiver"));
    assert!(output.contains("not accessed on the current receiver"));
    assert!(output.contains("inner.x = 1"));
    assert!(output.contains("test.decl"), "report should name the source file");
    assert!(output.contains("move this into the block that configures its owner"));
}

#[test]
fn test_diag_int_for_long_suggests_long_literal() {
    let doc = Doc::new("count = 1");
    let output = render_first_error(
        &doc,
        vec![assign(prop("count", doc.find("count", 0)), int(1, doc.find("1", 0)))],
    );

    assert!(output.contains("E0104"), "{output}");
    assert!(output.contains("expected Long, found Int"));
    assert!(output.contains("1L"));
}

#[test]
fn test_diag_read_only_assignment() {
    let doc = Doc::new("inner = null");
    let output = render_first_error(
        &doc,
        vec![assign(prop("inner", doc.find("inner", 0)), Expr::Null(doc.find("null", 0)))],
    );

    assert!(output.contains("E0105"), "{output}");
    assert!(output.contains("configure `inner` with a block instead"));
}

#[test]
fn test_diag_unresolved_reference_has_no_help() {
    let doc = Doc::new("name = nobody");
    let output = render_first_error(
        &doc,
        vec![assign(
            prop("name", doc.find("name", 0)),
            read(prop("nobody", doc.find("nobody", 0))),
        )],
    );

    assert!(output.contains("E0102"), "{output}");
    assert!(output.contains("`nobody`"));
    assert!(!output.contains("Help"));
}

#[test]
fn test_render_errors_renders_every_error() {
    let doc = Doc::new(
        r#"count = "many"
name = 1"#,
    );
    let result = check(
        &doc,
        vec![
            assign(
                prop("count", doc.find("count", 0)),
                string("many", doc.find(r#""many""#, 0)),
            ),
            assign(prop("name", doc.find("name", 0)), int(1, doc.find("1", 0))),
        ],
    );

    let rendered = result.render_errors(doc.text, "test.decl");
    assert_eq!(rendered.len(), 2);
    assert!(rendered[0].contains("expected Long, found String"));
    assert!(rendered[1].contains("expected String, found Int"));
    assert!(rendered.iter().all(|r| r.contains("test.decl")));
}
