use schemafix::config::schema_set::SchemaSet;
use schemafix::qualifier::engine::{ContextSet, Qualifier};
use schemafix::rules::rule::SyntacticContext;

mod support;

fn qualify_preamble_only(document: &str) -> String {
    support::backend_qualifier(&ContextSet::new(&[SyntacticContext::SearchPath]))
        .qualify(document)
        .text
}

#[test]
fn preamble_is_prepended_with_banner_and_fallback() {
    let out = qualify_preamble_only("CREATE TABLE sys_user (id int);\n");
    assert_eq!(
        out,
        "-- Backend Schema Tables\nSET search_path TO backend, public;\n\nCREATE TABLE sys_user (id int);\n"
    );
}

#[test]
fn declared_search_path_is_left_alone() {
    let doc = "SET search_path TO backend, public;\n\nCREATE TABLE sys_user (id int);\n";
    assert_eq!(qualify_preamble_only(doc), doc);
}

#[test]
fn guard_accepts_case_and_indentation_variants() {
    let doc = "  set Search_Path to backend;\nSELECT 1;\n";
    assert_eq!(qualify_preamble_only(doc), doc);
}

#[test]
fn dependent_schema_search_path_lists_dependencies_in_order() {
    let set = SchemaSet::builtin();
    let lowcode = set.schema("lowcode").expect("builtin should define lowcode");
    let qualifier = Qualifier::new(
        lowcode,
        &set.search_path(lowcode),
        &ContextSet::new(&[SyntacticContext::SearchPath]),
    )
    .expect("lowcode rule set should compile");

    let out = qualifier.qualify("SELECT 1;\n").text;
    assert!(out.starts_with(
        "-- Lowcode Platform Schema Tables\nSET search_path TO lowcode, backend, public;\n\n"
    ));
}

#[test]
fn empty_document_still_gains_a_preamble() {
    let out = qualify_preamble_only("");
    assert_eq!(out, "-- Backend Schema Tables\nSET search_path TO backend, public;\n\n");
}
