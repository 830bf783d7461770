#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use schemafix::config::schema_set::{SchemaDef, SchemaSet};
use schemafix::qualifier::engine::{ContextSet, Qualifier};

pub(crate) fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from("tests/fixtures").join(name)
}

pub(crate) fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("fixture should be readable")
}

pub(crate) fn backend_schema() -> SchemaDef {
    SchemaSet::builtin()
        .schema("backend")
        .expect("builtin set should define backend")
        .clone()
}

pub(crate) fn backend_qualifier(contexts: &ContextSet) -> Qualifier {
    let set = SchemaSet::builtin();
    let schema = set
        .schema("backend")
        .expect("builtin set should define backend");
    Qualifier::new(schema, &set.search_path(schema), contexts)
        .expect("backend rule set should compile")
}

pub(crate) fn qualify_sql(document: &str) -> String {
    backend_qualifier(&ContextSet::sql()).qualify(document).text
}

pub(crate) fn qualify_model(document: &str) -> String {
    backend_qualifier(&ContextSet::data_model())
        .qualify(document)
        .text
}

/// Create a unique scratch directory under the system temp dir.
pub(crate) fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}_{nanos}"));
    std::fs::create_dir_all(&dir).expect("should create scratch directory");
    dir
}
