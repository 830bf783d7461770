/// Rewrite rules for data-model definition files (`@@map` markers, enum blocks).
pub mod model;
/// Identifier normalization helpers (schema-qualified names, quoted identifiers).
pub mod names;
/// The `RewriteRule` trait and the syntactic contexts rules target.
pub mod rule;
/// Rewrite rules for SQL scripts (DDL/DML statements, type references, search path).
pub mod sql;
