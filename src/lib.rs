//! Qualify table and type references in SQL and data-model files with their database schema.
#![warn(missing_docs)]

/// Schema-set configuration: ordered schema definitions and the files they own.
pub mod config;
/// File driver, atomic whole-file replacement, and run summaries.
pub mod output;
/// Rule-pipeline composition and the pure text qualifier.
pub mod qualifier;
/// Named rewrite rules, one per syntactic context, each with an idempotence guard.
pub mod rules;
