/// Ordered schema definitions, their member objects, and the files they own.
pub mod schema_set;
