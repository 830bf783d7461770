/// File driver: walks the schema set, qualifies each target file, and
/// replaces it atomically.
pub mod driver;
/// Human-readable run summary.
pub mod report;
