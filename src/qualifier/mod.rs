/// The compiled per-schema rule pipeline and context selection.
pub mod engine;
