use std::fmt;

/// Syntactic context a rewrite rule recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntacticContext {
    /// `@@map("...")` marker lines in data-model definitions.
    AttributeMarker,
    /// `enum <Name> { ... }` blocks in data-model definitions.
    EnumBlock,
    /// `CREATE TABLE [IF NOT EXISTS] <name> (` statements.
    TableCreation,
    /// `INSERT INTO <name>` statements.
    DataInsertion,
    /// `REFERENCES <name>` clauses.
    ForeignKeyReference,
    /// Quoted enum-type references outside their definition site.
    TypeReference,
    /// The `SET search_path` preamble at the top of a script.
    SearchPath,
}

impl fmt::Display for SyntacticContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SyntacticContext::AttributeMarker => "attribute-marker",
            SyntacticContext::EnumBlock => "enum-block",
            SyntacticContext::TableCreation => "table-creation",
            SyntacticContext::DataInsertion => "data-insertion",
            SyntacticContext::ForeignKeyReference => "foreign-key-reference",
            SyntacticContext::TypeReference => "type-reference",
            SyntacticContext::SearchPath => "search-path",
        };
        write!(f, "{label}")
    }
}

/// Result of applying one rule to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    /// Document text after the rule ran.
    pub text: String,
    /// Number of sites the rule rewrote; zero means the rule was a no-op.
    pub rewrites: usize,
}

impl Rewritten {
    /// A pass that changed nothing.
    pub fn unchanged(document: &str) -> Self {
        Self {
            text: document.to_string(),
            rewrites: 0,
        }
    }
}

/// A named text-rewrite rule.
///
/// Implementations are pure (no I/O) and idempotent: applying a rule to its own
/// output performs zero further rewrites. Every rule carries an explicit guard
/// for the already-qualified form it would otherwise produce, so the pipeline
/// can be re-run over processed files safely.
pub trait RewriteRule {
    /// Stable rule name used in diagnostics and run summaries.
    fn name(&self) -> &'static str;

    /// The syntactic context this rule recognizes.
    fn context(&self) -> SyntacticContext;

    /// Apply the rule to `document`.
    fn apply(&self, document: &str) -> Rewritten;
}
