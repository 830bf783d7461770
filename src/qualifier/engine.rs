use std::path::Path;

use crate::config::schema_set::SchemaDef;
use crate::rules::model::{EnumBlockRule, MapMarkerRule};
use crate::rules::rule::{RewriteRule, SyntacticContext};
use crate::rules::sql::{
    CollapseDoubledRule, CreateTableRule, InsertIntoRule, ReferencesRule, SearchPathRule,
    TypeReferenceRule,
};

/// Which syntactic contexts a qualification pass rewrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSet {
    contexts: Vec<SyntacticContext>,
}

impl ContextSet {
    /// A set holding exactly the given contexts, first occurrence wins.
    pub fn new(contexts: &[SyntacticContext]) -> Self {
        let mut deduped = Vec::with_capacity(contexts.len());
        for context in contexts {
            if !deduped.contains(context) {
                deduped.push(*context);
            }
        }
        Self { contexts: deduped }
    }

    /// The contexts rewritten in SQL scripts.
    pub fn sql() -> Self {
        Self::new(&[
            SyntacticContext::SearchPath,
            SyntacticContext::TableCreation,
            SyntacticContext::DataInsertion,
            SyntacticContext::ForeignKeyReference,
            SyntacticContext::TypeReference,
        ])
    }

    /// The contexts rewritten in data-model definition files.
    pub fn data_model() -> Self {
        Self::new(&[
            SyntacticContext::AttributeMarker,
            SyntacticContext::EnumBlock,
        ])
    }

    /// Pick the context selection for a target file by extension: `.prisma`
    /// files are data-model definitions, everything else is treated as SQL.
    pub fn for_path(path: &Path) -> Self {
        if path.extension().is_some_and(|ext| ext == "prisma") {
            Self::data_model()
        } else {
            Self::sql()
        }
    }

    /// True when `context` is part of this selection.
    pub fn contains(&self, context: SyntacticContext) -> bool {
        self.contexts.contains(&context)
    }
}

/// Per-rule application count from one qualification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleApplication {
    /// Rule name, as reported by [`RewriteRule::name`].
    pub rule: &'static str,
    /// Number of sites the rule rewrote.
    pub rewrites: usize,
}

/// Outcome of qualifying one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifyOutcome {
    /// The rewritten document text.
    pub text: String,
    /// Per-rule application counts, in pipeline order.
    pub applications: Vec<RuleApplication>,
}

impl QualifyOutcome {
    /// Total number of rewrites across all rules.
    pub fn total_rewrites(&self) -> usize {
        self.applications.iter().map(|a| a.rewrites).sum()
    }
}

/// Compiled rule pipeline for one schema.
///
/// Rules run in a fixed order; each carries its own idempotence guard, so the
/// whole pipeline is idempotent: qualifying already-qualified text performs
/// zero rewrites.
pub struct Qualifier {
    rules: Vec<Box<dyn RewriteRule>>,
}

impl Qualifier {
    /// Compile the rule set for `schema`, given its full namespace-search
    /// order and the contexts to rewrite.
    pub fn new(
        schema: &SchemaDef,
        search_path: &[String],
        contexts: &ContextSet,
    ) -> Result<Self, String> {
        let mut rules: Vec<Box<dyn RewriteRule>> = Vec::new();

        if contexts.contains(SyntacticContext::SearchPath) {
            rules.push(Box::new(SearchPathRule::new(
                &schema.banner_label(),
                search_path,
            )?));
        }
        if contexts.contains(SyntacticContext::TableCreation) && !schema.tables.is_empty() {
            rules.push(Box::new(CreateTableRule::new(&schema.name, &schema.tables)?));
        }
        if contexts.contains(SyntacticContext::DataInsertion) && !schema.tables.is_empty() {
            rules.push(Box::new(InsertIntoRule::new(&schema.name, &schema.tables)?));
        }
        if contexts.contains(SyntacticContext::ForeignKeyReference) && !schema.tables.is_empty() {
            rules.push(Box::new(ReferencesRule::new(&schema.name, &schema.tables)?));
        }
        if contexts.contains(SyntacticContext::TypeReference) && !schema.types.is_empty() {
            rules.push(Box::new(TypeReferenceRule::new(&schema.name, &schema.types)?));
        }
        if contexts.contains(SyntacticContext::TypeReference) {
            // Cleanup runs last among the SQL rules so it also repairs anything
            // an earlier rule would have doubled.
            rules.push(Box::new(CollapseDoubledRule::new(&schema.name)?));
        }
        if contexts.contains(SyntacticContext::AttributeMarker) {
            rules.push(Box::new(MapMarkerRule::new(&schema.name)?));
        }
        if contexts.contains(SyntacticContext::EnumBlock) {
            rules.push(Box::new(EnumBlockRule::new(&schema.name)?));
        }

        Ok(Self { rules })
    }

    /// Apply the pipeline to `document`, returning the rewritten text and
    /// per-rule counts. Pure text-to-text; no I/O.
    pub fn qualify(&self, document: &str) -> QualifyOutcome {
        let mut text = document.to_string();
        let mut applications = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let rewritten = rule.apply(&text);
            text = rewritten.text;
            applications.push(RuleApplication {
                rule: rule.name(),
                rewrites: rewritten.rewrites,
            });
        }
        QualifyOutcome { text, applications }
    }
}
