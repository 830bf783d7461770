use std::collections::HashMap;

use regex::{Captures, Regex};

use crate::rules::names::{normalize_identifier, split_qualified};
use crate::rules::rule::{RewriteRule, Rewritten, SyntacticContext};

/// Matches a single SQL identifier, quoted or unquoted.
const IDENT: &str = r#"(?:[A-Za-z_][A-Za-z0-9_$]*|"[^"]+")"#;

/// Matches an object name with any number of qualifier segments.
fn object_name_pattern() -> String {
    format!(r"{IDENT}(?:\.{IDENT})*")
}

/// Registered object names for one schema, keyed by their normalized form.
///
/// Lookup answers the one question every statement rule asks: given the raw
/// name token at a match site, what is its qualified replacement, if any?
#[derive(Debug, Clone)]
struct NameRegistry {
    schema: String,
    canonical: HashMap<String, String>,
}

impl NameRegistry {
    fn new(schema: &str, names: &[String]) -> Self {
        let canonical = names
            .iter()
            .map(|name| (normalize_identifier(name), name.clone()))
            .collect();
        Self {
            schema: schema.to_string(),
            canonical,
        }
    }

    /// Qualified replacement for `raw`, or `None` when the site must stay as
    /// written: names that already carry a qualifier, and names outside the
    /// registry.
    fn qualify(&self, raw: &str) -> Option<String> {
        if split_qualified(raw).is_some() {
            return None;
        }
        let canonical = self.canonical.get(&normalize_identifier(raw))?;
        Some(format!("{}.{canonical}", self.schema))
    }
}

/// Run `pattern` over `document`, rewriting each match for which `replace`
/// returns a replacement and counting the sites rewritten.
fn replace_counted<F>(pattern: &Regex, document: &str, mut replace: F) -> Rewritten
where
    F: FnMut(&Captures<'_>) -> Option<String>,
{
    let mut rewrites = 0usize;
    let text = pattern
        .replace_all(document, |caps: &Captures<'_>| match replace(caps) {
            Some(replacement) => {
                rewrites += 1;
                replacement
            }
            None => caps[0].to_string(),
        })
        .into_owned();
    Rewritten { text, rewrites }
}

/// Qualifies table names in `CREATE TABLE [IF NOT EXISTS] <name> (` statements.
///
/// Accepts quoted or unquoted names in any case, preserves the optional
/// `IF NOT EXISTS` and the statement's spacing, and emits the registry's
/// canonical casing without quotes.
#[derive(Debug)]
pub struct CreateTableRule {
    registry: NameRegistry,
    pattern: Regex,
}

impl CreateTableRule {
    /// Build the rule for `schema` and its registered `tables`.
    pub fn new(schema: &str, tables: &[String]) -> Result<Self, String> {
        let pattern = Regex::new(&format!(
            r"(?i)\b(CREATE\s+TABLE)(\s+)(IF\s+NOT\s+EXISTS\s+)?({name})(\s*\()",
            name = object_name_pattern(),
        ))
        .map_err(|e| format!("Invalid table-creation pattern: {e}"))?;
        Ok(Self {
            registry: NameRegistry::new(schema, tables),
            pattern,
        })
    }
}

impl RewriteRule for CreateTableRule {
    fn name(&self) -> &'static str {
        "create-table"
    }

    fn context(&self) -> SyntacticContext {
        SyntacticContext::TableCreation
    }

    fn apply(&self, document: &str) -> Rewritten {
        replace_counted(&self.pattern, document, |caps| {
            let qualified = self.registry.qualify(&caps[4])?;
            Some(format!(
                "{}{}{}{qualified}{}",
                &caps[1],
                &caps[2],
                caps.get(3).map_or("", |m| m.as_str()),
                &caps[5],
            ))
        })
    }
}

/// Qualifies table names in `INSERT INTO <name>` statements.
#[derive(Debug)]
pub struct InsertIntoRule {
    registry: NameRegistry,
    pattern: Regex,
}

impl InsertIntoRule {
    /// Build the rule for `schema` and its registered `tables`.
    pub fn new(schema: &str, tables: &[String]) -> Result<Self, String> {
        let pattern = Regex::new(&format!(
            r"(?i)\b(INSERT\s+INTO)(\s+)({name})",
            name = object_name_pattern(),
        ))
        .map_err(|e| format!("Invalid data-insertion pattern: {e}"))?;
        Ok(Self {
            registry: NameRegistry::new(schema, tables),
            pattern,
        })
    }
}

impl RewriteRule for InsertIntoRule {
    fn name(&self) -> &'static str {
        "insert-into"
    }

    fn context(&self) -> SyntacticContext {
        SyntacticContext::DataInsertion
    }

    fn apply(&self, document: &str) -> Rewritten {
        replace_counted(&self.pattern, document, |caps| {
            let qualified = self.registry.qualify(&caps[3])?;
            Some(format!("{}{}{qualified}", &caps[1], &caps[2]))
        })
    }
}

/// Qualifies table names in `REFERENCES <name>` foreign-key clauses.
#[derive(Debug)]
pub struct ReferencesRule {
    registry: NameRegistry,
    pattern: Regex,
}

impl ReferencesRule {
    /// Build the rule for `schema` and its registered `tables`.
    pub fn new(schema: &str, tables: &[String]) -> Result<Self, String> {
        let pattern = Regex::new(&format!(
            r"(?i)\b(REFERENCES)(\s+)({name})",
            name = object_name_pattern(),
        ))
        .map_err(|e| format!("Invalid foreign-key pattern: {e}"))?;
        Ok(Self {
            registry: NameRegistry::new(schema, tables),
            pattern,
        })
    }
}

impl RewriteRule for ReferencesRule {
    fn name(&self) -> &'static str {
        "references"
    }

    fn context(&self) -> SyntacticContext {
        SyntacticContext::ForeignKeyReference
    }

    fn apply(&self, document: &str) -> Rewritten {
        replace_counted(&self.pattern, document, |caps| {
            let qualified = self.registry.qualify(&caps[3])?;
            Some(format!("{}{}{qualified}", &caps[1], &caps[2]))
        })
    }
}

/// Qualifies quoted references to registered enum types, e.g. `"Status"` to
/// `backend."Status"`.
///
/// The definition site (`CREATE TYPE "Status" AS ENUM ...`) is left alone, as
/// is any reference that already carries a qualifier. Type names are matched
/// case-sensitively; quoted identifiers preserve case in SQL.
#[derive(Debug)]
pub struct TypeReferenceRule {
    schema: String,
    pattern: Regex,
}

impl TypeReferenceRule {
    /// Build the rule for `schema` and its registered enum `types`.
    ///
    /// `types` must be non-empty; the caller skips the rule otherwise.
    pub fn new(schema: &str, types: &[String]) -> Result<Self, String> {
        let alternation = types
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(
            r#"((?:{IDENT}\.)*)("(?:{alternation})")((?i:\s+AS\s+ENUM))?"#
        ))
        .map_err(|e| format!("Invalid type-reference pattern: {e}"))?;
        Ok(Self {
            schema: schema.to_string(),
            pattern,
        })
    }
}

impl RewriteRule for TypeReferenceRule {
    fn name(&self) -> &'static str {
        "type-reference"
    }

    fn context(&self) -> SyntacticContext {
        SyntacticContext::TypeReference
    }

    fn apply(&self, document: &str) -> Rewritten {
        replace_counted(&self.pattern, document, |caps| {
            if caps.get(3).is_some() {
                // Definition site: CREATE TYPE "..." AS ENUM stays unqualified.
                return None;
            }
            if !caps[1].is_empty() {
                return None;
            }
            Some(format!("{}.{}", self.schema, &caps[2]))
        })
    }
}

/// Collapses a doubled schema qualifier (`backend.backend.`) back to a single
/// one, regardless of repetition count.
///
/// Repairs output left behind by earlier, guard-less script runs.
#[derive(Debug)]
pub struct CollapseDoubledRule {
    schema: String,
    pattern: Regex,
}

impl CollapseDoubledRule {
    /// Build the rule for `schema`.
    pub fn new(schema: &str) -> Result<Self, String> {
        let escaped = regex::escape(schema);
        let pattern = Regex::new(&format!(r"\b(?:{escaped}\.){{2,}}"))
            .map_err(|e| format!("Invalid doubled-qualifier pattern: {e}"))?;
        Ok(Self {
            schema: schema.to_string(),
            pattern,
        })
    }
}

impl RewriteRule for CollapseDoubledRule {
    fn name(&self) -> &'static str {
        "collapse-doubled-qualifier"
    }

    fn context(&self) -> SyntacticContext {
        SyntacticContext::TypeReference
    }

    fn apply(&self, document: &str) -> Rewritten {
        replace_counted(&self.pattern, document, |_| Some(format!("{}.", self.schema)))
    }
}

/// Prepends the namespace-search preamble when a script does not declare one:
/// a banner comment and `SET search_path TO <schema>[, <deps>...], <fallback>;`.
#[derive(Debug)]
pub struct SearchPathRule {
    banner: String,
    search_path: Vec<String>,
    guard: Regex,
}

impl SearchPathRule {
    /// Build the rule with the banner `label` and the full ordered search path.
    pub fn new(label: &str, search_path: &[String]) -> Result<Self, String> {
        let guard = Regex::new(r"(?im)^\s*SET\s+search_path\b")
            .map_err(|e| format!("Invalid search-path guard pattern: {e}"))?;
        Ok(Self {
            banner: label.to_string(),
            search_path: search_path.to_vec(),
            guard,
        })
    }

    /// True when the document already declares a namespace-search preamble.
    pub fn already_declared(&self, document: &str) -> bool {
        self.guard.is_match(document)
    }
}

impl RewriteRule for SearchPathRule {
    fn name(&self) -> &'static str {
        "search-path"
    }

    fn context(&self) -> SyntacticContext {
        SyntacticContext::SearchPath
    }

    fn apply(&self, document: &str) -> Rewritten {
        if self.already_declared(document) {
            return Rewritten::unchanged(document);
        }
        let preamble = format!(
            "-- {} Schema Tables\nSET search_path TO {};\n\n",
            self.banner,
            self.search_path.join(", "),
        );
        Rewritten {
            text: format!("{preamble}{document}"),
            rewrites: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn registry_qualifies_bare_registered_names_only() {
        let registry = NameRegistry::new("backend", &tables(&["sys_user"]));
        assert_eq!(
            registry.qualify("sys_user"),
            Some("backend.sys_user".to_string())
        );
        assert_eq!(
            registry.qualify("\"SYS_USER\""),
            Some("backend.sys_user".to_string())
        );
        assert_eq!(registry.qualify("backend.sys_user"), None);
        assert_eq!(registry.qualify("unknown"), None);
    }

    #[test]
    fn create_table_preserves_if_not_exists_spacing() {
        let rule = CreateTableRule::new("backend", &tables(&["sys_user"])).unwrap();
        let out = rule.apply("CREATE TABLE IF NOT EXISTS  \"sys_user\" (id int);");
        assert_eq!(out.text, "CREATE TABLE IF NOT EXISTS  backend.sys_user (id int);");
        assert_eq!(out.rewrites, 1);
    }

    #[test]
    fn longer_registered_name_wins_over_its_prefix() {
        let rule = InsertIntoRule::new("backend", &tables(&["sys_user", "sys_user_role"])).unwrap();
        let out = rule.apply("INSERT INTO sys_user_role (user_id) VALUES (1);");
        assert_eq!(out.text, "INSERT INTO backend.sys_user_role (user_id) VALUES (1);");
    }

    #[test]
    fn collapse_doubled_handles_any_repetition_count() {
        let rule = CollapseDoubledRule::new("backend").unwrap();
        let out = rule.apply("SELECT * FROM backend.backend.backend.sys_user;");
        assert_eq!(out.text, "SELECT * FROM backend.sys_user;");
        assert_eq!(out.rewrites, 1);
        assert_eq!(rule.apply(&out.text).rewrites, 0);
    }

    #[test]
    fn collapse_doubled_requires_word_boundary() {
        let rule = CollapseDoubledRule::new("backend").unwrap();
        let doc = "SELECT * FROM mybackend.backend.t;";
        assert_eq!(rule.apply(doc).text, doc);
    }

    #[test]
    fn search_path_guard_is_case_insensitive() {
        let rule = SearchPathRule::new("Backend", &tables(&["backend", "public"])).unwrap();
        assert!(rule.already_declared("set SEARCH_PATH to backend;"));
        assert!(!rule.already_declared("-- no preamble here"));
    }
}
