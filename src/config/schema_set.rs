use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::rules::names::is_bare_identifier;

/// One database schema: its name, member objects, and the files it owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDef {
    /// Schema (namespace) name used as the qualification prefix.
    pub name: String,
    /// Banner label for the search-path preamble; defaults to the capitalized
    /// schema name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Member table names, in canonical casing.
    #[serde(default)]
    pub tables: Vec<String>,
    /// Member enum type names; these appear double-quoted in SQL.
    #[serde(default)]
    pub types: Vec<String>,
    /// Schemas searched after this one when resolving unqualified names.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Target files owned by this schema, relative to the run root.
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

impl SchemaDef {
    /// The banner label used in the search-path preamble comment.
    pub fn banner_label(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Ordered set of schema definitions for one run.
///
/// Ordering is significant: files are processed in declaration order, so a
/// schema can rely on its dependencies having been qualified first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSet {
    /// Schemas in processing order.
    pub schemas: Vec<SchemaDef>,
    /// Schema appended last to every search path.
    #[serde(default = "default_fallback")]
    pub fallback_schema: String,
}

fn default_fallback() -> String {
    "public".to_string()
}

impl SchemaSet {
    /// The compiled-in platform layout: the `backend` system tables and the
    /// `lowcode` designer tables, with their deployment SQL files.
    pub fn builtin() -> Self {
        let backend = SchemaDef {
            name: "backend".to_string(),
            label: Some("Backend".to_string()),
            tables: to_strings(&[
                "sys_tokens",
                "sys_user",
                "casbin_rule",
                "sys_access_key",
                "sys_domain",
                "sys_endpoint",
                "sys_login_log",
                "sys_lowcode_page",
                "sys_lowcode_page_version",
                "sys_menu",
                "sys_operation_log",
                "sys_organization",
                "sys_role",
                "sys_role_menu",
                "sys_user_role",
            ]),
            types: to_strings(&["Status", "MenuType"]),
            depends_on: Vec::new(),
            files: to_paths(&[
                "postgres/01_create_table.sql",
                "postgres/02_sys_user.sql",
                "postgres/03_sys_role.sql",
                "postgres/04_sys_menu.sql",
                "postgres/05_sys_domain.sql",
                "postgres/06_sys_user_role.sql",
                "postgres/07_sys_role_menu.sql",
                "postgres/08_casbin_rule.sql",
                "postgres/09_lowcode_pages.sql",
            ]),
        };
        let lowcode = SchemaDef {
            name: "lowcode".to_string(),
            label: Some("Lowcode Platform".to_string()),
            tables: to_strings(&[
                "lowcode_projects",
                "lowcode_entities",
                "lowcode_fields",
                "lowcode_relations",
                "lowcode_api_configs",
                "lowcode_apis",
                "lowcode_queries",
                "lowcode_codegen_tasks",
                "lowcode_code_templates",
            ]),
            types: Vec::new(),
            depends_on: to_strings(&["backend"]),
            files: to_paths(&[
                "postgres/10_lowcode_platform_tables.sql",
                "postgres/11_lowcode_platform_data.sql",
                "postgres/12_lowcode_queries_init.sql",
                "postgres/13_prisma_templates_update.sql",
                "postgres/14_code_generation_menus.sql",
            ]),
        };
        Self {
            schemas: vec![backend, lowcode],
            fallback_schema: default_fallback(),
        }
    }

    /// Load and validate a schema set from a JSON string.
    pub fn load_from_json(json: &str) -> Result<Self, String> {
        let set: Self =
            serde_json::from_str(json).map_err(|e| format!("Invalid schema-set JSON: {e}"))?;
        set.validate()?;
        Ok(set)
    }

    /// Load and validate a schema set from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        Self::load_from_json(&json)
    }

    /// Check structural soundness: at least one schema, unique bare-identifier
    /// schema names, and bare-identifier object names throughout.
    ///
    /// Name validity is what allows rewrite patterns to be built from
    /// configuration by escaping, without further quoting concerns.
    pub fn validate(&self) -> Result<(), String> {
        if self.schemas.is_empty() {
            return Err("Schema set must define at least one schema".to_string());
        }
        if !is_bare_identifier(&self.fallback_schema) {
            return Err(format!(
                "Invalid fallback schema name: `{}`",
                self.fallback_schema
            ));
        }
        let mut seen: Vec<&str> = Vec::new();
        for schema in &self.schemas {
            if !is_bare_identifier(&schema.name) {
                return Err(format!("Invalid schema name: `{}`", schema.name));
            }
            if seen.contains(&schema.name.as_str()) {
                return Err(format!("Duplicate schema name: `{}`", schema.name));
            }
            seen.push(&schema.name);
            for table in &schema.tables {
                if !is_bare_identifier(table) {
                    return Err(format!(
                        "Invalid table name `{table}` in schema `{}`",
                        schema.name
                    ));
                }
            }
            for ty in &schema.types {
                if !is_bare_identifier(ty) {
                    return Err(format!(
                        "Invalid type name `{ty}` in schema `{}`",
                        schema.name
                    ));
                }
            }
            for dep in &schema.depends_on {
                if !is_bare_identifier(dep) {
                    return Err(format!(
                        "Invalid dependency `{dep}` in schema `{}`",
                        schema.name
                    ));
                }
            }
        }
        Ok(())
    }

    /// The namespace-search order for `schema`: the schema itself, its
    /// dependencies, then the fallback.
    pub fn search_path(&self, schema: &SchemaDef) -> Vec<String> {
        let mut path = vec![schema.name.clone()];
        for dep in &schema.depends_on {
            if !path.contains(dep) {
                path.push(dep.clone());
            }
        }
        if !path.contains(&self.fallback_schema) {
            path.push(self.fallback_schema.clone());
        }
        path
    }

    /// Look up a schema by name.
    pub fn schema(&self, name: &str) -> Option<&SchemaDef> {
        self.schemas.iter().find(|schema| schema.name == name)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn to_paths(values: &[&str]) -> Vec<PathBuf> {
    values.iter().map(PathBuf::from).collect()
}
