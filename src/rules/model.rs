use regex::Regex;

use crate::rules::rule::{RewriteRule, Rewritten, SyntacticContext};

/// Inserts `@@schema("<schema>")` after each `@@map("...")` marker line in a
/// data-model definition, at the marker's indentation.
///
/// A marker that is already immediately followed by a schema marker is left
/// untouched, which keeps repeat runs no-ops.
#[derive(Debug)]
pub struct MapMarkerRule {
    schema: String,
    marker: Regex,
    schema_marker: Regex,
}

impl MapMarkerRule {
    /// Build the rule for `schema`.
    pub fn new(schema: &str) -> Result<Self, String> {
        let marker = Regex::new(r#"^(\s*)@@map\("#)
            .map_err(|e| format!("Invalid attribute-marker pattern: {e}"))?;
        let schema_marker = Regex::new(r#"^\s*@@schema\("#)
            .map_err(|e| format!("Invalid schema-marker pattern: {e}"))?;
        Ok(Self {
            schema: schema.to_string(),
            marker,
            schema_marker,
        })
    }

    /// True when the line after `index` already carries a schema marker.
    fn annotated(&self, lines: &[&str], index: usize) -> bool {
        lines
            .get(index + 1)
            .is_some_and(|line| self.schema_marker.is_match(line))
    }
}

impl RewriteRule for MapMarkerRule {
    fn name(&self) -> &'static str {
        "map-marker"
    }

    fn context(&self) -> SyntacticContext {
        SyntacticContext::AttributeMarker
    }

    fn apply(&self, document: &str) -> Rewritten {
        let lines: Vec<&str> = document.lines().collect();
        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        let mut rewrites = 0usize;

        for (index, line) in lines.iter().enumerate() {
            out.push((*line).to_string());
            if let Some(caps) = self.marker.captures(line) {
                if !self.annotated(&lines, index) {
                    let indent = caps.get(1).map_or("", |m| m.as_str());
                    out.push(format!("{indent}@@schema(\"{}\")", self.schema));
                    rewrites += 1;
                }
            }
        }

        let mut text = out.join("\n");
        if document.ends_with('\n') {
            text.push('\n');
        }
        Rewritten { text, rewrites }
    }
}

/// Adds `@@schema("<schema>")` inside each `enum <Name> { ... }` block of a
/// data-model definition, ahead of the closing brace.
///
/// A block that already contains a schema marker anywhere in its body is left
/// untouched.
#[derive(Debug)]
pub struct EnumBlockRule {
    schema: String,
    block: Regex,
}

impl EnumBlockRule {
    /// Build the rule for `schema`.
    pub fn new(schema: &str) -> Result<Self, String> {
        let block = Regex::new(r"(?s)\benum\s+[A-Za-z_][A-Za-z0-9_]*\s*\{.*?\n\}")
            .map_err(|e| format!("Invalid enum-block pattern: {e}"))?;
        Ok(Self {
            schema: schema.to_string(),
            block,
        })
    }
}

impl RewriteRule for EnumBlockRule {
    fn name(&self) -> &'static str {
        "enum-block"
    }

    fn context(&self) -> SyntacticContext {
        SyntacticContext::EnumBlock
    }

    fn apply(&self, document: &str) -> Rewritten {
        let mut rewrites = 0usize;
        let text = self
            .block
            .replace_all(document, |caps: &regex::Captures<'_>| {
                let block = &caps[0];
                if block.contains("@@schema") {
                    return block.to_string();
                }
                rewrites += 1;
                // The match always ends with "\n}".
                let body = &block[..block.len() - 2];
                format!("{body}\n\n  @@schema(\"{}\")\n}}", self.schema)
            })
            .into_owned();
        Rewritten { text, rewrites }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_marker_keeps_indentation_of_the_marker_line() {
        let rule = MapMarkerRule::new("backend").unwrap();
        let out = rule.apply("model User {\n  id Int @id\n\n    @@map(\"users\")\n}\n");
        assert_eq!(
            out.text,
            "model User {\n  id Int @id\n\n    @@map(\"users\")\n    @@schema(\"backend\")\n}\n"
        );
        assert_eq!(out.rewrites, 1);
    }

    #[test]
    fn map_marker_skips_markers_already_annotated() {
        let rule = MapMarkerRule::new("backend").unwrap();
        let doc = "  @@map(\"users\")\n  @@schema(\"backend\")\n";
        let out = rule.apply(doc);
        assert_eq!(out.text, doc);
        assert_eq!(out.rewrites, 0);
    }

    #[test]
    fn enum_block_annotates_ahead_of_the_closing_brace() {
        let rule = EnumBlockRule::new("backend").unwrap();
        let out = rule.apply("enum Status {\n  ENABLED\n  DISABLED\n}\n");
        assert_eq!(
            out.text,
            "enum Status {\n  ENABLED\n  DISABLED\n\n  @@schema(\"backend\")\n}\n"
        );
        assert_eq!(out.rewrites, 1);
    }

    #[test]
    fn enum_block_with_marker_is_untouched() {
        let rule = EnumBlockRule::new("backend").unwrap();
        let doc = "enum Status {\n  ENABLED\n\n  @@schema(\"backend\")\n}\n";
        let out = rule.apply(doc);
        assert_eq!(out.text, doc);
        assert_eq!(out.rewrites, 0);
    }
}
