use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::penman;
use crate::error::Result;

/// Role of the triple that gives a variable its concept.
pub const INSTANCE_ROLE: &str = ":instance";

/// One `(source, role, target)` edge or attribute of an AMR graph.
///
/// Roles keep their leading colon. Targets are raw PENMAN atoms, so string
/// constants keep their quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub source: String,
    pub role: String,
    pub target: String,
}

impl Triple {
    #[must_use]
    pub fn new(source: impl Into<String>, role: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            role: role.into(),
            target: target.into(),
        }
    }

    #[must_use]
    pub fn is_instance(&self) -> bool {
        self.role == INSTANCE_ROLE
    }

    /// The role name without its leading colon.
    #[must_use]
    pub fn role_name(&self) -> &str {
        self.role.strip_prefix(':').unwrap_or(&self.role)
    }
}

/// A rooted AMR graph as an ordered triple list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmrGraph {
    pub top: String,
    pub triples: Vec<Triple>,
}

impl AmrGraph {
    #[must_use]
    pub const fn new(top: String, triples: Vec<Triple>) -> Self {
        Self { top, triples }
    }

    /// Decode a graph from PENMAN notation (no metadata lines).
    pub fn parse(text: &str) -> Result<Self> {
        penman::decode(text)
    }

    /// Encode the graph to PENMAN notation.
    #[must_use]
    pub fn format(&self) -> String {
        penman::encode(self)
    }

    /// Triples that give a variable its concept.
    pub fn instances(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter().filter(|t| t.is_instance())
    }

    /// Every triple that is not an instance triple.
    pub fn edges(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter().filter(|t| !t.is_instance())
    }

    #[must_use]
    pub fn variables(&self) -> HashSet<&str> {
        self.instances().map(|t| t.source.as_str()).collect()
    }

    #[must_use]
    pub fn concept(&self, var: &str) -> Option<&str> {
        self.instances()
            .find(|t| t.source == var)
            .map(|t| t.target.as_str())
    }

    /// Whether any triple uses a role whose name starts with `prefix`.
    #[must_use]
    pub fn has_role_prefix(&self, prefix: &str) -> bool {
        self.triples.iter().any(|t| t.role_name().starts_with(prefix))
    }
}

impl std::fmt::Display for AmrGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format())
    }
}

/// Return the value of a constant, removing quotes and escapes from strings.
#[must_use]
pub fn evaluate_constant(atom: &str) -> String {
    let Some(inner) = atom
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    else {
        return atom.to_string();
    };
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                value.push(escaped);
            }
        } else {
            value.push(c);
        }
    }
    value
}

/// Quote `value` unless it can stand as a bare PENMAN symbol.
#[must_use]
pub fn quote_constant(value: &str) -> String {
    let bare = !value.is_empty()
        && value
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | ':' | '~' | '/'));
    if bare {
        value.to_string()
    } else {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    }
}
