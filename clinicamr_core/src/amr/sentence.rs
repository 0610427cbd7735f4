use serde::{Deserialize, Serialize};

use super::graph::AmrGraph;
use crate::error::Result;

/// Concept used for sentences the parser could not handle.
const FAILURE_GRAPH: &str = "(a / amr-unknown)";

/// Ordered `# ::key value` metadata of an AMR sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata(Vec<(String, String)>);

impl Metadata {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Replace the value of `key` in place, or append it.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.0.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse one comment line, which may hold several `::key value` pairs.
    fn parse_line(&mut self, line: &str) {
        let body = line.trim_start_matches('#');
        for field in body.split("::").skip(1) {
            let field = field.trim();
            let (key, value) = field.split_once(' ').unwrap_or((field, ""));
            if !key.is_empty() {
                self.set(key, value.trim());
            }
        }
    }
}

/// A parser failure kept in place of a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmrFailure {
    pub message: String,
    pub sent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmrBody {
    Graph(AmrGraph),
    Failure(AmrFailure),
}

/// An AMR graph (or parse failure) with its sentence metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmrSentence {
    pub metadata: Metadata,
    pub body: AmrBody,
}

impl AmrSentence {
    #[must_use]
    pub fn new(graph: AmrGraph) -> Self {
        Self {
            metadata: Metadata::default(),
            body: AmrBody::Graph(graph),
        }
    }

    #[must_use]
    pub fn failure(failure: AmrFailure) -> Self {
        let mut metadata = Metadata::default();
        if let Some(sent) = &failure.sent {
            metadata.set("snt", sent.clone());
        }
        metadata.set("parse_error", failure.message.clone());
        Self {
            metadata,
            body: AmrBody::Failure(failure),
        }
    }

    /// Parse metadata comment lines followed by a PENMAN graph.
    pub fn parse(text: &str) -> Result<Self> {
        let mut metadata = Metadata::default();
        let mut graph_lines = Vec::new();
        for line in text.lines() {
            if graph_lines.is_empty() && line.trim_start().starts_with('#') {
                metadata.parse_line(line.trim_start());
            } else {
                graph_lines.push(line);
            }
        }
        let graph = AmrGraph::parse(&graph_lines.join("\n"))?;
        Ok(Self {
            metadata,
            body: AmrBody::Graph(graph),
        })
    }

    #[must_use]
    pub const fn graph(&self) -> Option<&AmrGraph> {
        match &self.body {
            AmrBody::Graph(graph) => Some(graph),
            AmrBody::Failure(_) => None,
        }
    }

    pub fn graph_mut(&mut self) -> Option<&mut AmrGraph> {
        match &mut self.body {
            AmrBody::Graph(graph) => Some(graph),
            AmrBody::Failure(_) => None,
        }
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.body, AmrBody::Failure(_))
    }

    /// The PENMAN graph without metadata.
    #[must_use]
    pub fn graph_only(&self) -> String {
        match &self.body {
            AmrBody::Graph(graph) => graph.format(),
            AmrBody::Failure(_) => FAILURE_GRAPH.to_string(),
        }
    }

    /// The PENMAN graph preceded by its metadata lines.
    #[must_use]
    pub fn to_penman(&self) -> String {
        let mut out = String::new();
        for (key, value) in self.metadata.iter() {
            if value.is_empty() {
                out.push_str(&format!("# ::{key}\n"));
            } else {
                out.push_str(&format!("# ::{key} {value}\n"));
            }
        }
        out.push_str(&self.graph_only());
        out
    }
}

impl std::fmt::Display for AmrSentence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_penman())
    }
}

/// The AMR sentences of one document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmrDocument {
    pub sents: Vec<AmrSentence>,
}

impl AmrDocument {
    #[must_use]
    pub const fn new(sents: Vec<AmrSentence>) -> Self {
        Self { sents }
    }

    /// Every sentence with metadata, separated by a blank line.
    #[must_use]
    pub fn graph_string(&self) -> String {
        self.sents
            .iter()
            .map(AmrSentence::to_penman)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
