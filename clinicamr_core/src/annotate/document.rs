use std::collections::HashMap;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::amr::{AmrDocument, AmrSentence};
use crate::nlp::{FeatureSentence, FeatureToken};

/// A feature sentence paired with its AMR graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmrFeatureSentence {
    pub sent: FeatureSentence,
    pub amr: AmrSentence,
}

impl AmrFeatureSentence {
    #[must_use]
    pub fn text(&self) -> String {
        self.sent.text()
    }

    #[must_use]
    pub fn norm(&self) -> String {
        self.sent.norm()
    }

    #[must_use]
    pub fn tokens_by_idx(&self) -> HashMap<usize, &FeatureToken> {
        self.sent.tokens_by_idx()
    }
}

/// A paragraph (or any parsed text) whose sentences all carry AMR graphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmrFeatureDocument {
    pub text: String,
    pub sents: Vec<AmrFeatureSentence>,
    /// Directory, relative to a plot root, for this document's diagrams.
    pub sub_path: Option<String>,
}

impl AmrFeatureDocument {
    #[must_use]
    pub fn amr(&self) -> AmrDocument {
        AmrDocument::new(self.sents.iter().map(|s| s.amr.clone()).collect())
    }

    #[must_use]
    pub fn norm(&self) -> String {
        self.sents
            .iter()
            .map(AmrFeatureSentence::norm)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sents.is_empty()
    }
}

/// Write paragraphs as sentence id, sentence text and graph, with a short rule
/// between sentences and a long rule after each paragraph.
pub fn write_paragraphs(paras: &[AmrFeatureDocument], writer: &mut dyn Write) -> std::io::Result<()> {
    for para in paras {
        for (six, sent) in para.sents.iter().enumerate() {
            if six > 0 {
                writeln!(writer, "{}", "_".repeat(40))?;
            }
            writeln!(writer, "{}", sent.amr.metadata.get("id").unwrap_or_default())?;
            writeln!(writer, "{}", sent.amr.metadata.get("snt").unwrap_or_default())?;
            writeln!(writer, "{}", sent.amr.graph_only())?;
        }
        writeln!(writer, "{}", "_".repeat(79))?;
    }
    Ok(())
}
