use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::document::{AmrFeatureDocument, AmrFeatureSentence};
use crate::amr::{Triple, evaluate_constant, quote_constant};
use crate::error::{ClinicalAmrError, Result};
use crate::nlp::FeatureToken;

/// Modifies an annotated document after parsing and alignment.
pub trait DocumentDecorator: Send + Sync {
    fn decorate(&self, doc: &mut AmrFeatureDocument) -> Result<()>;
}

/// How a concept is written as the value of a CUI triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CuiFormat {
    /// The bare identifier, as in `C0035078`.
    #[default]
    Cui,
    /// The preferred name followed by the identifier, as a string constant.
    PrefNameCui,
}

/// Replaces token index triples with CUI triples for the concept tokens they
/// point to.
#[derive(Debug, Clone)]
pub struct CuiPopulator {
    token_index_role: String,
    cui_role: String,
    format: CuiFormat,
}

impl CuiPopulator {
    #[must_use]
    pub fn new(token_index_role: &str, cui_role: &str, format: CuiFormat) -> Self {
        Self {
            token_index_role: token_index_role.trim_start_matches(':').to_string(),
            cui_role: format!(":{}", cui_role.trim_start_matches(':')),
            format,
        }
    }

    /// Populate one sentence, returning the number of CUI triples added.
    ///
    /// Every token index triple is removed, whether or not its tokens are
    /// linked concepts.
    pub fn populate(&self, sent: &mut AmrFeatureSentence) -> Result<usize> {
        let AmrFeatureSentence { sent, amr } = sent;
        let Some(graph) = amr.graph_mut() else {
            return Ok(0);
        };
        let by_idx = sent.tokens_by_idx();
        let mut cuis: Vec<Triple> = Vec::new();
        let mut index_triples: Vec<usize> = Vec::new();
        for (tix, triple) in graph.triples.iter().enumerate() {
            if !triple.role_name().starts_with(&self.token_index_role) {
                continue;
            }
            index_triples.push(tix);
            let value = evaluate_constant(&triple.target);
            for ix in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                let idx: usize = ix.parse().map_err(|_| ClinicalAmrError::TokenIndex {
                    role: triple.role.clone(),
                    value: value.clone(),
                })?;
                match by_idx.get(&idx) {
                    Some(tok) => {
                        if let Some(target) = self.cui_value(tok) {
                            let cui = Triple::new(triple.source.clone(), self.cui_role.clone(), target);
                            if !cuis.contains(&cui) {
                                cuis.push(cui);
                            }
                        }
                    }
                    None => warn!("no token at offset {idx} for {}", triple.source),
                }
            }
        }
        for tix in index_triples.into_iter().rev() {
            graph.triples.remove(tix);
        }
        let added = cuis.len();
        graph.triples.extend(cuis);
        Ok(added)
    }

    fn cui_value(&self, tok: &FeatureToken) -> Option<String> {
        let cui = tok.cui.as_deref()?;
        Some(match (self.format, tok.pref_name.as_deref()) {
            (CuiFormat::PrefNameCui, Some(pref)) => {
                quote_constant(&format!("{pref} ({cui})"))
            }
            _ => quote_constant(cui),
        })
    }
}

impl DocumentDecorator for CuiPopulator {
    fn decorate(&self, doc: &mut AmrFeatureDocument) -> Result<()> {
        let mut added = 0;
        for sent in &mut doc.sents {
            added += self.populate(sent)?;
        }
        debug!("added {added} concept triples");
        Ok(())
    }
}
