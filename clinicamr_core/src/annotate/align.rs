use tracing::debug;

use super::document::AmrFeatureSentence;
use crate::amr::{Triple, evaluate_constant, quote_constant};
use crate::nlp::FeatureToken;

/// Shortest concept stem allowed to align to a longer token lemma.
const MIN_PREFIX_STEM: usize = 4;

/// Adds token index triples that tie graph nodes to the character offsets of
/// the tokens they came from.
///
/// Graphs that already carry token index roles (as when the parser emits
/// its own alignments) are left untouched.
#[derive(Debug, Clone)]
pub struct TokenIndexMapper {
    role: String,
}

impl TokenIndexMapper {
    #[must_use]
    pub fn new(token_index_role: &str) -> Self {
        Self {
            role: token_index_role.trim_start_matches(':').to_string(),
        }
    }

    /// Role name of the index triples, without the leading colon.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Align the graph of `sent` to its tokens.  Returns the number of index
    /// triples added.
    pub fn align(&self, sent: &mut AmrFeatureSentence) -> usize {
        let AmrFeatureSentence { sent, amr } = sent;
        let Some(graph) = amr.graph_mut() else {
            return 0;
        };
        if graph.has_role_prefix(&self.role) {
            return 0;
        }
        let mut aligns: Vec<(String, Vec<usize>)> = Vec::new();
        for triple in &graph.triples {
            let offsets: Vec<usize> = if triple.is_instance() {
                let stem = concept_stem(&triple.target);
                sent.tokens
                    .iter()
                    .filter(|tok| matches_concept(tok, &stem))
                    .map(|tok| tok.idx)
                    .collect()
            } else if triple.target.starts_with('"') {
                let value = evaluate_constant(&triple.target);
                sent.tokens
                    .iter()
                    .filter(|tok| tok.norm == value)
                    .map(|tok| tok.idx)
                    .collect()
            } else {
                continue;
            };
            if offsets.is_empty() {
                continue;
            }
            match aligns.iter_mut().find(|(var, _)| *var == triple.source) {
                Some((_, prev)) => {
                    for idx in offsets {
                        if !prev.contains(&idx) {
                            prev.push(idx);
                        }
                    }
                }
                None => aligns.push((triple.source.clone(), offsets)),
            }
        }
        let role = format!(":{}", self.role);
        let added = aligns.len();
        for (var, offsets) in aligns {
            let value = offsets
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            graph
                .triples
                .push(Triple::new(var, role.clone(), quote_constant(&value)));
        }
        debug!("aligned {added} nodes");
        added
    }
}

/// Lower cased concept without its PropBank sense suffix (`fail-01` -> `fail`).
fn concept_stem(concept: &str) -> String {
    let stem = match concept.rsplit_once('-') {
        Some((stem, sense))
            if !stem.is_empty() && !sense.is_empty() && sense.chars().all(|c| c.is_ascii_digit()) =>
        {
            stem
        }
        _ => concept,
    };
    stem.to_lowercase()
}

fn matches_concept(tok: &FeatureToken, stem: &str) -> bool {
    tok.lemma == stem
        || tok.norm.to_lowercase() == stem
        || (stem.chars().count() >= MIN_PREFIX_STEM && tok.lemma.starts_with(stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amr::{AmrGraph, AmrSentence};
    use crate::nlp::FeatureDocumentParser;

    fn sentence(text: &str, graph: &str) -> AmrFeatureSentence {
        let doc = FeatureDocumentParser::new().unwrap().parse(text);
        AmrFeatureSentence {
            sent: doc.sents.into_iter().next().unwrap(),
            amr: AmrSentence::new(AmrGraph::parse(graph).unwrap()),
        }
    }

    fn toki(sent: &AmrFeatureSentence, var: &str) -> Option<String> {
        sent.amr
            .graph()
            .unwrap()
            .triples
            .iter()
            .find(|t| t.source == var && t.role == ":toki")
            .map(|t| evaluate_constant(&t.target))
    }

    #[test]
    fn concepts_align_to_token_offsets() {
        let mut sent = sentence(
            "Patient presents with kidney failure.",
            "(p / present-01 :ARG0 (p2 / patient) :ARG1 (f / fail-01 :ARG1 (k / kidney)))",
        );
        let added = TokenIndexMapper::new("toki").align(&mut sent);
        assert_eq!(added, 4);
        assert_eq!(toki(&sent, "p").as_deref(), Some("8"));
        assert_eq!(toki(&sent, "p2").as_deref(), Some("0"));
        assert_eq!(toki(&sent, "f").as_deref(), Some("29"));
        assert_eq!(toki(&sent, "k").as_deref(), Some("22"));
    }

    #[test]
    fn string_attributes_align_to_source_node() {
        let mut sent = sentence(
            "Seen by Smith.",
            "(s / see-01 :ARG0 (p / person :name (n / name :op1 \"Smith\")))",
        );
        TokenIndexMapper::new("toki").align(&mut sent);
        assert_eq!(toki(&sent, "n").as_deref(), Some("8"));
        assert_eq!(toki(&sent, "p"), None);
    }

    #[test]
    fn existing_alignments_are_kept() {
        let mut sent = sentence(
            "He denies fever.",
            "(d / deny-01 :toki \"3\" :ARG1 (f / fever))",
        );
        assert_eq!(TokenIndexMapper::new("toki").align(&mut sent), 0);
        assert_eq!(toki(&sent, "f"), None);
    }

    #[test]
    fn sense_suffix_is_stripped() {
        assert_eq!(concept_stem("fail-01"), "fail");
        assert_eq!(concept_stem("amr-unknown"), "amr-unknown");
        assert_eq!(concept_stem("Kidney"), "kidney");
    }
}
