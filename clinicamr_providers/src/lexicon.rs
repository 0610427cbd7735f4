use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use clinicamr_core::{ConceptLinker, FeatureDocument, FeatureToken};
use serde::Deserialize;
use tracing::{debug, info};

/// One row of a concept lexicon CSV (`term,cui,pref_name,ent`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LexiconEntry {
    pub term: String,
    pub cui: String,
    #[serde(default)]
    pub pref_name: Option<String>,
    #[serde(default)]
    pub ent: Option<String>,
}

/// Links tokens to concepts by longest match of lower cased terms.
#[derive(Debug, Default)]
pub struct LexiconConceptLinker {
    entries: HashMap<Vec<String>, LexiconEntry>,
    max_words: usize,
}

impl LexiconConceptLinker {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let linker = Self::from_reader(std::fs::File::open(path)?)?;
        info!("Loaded {} lexicon terms from {}", linker.len(), path.display());
        Ok(linker)
    }

    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let entries: Vec<LexiconEntry> = reader.deserialize().collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(entries))
    }

    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = LexiconEntry>) -> Self {
        let mut linker = Self::default();
        for entry in entries {
            let words: Vec<String> = entry.term.split_whitespace().map(str::to_lowercase).collect();
            if words.is_empty() {
                continue;
            }
            linker.max_words = linker.max_words.max(words.len());
            linker.entries.insert(words, entry);
        }
        linker
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn link_tokens(&self, tokens: &mut [FeatureToken]) -> usize {
        let words: Vec<String> = tokens.iter().map(|t| t.norm.to_lowercase()).collect();
        let mut linked = 0;
        let mut i = 0;
        while i < tokens.len() {
            let longest = (1..=self.max_words.min(tokens.len() - i))
                .rev()
                .find_map(|n| self.entries.get(&words[i..i + n]).map(|e| (n, e)));
            if let Some((n, entry)) = longest {
                for tok in &mut tokens[i..i + n] {
                    tok.cui = Some(entry.cui.clone());
                    tok.pref_name.clone_from(&entry.pref_name);
                    tok.ent.clone_from(&entry.ent);
                }
                debug!("linked <{}> to {}", entry.term, entry.cui);
                linked += 1;
                i += n;
            } else {
                i += 1;
            }
        }
        linked
    }
}

impl ConceptLinker for LexiconConceptLinker {
    fn link(&self, doc: &mut FeatureDocument) {
        let linked: usize = doc
            .sents
            .iter_mut()
            .map(|sent| self.link_tokens(&mut sent.tokens))
            .sum();
        debug!("linked {linked} concepts");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinicamr_core::FeatureDocumentParser;

    const LEXICON: &str = "term,cui,pref_name,ent
kidney,C0022646,Kidney,T023
kidney failure,C0035078,Kidney Failure,T047
patient,C0030705,Patients,T101
";

    #[test]
    fn longest_match_wins() {
        let linker = LexiconConceptLinker::from_reader(LEXICON.as_bytes()).unwrap();
        assert_eq!(linker.len(), 3);
        let parser = FeatureDocumentParser::new()
            .unwrap()
            .with_linker(Box::new(linker));
        let doc = parser.parse("Patient presents with kidney failure. Kidney is fine.");
        let cuis: Vec<(&str, Option<&str>)> = doc
            .token_iter()
            .map(|t| (t.norm.as_str(), t.cui.as_deref()))
            .collect();
        assert_eq!(cuis[0], ("Patient", Some("C0030705")));
        assert_eq!(cuis[1], ("presents", None));
        assert_eq!(cuis[3], ("kidney", Some("C0035078")));
        assert_eq!(cuis[4], ("failure", Some("C0035078")));
        assert_eq!(cuis[6], ("Kidney", Some("C0022646")));
        let failure = &doc.sents[0].tokens[4];
        assert_eq!(failure.pref_name.as_deref(), Some("Kidney Failure"));
        assert_eq!(failure.ent.as_deref(), Some("T047"));
    }

    #[test]
    fn optional_columns() {
        let linker =
            LexiconConceptLinker::from_reader("term,cui\nfever,C0015967\n".as_bytes()).unwrap();
        let mut doc = FeatureDocumentParser::new().unwrap().parse("No fever.");
        linker.link(&mut doc);
        let fever = &doc.sents[0].tokens[1];
        assert_eq!(fever.cui.as_deref(), Some("C0015967"));
        assert_eq!(fever.pref_name, None);
    }

    #[test]
    fn load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.csv");
        std::fs::write(&path, LEXICON).unwrap();
        let linker = LexiconConceptLinker::from_path(&path).unwrap();
        assert_eq!(linker.len(), 3);
        assert!(LexiconConceptLinker::from_path(&dir.path().join("missing.csv")).is_err());
    }
}
