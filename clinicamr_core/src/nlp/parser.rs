use regex::Regex;
use tracing::debug;

use super::ConceptLinker;
use super::document::{FeatureDocument, FeatureSentence, FeatureToken};
use crate::error::Result;

/// Abbreviations kept whole with their trailing period.
pub const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Drs", "Jr", "Sr", "St", "vs", "approx", "Pt", "pt",
];

/// Norm given to masks that hide a date.
const DATE_PSEUDO_TOKEN: &str = "DATE";

/// Norm given to masks without any letters.
const EMPTY_PSEUDO_TOKEN: &str = "MASK";

/// Tokenizes clinical text, replaces MIMIC-III de-identification masks with
/// pseudo tokens, splits sentences and links concepts.
pub struct FeatureDocumentParser {
    token_re: Regex,
    date_re: Regex,
    paren_re: Regex,
    linker: Option<Box<dyn ConceptLinker>>,
}

impl FeatureDocumentParser {
    pub fn new() -> Result<Self> {
        Self::with_abbreviations(DEFAULT_ABBREVIATIONS)
    }

    pub fn with_abbreviations(abbreviations: &[&str]) -> Result<Self> {
        let abbrs = abbreviations
            .iter()
            .map(|a| regex::escape(a))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(
            r"(?P<mask>\[\*\*.*?\*\*\])|(?P<abbr>\b(?:{abbrs})\.)|(?P<num>\d+(?:[.,/:]\d+)*)|(?P<word>\p{{L}}[\p{{L}}\p{{N}}]*(?:['-][\p{{L}}\p{{N}}]+)*)|(?P<punct>\S)"
        );
        Ok(Self {
            token_re: Regex::new(&pattern)?,
            date_re: Regex::new(r"^[\d\s/-]+$|\d{4}-\d{1,2}-\d{1,2}")?,
            paren_re: Regex::new(r"\([^)]*\)")?,
            linker: None,
        })
    }

    #[must_use]
    pub fn with_linker(mut self, linker: Box<dyn ConceptLinker>) -> Self {
        self.linker = Some(linker);
        self
    }

    /// Parse `text` into a feature document.
    #[must_use]
    pub fn parse(&self, text: &str) -> FeatureDocument {
        let mut sents = Vec::new();
        let mut tokens: Vec<FeatureToken> = Vec::new();
        let mut doc_i = 0;
        let mut char_pos = 0;
        let mut byte_pos = 0;
        for caps in self.token_re.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            char_pos += text[byte_pos..m.start()].chars().count();
            byte_pos = m.start();
            let tok_text = m.as_str();
            let pseudo = caps.name("mask").is_some();
            let norm = if pseudo {
                self.mask_norm(tok_text)
            } else {
                tok_text.to_string()
            };
            // pseudo tokens keep their norm as the lemma
            let lemma = if pseudo {
                norm.clone()
            } else {
                norm.to_lowercase()
            };
            let ends_sentence = caps
                .name("punct")
                .is_some_and(|p| matches!(p.as_str(), "." | "?" | "!"));
            tokens.push(FeatureToken {
                i: doc_i,
                i_sent: tokens.len(),
                idx: char_pos,
                text: tok_text.to_string(),
                norm,
                lemma,
                ent: None,
                cui: None,
                pref_name: None,
                pseudo,
            });
            doc_i += 1;
            if ends_sentence {
                sents.push(FeatureSentence::new(std::mem::take(&mut tokens)));
            }
        }
        if !tokens.is_empty() {
            sents.push(FeatureSentence::new(tokens));
        }
        let mut doc = FeatureDocument::new(text.to_string(), sents);
        debug!(
            "parsed {} sentences, {} tokens",
            doc.sents.len(),
            doc.token_count()
        );
        if let Some(linker) = &self.linker {
            linker.link(&mut doc);
        }
        doc
    }

    /// Map a `[**...**]` mask to a single upper case pseudo token.
    fn mask_norm(&self, mask: &str) -> String {
        let label = mask
            .trim_start_matches("[**")
            .trim_end_matches("**]")
            .trim();
        if self.date_re.is_match(label) && label.chars().any(|c| c.is_ascii_digit()) {
            return DATE_PSEUDO_TOKEN.to_string();
        }
        let label = self.paren_re.replace_all(label, "");
        let norm: String = label
            .chars()
            .filter(|c| c.is_alphabetic())
            .flat_map(char::to_uppercase)
            .collect();
        if norm.is_empty() {
            EMPTY_PSEUDO_TOKEN.to_string()
        } else {
            norm
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> FeatureDocumentParser {
        FeatureDocumentParser::new().unwrap()
    }

    #[test]
    fn mimic_masks_become_pseudo_tokens() {
        let text = "Mr. [**Known lastname **] from the United States is an 87 yo male with a\nhistory of diastolic CHF (EF\n65% 1/10) and kidney failure.";
        let doc = parser().parse(text);
        assert_eq!(doc.sents.len(), 1);
        let should = vec![
            "Mr.", "KNOWNLASTNAME", "from", "the", "United", "States", "is", "an", "87", "yo",
            "male", "with", "a", "history", "of", "diastolic", "CHF", "(", "EF", "65", "%",
            "1/10", ")", "and", "kidney", "failure", ".",
        ];
        assert_eq!(doc.norm_token_iter().collect::<Vec<_>>(), should);
        let i_sent: Vec<usize> = doc.token_iter().map(|t| t.i_sent).collect();
        assert_eq!(i_sent, (0..27).collect::<Vec<_>>());
        let pseudo = &doc.sents[0].tokens[1];
        assert!(pseudo.pseudo);
        assert_eq!(pseudo.lemma, "KNOWNLASTNAME");
        assert_eq!(pseudo.idx, 4);
    }

    #[test]
    fn norm_keeps_source_spacing() {
        let doc = parser().parse("EF 65% (1/10).");
        assert_eq!(doc.sents[0].norm(), "EF 65% (1/10).");
        let doc = parser().parse("Seen by [**Doctor First Name 123**] on [**2101-10-20**].");
        assert_eq!(doc.norm(), "Seen by DOCTORFIRSTNAME on DATE.");
    }

    #[test]
    fn splits_sentences_on_terminal_punctuation() {
        let doc = parser().parse("Patient presents with kidney failure. He denies fever.");
        assert_eq!(doc.sents.len(), 2);
        assert_eq!(doc.sents[1].tokens[0].norm, "He");
        assert_eq!(doc.sents[1].tokens[0].i, 6);
        assert_eq!(doc.sents[1].tokens[0].i_sent, 0);
        assert_eq!(doc.sents[1].tokens[0].idx, 38);
    }
}
