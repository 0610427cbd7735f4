use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A token with its linguistic and clinical concept features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureToken {
    /// Index of the token in its document.
    pub i: usize,
    /// Index of the token in its sentence.
    pub i_sent: usize,
    /// Character offset of the token in the parsed text.
    pub idx: usize,
    /// Text as it appears in the note.
    pub text: String,
    /// Normalized text; MIMIC masks become a single pseudo token.
    pub norm: String,
    pub lemma: String,
    /// Entity label set by the concept linker.
    pub ent: Option<String>,
    /// UMLS concept unique identifier.
    pub cui: Option<String>,
    /// Preferred concept name of `cui`.
    pub pref_name: Option<String>,
    /// Whether the token replaces a de-identification mask.
    pub pseudo: bool,
}

impl FeatureToken {
    #[must_use]
    pub const fn is_concept(&self) -> bool {
        self.cui.is_some()
    }

    /// Character offset just past the end of the token text.
    #[must_use]
    pub fn end(&self) -> usize {
        self.idx + self.text.chars().count()
    }
}

/// A sentence of feature tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSentence {
    pub tokens: Vec<FeatureToken>,
}

impl FeatureSentence {
    #[must_use]
    pub const fn new(tokens: Vec<FeatureToken>) -> Self {
        Self { tokens }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Original text of the sentence, rebuilt from token offsets.
    #[must_use]
    pub fn text(&self) -> String {
        join_tokens(&self.tokens, |t| &t.text)
    }

    /// Normalized text of the sentence.
    #[must_use]
    pub fn norm(&self) -> String {
        join_tokens(&self.tokens, |t| &t.norm)
    }

    /// Tokens keyed by character offset.
    #[must_use]
    pub fn tokens_by_idx(&self) -> HashMap<usize, &FeatureToken> {
        self.tokens.iter().map(|t| (t.idx, t)).collect()
    }

    pub fn norm_token_iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|t| t.norm.as_str())
    }
}

/// A parsed span of text split into sentences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDocument {
    pub text: String,
    pub sents: Vec<FeatureSentence>,
}

impl FeatureDocument {
    #[must_use]
    pub const fn new(text: String, sents: Vec<FeatureSentence>) -> Self {
        Self { text, sents }
    }

    pub fn token_iter(&self) -> impl Iterator<Item = &FeatureToken> {
        self.sents.iter().flat_map(|s| s.tokens.iter())
    }

    pub fn token_iter_mut(&mut self) -> impl Iterator<Item = &mut FeatureToken> {
        self.sents.iter_mut().flat_map(|s| s.tokens.iter_mut())
    }

    pub fn norm_token_iter(&self) -> impl Iterator<Item = &str> {
        self.token_iter().map(|t| t.norm.as_str())
    }

    #[must_use]
    pub fn norm(&self) -> String {
        let tokens: Vec<FeatureToken> = self.token_iter().cloned().collect();
        join_tokens(&tokens, |t| &t.norm)
    }

    #[must_use]
    pub fn token_count(&self) -> usize {
        self.sents.iter().map(FeatureSentence::len).sum()
    }
}

/// Join token strings, keeping a space only where the source text had
/// whitespace between the tokens.
fn join_tokens<'a>(tokens: &'a [FeatureToken], field: impl Fn(&'a FeatureToken) -> &'a str) -> String {
    let mut out = String::new();
    let mut prev_end: Option<usize> = None;
    for tok in tokens {
        if prev_end.is_some_and(|end| tok.idx > end) {
            out.push(' ');
        }
        out.push_str(field(tok));
        prev_end = Some(tok.end());
    }
    out
}
