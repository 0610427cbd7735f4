//! Feature documents: tokens, sentences and the clinical tokenizer.

mod document;
mod parser;

pub use document::{FeatureDocument, FeatureSentence, FeatureToken};
pub use parser::{DEFAULT_ABBREVIATIONS, FeatureDocumentParser};

/// Links tokens to clinical concepts by setting their CUI, preferred name and
/// entity label.
pub trait ConceptLinker: Send + Sync {
    fn link(&self, doc: &mut FeatureDocument);
}
