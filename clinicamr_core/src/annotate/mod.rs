//! Parsing paragraphs to AMR graphs, aligning them to tokens and attaching
//! clinical concepts.

mod align;
mod annotator;
mod cache;
mod cui;
mod document;
mod key;
mod paragraph;

pub use align::TokenIndexMapper;
pub use annotator::{AmrAnnotator, AmrParser};
pub use cache::{MemoryParagraphCache, ParagraphCache};
pub use cui::{CuiFormat, CuiPopulator, DocumentDecorator};
pub use document::{AmrFeatureDocument, AmrFeatureSentence, write_paragraphs};
pub use key::ParagraphKey;
pub use paragraph::{DEFAULT_ID_PREFIX, ParagraphFactory};
