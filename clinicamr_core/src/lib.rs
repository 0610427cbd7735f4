#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

pub mod admission;
pub mod amr;
pub mod annotate;
pub mod error;
pub mod mimic;
pub mod nlp;

pub use admission::{AdmissionAmrDocument, AdmissionAmrFactory, NoteIndex, ParagraphIndex, SectionIndex};
pub use amr::{AmrDocument, AmrFailure, AmrGraph, AmrSentence, Triple};
pub use annotate::{
    AmrAnnotator, AmrFeatureDocument, AmrFeatureSentence, AmrParser, CuiFormat, CuiPopulator,
    DocumentDecorator, MemoryParagraphCache, ParagraphCache, ParagraphFactory, ParagraphKey,
    TokenIndexMapper, write_paragraphs,
};
pub use error::{ClinicalAmrError, Result};
pub use mimic::{CorpusAccessor, HospitalAdmission, Note, Section, SectionSplitter};
pub use nlp::{ConceptLinker, FeatureDocument, FeatureDocumentParser, FeatureSentence, FeatureToken};
