//! AMR graphs as ordered triples, their PENMAN encoding and sentence metadata.

mod graph;
mod penman;
mod sentence;

pub use graph::{AmrGraph, INSTANCE_ROLE, Triple, evaluate_constant, quote_constant};
pub use sentence::{AmrBody, AmrDocument, AmrFailure, AmrSentence, Metadata};
