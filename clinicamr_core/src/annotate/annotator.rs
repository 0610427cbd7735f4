use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::align::TokenIndexMapper;
use super::document::{AmrFeatureDocument, AmrFeatureSentence};
use crate::amr::AmrSentence;
use crate::error::ClinicalAmrError;
use crate::nlp::{FeatureDocument, FeatureSentence};

/// Text to AMR parser backend.
#[async_trait]
pub trait AmrParser: Send + Sync {
    /// Parse each sentence into an AMR sentence, in order.  A sentence the
    /// model can not parse comes back as a failure rather than an error.
    async fn parse(&self, sents: &[String]) -> anyhow::Result<Vec<AmrSentence>>;

    /// Name of the model, used to separate plot output.
    fn model(&self) -> &str;
}

/// Parses the sentences of a feature document and aligns the graphs to the
/// tokens.
pub struct AmrAnnotator {
    parser: Arc<dyn AmrParser>,
    mapper: TokenIndexMapper,
}

impl AmrAnnotator {
    #[must_use]
    pub fn new(parser: Arc<dyn AmrParser>, mapper: TokenIndexMapper) -> Self {
        Self { parser, mapper }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.parser.model()
    }

    pub async fn annotate(&self, doc: FeatureDocument) -> anyhow::Result<AmrFeatureDocument> {
        let norms: Vec<String> = doc.sents.iter().map(FeatureSentence::norm).collect();
        let amrs = if norms.is_empty() {
            Vec::new()
        } else {
            self.parser.parse(&norms).await?
        };
        if amrs.len() != norms.len() {
            return Err(ClinicalAmrError::ParseCount {
                expected: norms.len(),
                actual: amrs.len(),
            }
            .into());
        }
        let mut sents = Vec::with_capacity(amrs.len());
        for ((sent, mut amr), norm) in doc.sents.into_iter().zip(amrs).zip(norms) {
            if !amr.metadata.contains("snt") {
                amr.metadata.set("snt", norm);
            }
            let mut sent = AmrFeatureSentence { sent, amr };
            self.mapper.align(&mut sent);
            sents.push(sent);
        }
        debug!("annotated {} sentences with {}", sents.len(), self.model());
        Ok(AmrFeatureDocument {
            text: doc.text,
            sents,
            sub_path: None,
        })
    }
}
