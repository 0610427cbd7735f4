use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};

use super::annotator::AmrAnnotator;
use super::cache::ParagraphCache;
use super::cui::DocumentDecorator;
use super::document::AmrFeatureDocument;
use super::key::ParagraphKey;
use crate::error::ClinicalAmrError;
use crate::mimic::{Note, Section, split_paragraphs};
use crate::nlp::FeatureDocumentParser;

/// Default prefix of generated sentence ids.
pub const DEFAULT_ID_PREFIX: &str = "MIMIC3_";

/// Splits note sections into paragraphs and annotates each one, reusing
/// paragraphs found in the cache.
pub struct ParagraphFactory {
    doc_parser: FeatureDocumentParser,
    annotator: AmrAnnotator,
    cache: Arc<dyn ParagraphCache>,
    decorators: Vec<Box<dyn DocumentDecorator>>,
    add_id: bool,
    id_prefix: String,
    limit: usize,
}

impl ParagraphFactory {
    #[must_use]
    pub fn new(
        doc_parser: FeatureDocumentParser,
        annotator: AmrAnnotator,
        cache: Arc<dyn ParagraphCache>,
    ) -> Self {
        Self {
            doc_parser,
            annotator,
            cache,
            decorators: Vec::new(),
            add_id: true,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            limit: usize::MAX,
        }
    }

    #[must_use]
    pub fn with_decorator(mut self, decorator: Box<dyn DocumentDecorator>) -> Self {
        self.decorators.push(decorator);
        self
    }

    /// Whether to add `id` metadata to each sentence.
    #[must_use]
    pub const fn with_add_id(mut self, add_id: bool) -> Self {
        self.add_id = add_id;
        self
    }

    #[must_use]
    pub fn with_id_prefix(mut self, id_prefix: impl Into<String>) -> Self {
        self.id_prefix = id_prefix.into();
        self
    }

    /// Maximum number of paragraphs annotated per section.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.annotator.model()
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<dyn ParagraphCache> {
        &self.cache
    }

    /// Annotate the paragraphs of a note section, in order.
    pub async fn create(&self, note: &Note, sec: &Section) -> anyhow::Result<Vec<AmrFeatureDocument>> {
        let paras = split_paragraphs(&sec.body);
        debug!(
            "section {} of note {}: {} paragraphs",
            sec.name,
            note.row_id,
            paras.len()
        );
        let mut docs = Vec::new();
        for (pix, text) in paras.iter().enumerate().take(self.limit) {
            let key = ParagraphKey::new(note.row_id, sec.id, pix);
            docs.push(self.get_doc(&key, text).await?);
        }
        Ok(docs)
    }

    /// Annotate a single paragraph of a note section.
    pub async fn paragraph(&self, note: &Note, sec_id: usize, pix: usize) -> anyhow::Result<AmrFeatureDocument> {
        let sec = note.section(sec_id)?;
        let paras = split_paragraphs(&sec.body);
        let text = paras.get(pix).ok_or(ClinicalAmrError::OutOfRange {
            what: "paragraph",
            index: pix,
            len: paras.len(),
        })?;
        self.get_doc(&ParagraphKey::new(note.row_id, sec.id, pix), text)
            .await
    }

    /// Annotate free text without caching it.
    pub async fn annotate_text(&self, text: &str) -> anyhow::Result<AmrFeatureDocument> {
        self.annotate(text)
            .await
            .with_context(|| format!("could not parse AMR for <{text}>"))
    }

    /// Remove every cached paragraph.
    pub async fn clear(&self) -> anyhow::Result<()> {
        self.cache.clear().await?;
        info!("cleared paragraph cache");
        Ok(())
    }

    async fn get_doc(&self, key: &ParagraphKey, text: &str) -> anyhow::Result<AmrFeatureDocument> {
        let skey = key.to_string();
        if let Some(doc) = self.cache.load(&skey).await? {
            debug!("cache hit: {skey}");
            return Ok(doc);
        }
        let mut doc = self
            .annotate(text)
            .await
            .with_context(|| format!("could not parse AMR for <{text}>"))?;
        if self.add_id {
            self.add_ids(key, &mut doc);
        }
        doc.sub_path = Some(format!("{}-{}", key.sec_id, key.pix));
        self.cache.dump(&skey, &doc).await?;
        debug!("cached: {skey}");
        Ok(doc)
    }

    async fn annotate(&self, text: &str) -> anyhow::Result<AmrFeatureDocument> {
        let fdoc = self.doc_parser.parse(text);
        let mut doc = self.annotator.annotate(fdoc).await?;
        for decorator in &self.decorators {
            decorator.decorate(&mut doc)?;
        }
        Ok(doc)
    }

    /// Add `<prefix><row_id>_<sec_id>_<pix>.<six>` ids to sentences without one.
    fn add_ids(&self, key: &ParagraphKey, doc: &mut AmrFeatureDocument) {
        let did = format!("{}{}", self.id_prefix, key.to_string().replace('-', "_"));
        for (six, sent) in doc.sents.iter_mut().enumerate() {
            if !sent.amr.metadata.contains("id") {
                sent.amr.metadata.set("id", format!("{did}.{six}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::amr::{AmrFailure, AmrGraph, AmrSentence};
    use crate::annotate::{AmrParser, CuiFormat, CuiPopulator, MemoryParagraphCache, TokenIndexMapper};

    #[derive(Default)]
    struct CountingParser {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AmrParser for CountingParser {
        async fn parse(&self, sents: &[String]) -> anyhow::Result<Vec<AmrSentence>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            sents
                .iter()
                .map(|s| -> anyhow::Result<AmrSentence> {
                    if s.contains("fever") {
                        Ok(AmrSentence::new(AmrGraph::parse(
                            "(d / deny-01 :ARG0 (h / he) :ARG1 (f / fever))",
                        )?))
                    } else if s.contains("kidney") {
                        Ok(AmrSentence::new(AmrGraph::parse(
                            "(f / fail-01 :ARG1 (k / kidney))",
                        )?))
                    } else {
                        Ok(AmrSentence::failure(AmrFailure {
                            message: "unparsable".to_string(),
                            sent: Some(s.clone()),
                        }))
                    }
                })
                .collect()
        }

        fn model(&self) -> &str {
            "counting"
        }
    }

    fn note() -> (Note, Section) {
        let sec = Section {
            id: 7,
            name: "history-of-present-illness".to_string(),
            header: Some("History of Present Illness".to_string()),
            body: "Kidney failure noted.\n\nHe denies fever. No pain\n\nLast paragraph.".to_string(),
        };
        let note = Note {
            row_id: 1234,
            hadm_id: "100".to_string(),
            category: "Discharge summary".to_string(),
            description: "Report".to_string(),
            chartdate: None,
            text: sec.body.clone(),
            sections: vec![sec.clone()],
        };
        (note, sec)
    }

    fn factory(parser: Arc<CountingParser>) -> ParagraphFactory {
        ParagraphFactory::new(
            FeatureDocumentParser::new().unwrap(),
            AmrAnnotator::new(parser, TokenIndexMapper::new("toki")),
            Arc::new(MemoryParagraphCache::new()),
        )
        .with_decorator(Box::new(CuiPopulator::new("toki", "cui", CuiFormat::Cui)))
    }

    #[tokio::test]
    async fn second_create_is_served_from_cache() {
        let parser = Arc::new(CountingParser::default());
        let factory = factory(parser.clone());
        let (note, sec) = note();
        let first = factory.create(&note, &sec).await.unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(parser.calls.load(Ordering::SeqCst), 3);
        let second = factory.create(&note, &sec).await.unwrap();
        assert_eq!(parser.calls.load(Ordering::SeqCst), 3);
        assert_eq!(first, second);
        assert_eq!(
            factory.cache().keys().await.unwrap(),
            vec!["1234-7-0", "1234-7-1", "1234-7-2"]
        );
    }

    #[tokio::test]
    async fn sentences_get_ids_and_no_index_triples() {
        let factory = factory(Arc::new(CountingParser::default()));
        let (note, sec) = note();
        let docs = factory.create(&note, &sec).await.unwrap();
        let ids: Vec<&str> = docs[1]
            .sents
            .iter()
            .filter_map(|s| s.amr.metadata.get("id"))
            .collect();
        assert_eq!(ids, vec!["MIMIC3_1234_7_1.0", "MIMIC3_1234_7_1.1"]);
        assert_eq!(docs[1].sub_path.as_deref(), Some("7-1"));
        for doc in &docs {
            for sent in &doc.sents {
                if let Some(graph) = sent.amr.graph() {
                    assert!(!graph.has_role_prefix("toki"));
                }
            }
        }
        assert!(docs[1].sents[1].amr.is_failure());
        assert_eq!(docs[1].sents[1].amr.graph_only(), "(a / amr-unknown)");
    }

    #[tokio::test]
    async fn limit_caps_paragraphs() {
        let factory = factory(Arc::new(CountingParser::default())).with_limit(1);
        let (note, sec) = note();
        assert_eq!(factory.create(&note, &sec).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn paragraph_out_of_range() {
        let factory = factory(Arc::new(CountingParser::default()));
        let (note, _) = note();
        assert!(factory.paragraph(&note, 7, 5).await.is_err());
        assert!(factory.paragraph(&note, 8, 0).await.is_err());
        let doc = factory.paragraph(&note, 7, 0).await.unwrap();
        assert_eq!(doc.sents.len(), 1);
    }

    #[tokio::test]
    async fn clear_empties_cache() {
        let factory = factory(Arc::new(CountingParser::default()));
        let (note, sec) = note();
        factory.create(&note, &sec).await.unwrap();
        factory.clear().await.unwrap();
        assert!(factory.cache().keys().await.unwrap().is_empty());
    }
}
