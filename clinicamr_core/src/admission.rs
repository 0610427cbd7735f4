//! Admission level AMR documents: every paragraph sentence of an admission's
//! notes in one list, indexed by note, section and paragraph.

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::amr::AmrDocument;
use crate::annotate::{AmrFeatureSentence, ParagraphFactory};
use crate::mimic::{CorpusAccessor, Note};

/// Half open span of a paragraph's sentences in the admission sentence list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphIndex {
    pub span: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionIndex {
    pub id: usize,
    pub name: String,
    pub paras: Vec<ParagraphIndex>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteIndex {
    pub row_id: i64,
    pub secs: Vec<SectionIndex>,
}

/// The annotated sentences of a hospital admission.
///
/// The discharge summary comes first, followed by the antecedent notes
/// written before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionAmrDocument {
    pub hadm_id: String,
    pub sents: Vec<AmrFeatureSentence>,
    pub ds_ix: NoteIndex,
    pub ant_ixs: Vec<NoteIndex>,
}

impl AdmissionAmrDocument {
    #[must_use]
    pub fn amr(&self) -> AmrDocument {
        AmrDocument::new(self.sents.iter().map(|s| s.amr.clone()).collect())
    }

    /// Sentences of a paragraph.
    #[must_use]
    pub fn paragraph(&self, para: &ParagraphIndex) -> &[AmrFeatureSentence] {
        let (begin, end) = para.span;
        self.sents.get(begin..end).unwrap_or_default()
    }

    /// Sentences of the discharge summary.
    #[must_use]
    pub fn ds_sents(&self) -> Vec<&AmrFeatureSentence> {
        self.note_sents(&self.ds_ix)
    }

    /// Sentences of every note other than the discharge summary.
    #[must_use]
    pub fn ant_sents(&self) -> Vec<&AmrFeatureSentence> {
        self.ant_ixs.iter().flat_map(|n| self.note_sents(n)).collect()
    }

    fn note_sents(&self, note: &NoteIndex) -> Vec<&AmrFeatureSentence> {
        note.secs
            .iter()
            .flat_map(|s| s.paras.iter())
            .flat_map(|p| self.paragraph(p).iter())
            .collect()
    }

    /// Write the admission, note by note, as indented PENMAN.
    pub fn write(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        writeln!(writer, "hadm_id: {}", self.hadm_id)?;
        writeln!(writer, "discharge summary:")?;
        self.write_note(&self.ds_ix, 1, writer)?;
        writeln!(writer, "antecedents:")?;
        for note in &self.ant_ixs {
            self.write_note(note, 1, writer)?;
        }
        Ok(())
    }

    fn write_note(&self, note: &NoteIndex, depth: usize, writer: &mut dyn Write) -> std::io::Result<()> {
        let ind = "  ".repeat(depth);
        writeln!(writer, "{ind}note: {}", note.row_id)?;
        for sec in &note.secs {
            writeln!(writer, "{ind}  section: {} ({})", sec.name, sec.id)?;
            for (pix, para) in sec.paras.iter().enumerate() {
                writeln!(writer, "{ind}    paragraph: {pix}")?;
                for sent in self.paragraph(para) {
                    for line in sent.amr.to_penman().lines() {
                        writeln!(writer, "{ind}      {line}")?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Creates admission documents from the corpus, annotating paragraphs through
/// the paragraph factory (and so its cache).
pub struct AdmissionAmrFactory {
    corpus: Arc<dyn CorpusAccessor>,
    para_factory: Arc<ParagraphFactory>,
    summary_sections: Option<HashSet<String>>,
}

impl AdmissionAmrFactory {
    /// `summary_sections` are the discharge summary sections to keep; `None`
    /// keeps every section.
    #[must_use]
    pub fn new(
        corpus: Arc<dyn CorpusAccessor>,
        para_factory: Arc<ParagraphFactory>,
        summary_sections: Option<HashSet<String>>,
    ) -> Self {
        Self {
            corpus,
            para_factory,
            summary_sections,
        }
    }

    pub async fn load(&self, hadm_id: &str) -> anyhow::Result<AdmissionAmrDocument> {
        let adm = self.corpus.admission(hadm_id).await?;
        let ds_note = adm.discharge_summary()?;
        let ds_row_ids: HashSet<i64> = adm
            .notes
            .iter()
            .filter(|n| n.is_discharge_summary())
            .map(|n| n.row_id)
            .collect();
        let mut sents = Vec::new();
        let ds_ix = self
            .load_note(ds_note, self.summary_sections.as_ref(), &mut sents)
            .await?;
        let mut ant_notes: Vec<&Note> = adm
            .notes
            .iter()
            .filter(|n| !ds_row_ids.contains(&n.row_id))
            .collect();
        ant_notes.sort_by_key(|n| n.row_id);
        let mut ant_ixs = Vec::with_capacity(ant_notes.len());
        for note in ant_notes {
            ant_ixs.push(self.load_note(note, None, &mut sents).await?);
        }
        info!(
            "loaded admission {hadm_id}: {} sentences, {} antecedent notes",
            sents.len(),
            ant_ixs.len()
        );
        Ok(AdmissionAmrDocument {
            hadm_id: adm.hadm_id.clone(),
            sents,
            ds_ix,
            ant_ixs,
        })
    }

    pub async fn keys(&self) -> anyhow::Result<Vec<String>> {
        self.corpus.admission_ids().await
    }

    pub async fn exists(&self, hadm_id: &str) -> anyhow::Result<bool> {
        self.corpus.exists(hadm_id).await
    }

    async fn load_note(
        &self,
        note: &Note,
        include: Option<&HashSet<String>>,
        sents: &mut Vec<AmrFeatureSentence>,
    ) -> anyhow::Result<NoteIndex> {
        let mut secs = Vec::new();
        for sec in note
            .sections
            .iter()
            .filter(|s| include.is_none_or(|inc| inc.contains(&s.name)))
        {
            let mut paras = Vec::new();
            for para in self.para_factory.create(note, sec).await? {
                let begin = sents.len();
                sents.extend(para.sents);
                paras.push(ParagraphIndex {
                    span: (begin, sents.len()),
                });
            }
            debug!("note {}, section {}: {} paragraphs", note.row_id, sec.name, paras.len());
            secs.push(SectionIndex {
                id: sec.id,
                name: sec.name.clone(),
                paras,
            });
        }
        if secs.is_empty() && include.is_some() {
            debug!("no summary sections in note {}", note.row_id);
        }
        Ok(NoteIndex {
            row_id: note.row_id,
            secs,
        })
    }
}
