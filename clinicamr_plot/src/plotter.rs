use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clinicamr_core::mimic::split_paragraphs;
use clinicamr_core::{
    AmrFeatureSentence, ClinicalAmrError, CorpusAccessor, Note, ParagraphFactory, ParagraphKey,
    Section,
};
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{error, info, warn};

use crate::dot::render_dot;
use crate::proofing::{FeasibilityRow, ProofedRow, ProofingRow, write_proofing, write_rows};

/// Leading characters of a proofed sentence that must match the corpus.
const FEASIBILITY_MATCH_LEN: usize = 20;

/// How plot files are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotMode {
    /// One directory per note, one plot per paragraph.
    #[default]
    ByAdmission,
    /// One plot per sentence, tracked in proofing sheets.
    ByParagraph,
}

/// Plots annotated notes and manages the proofing sheets for them.
pub struct Plotter {
    corpus: Arc<dyn CorpusAccessor>,
    factory: Arc<ParagraphFactory>,
    plot_path: PathBuf,
    annotated_notes: Option<BTreeMap<String, Vec<i64>>>,
    comparison_models: Vec<String>,
    proofing_url: String,
    render_command: Option<String>,
}

impl Plotter {
    #[must_use]
    pub fn new(corpus: Arc<dyn CorpusAccessor>, factory: Arc<ParagraphFactory>, plot_path: PathBuf) -> Self {
        Self {
            corpus,
            factory,
            plot_path,
            annotated_notes: None,
            comparison_models: Vec::new(),
            proofing_url: String::new(),
            render_command: None,
        }
    }

    /// Only plot these notes (by admission) rather than every note.
    #[must_use]
    pub fn with_annotated_notes(mut self, notes: BTreeMap<String, Vec<i64>>) -> Self {
        self.annotated_notes = Some(notes);
        self
    }

    #[must_use]
    pub fn with_proofing(mut self, comparison_models: Vec<String>, proofing_url: impl Into<String>) -> Self {
        self.comparison_models = comparison_models;
        self.proofing_url = proofing_url.into();
        self
    }

    /// Command used to render each DOT file to PDF, such as `dot`.
    #[must_use]
    pub fn with_render_command(mut self, command: Option<String>) -> Self {
        self.render_command = command;
        self
    }

    /// Plot the notes of admissions, at most `limit` notes each.  Returns the
    /// DOT files written.
    pub async fn plot(
        &self,
        hadm_ids: &[String],
        limit: Option<usize>,
        mode: PlotMode,
        annotators: &[String],
    ) -> anyhow::Result<Vec<PathBuf>> {
        let limit = limit.unwrap_or(usize::MAX);
        let mut rows: Vec<ProofingRow> = Vec::new();
        let mut files: Vec<PathBuf> = Vec::new();
        for hadm_id in hadm_ids {
            let adm = self.corpus.admission(hadm_id).await?;
            let notes: Vec<&Note> = match self.annotated_notes.as_ref() {
                Some(by_adm) => by_adm
                    .get(hadm_id)
                    .map(Vec::as_slice)
                    .unwrap_or_default()
                    .iter()
                    .map(|row_id| adm.note_by_id(*row_id))
                    .collect::<Result<_, _>>()?,
                None => adm.notes.iter().collect(),
            };
            for note in notes.into_iter().take(limit) {
                let mut note_path = self.plot_path.join(self.factory.model());
                if mode == PlotMode::ByAdmission {
                    note_path = note_path.join(format!("{}-{}", adm.hadm_id, note.row_id));
                }
                tokio::fs::create_dir_all(&note_path).await?;
                info!("creating plots for note: {note}");
                for sec in &note.sections {
                    if split_paragraphs(&sec.body).is_empty() {
                        continue;
                    }
                    if let Err(e) = self
                        .plot_section(sec, note, mode, &note_path, &mut rows, &mut files)
                        .await
                    {
                        warn!("Error creating plot for note {}: {e:#}--skipping", note.row_id);
                    }
                }
            }
        }
        if mode == PlotMode::ByParagraph {
            tokio::fs::create_dir_all(&self.plot_path).await?;
            write_proofing(&self.plot_path, &rows, &self.proofing_url, annotators)?;
        }
        Ok(files)
    }

    async fn plot_section(
        &self,
        sec: &Section,
        note: &Note,
        mode: PlotMode,
        note_path: &Path,
        rows: &mut Vec<ProofingRow>,
        files: &mut Vec<PathBuf>,
    ) -> anyhow::Result<()> {
        info!("creating plots for section: {} ({})", sec.name, sec.id);
        let paras = self.factory.create(note, sec).await?;
        for (pix, para) in paras.iter().enumerate() {
            let key = ParagraphKey::new(note.row_id, sec.id, pix);
            match mode {
                PlotMode::ByAdmission => {
                    let front_text = format!("Note: {}, sec: {};", note.row_id, sec.id);
                    let sub_path = para
                        .sub_path
                        .clone()
                        .unwrap_or_else(|| format!("{}-{pix}", sec.id));
                    let sents: Vec<_> = para.sents.iter().map(|s| &s.amr).collect();
                    let dot_file = note_path.join(format!("{sub_path}.dot"));
                    self.write_plot(&dot_file, &render_dot(&sents, Some(&front_text)))
                        .await?;
                    files.push(dot_file);
                }
                PlotMode::ByParagraph => {
                    for (six, sent) in para.sents.iter().enumerate() {
                        let gix = key.sentence_id(six);
                        for model in &self.comparison_models {
                            rows.push(ProofingRow {
                                id: gix.clone(),
                                how_correct: None,
                                issues: None,
                                file: format!("{model}/{gix}.pdf"),
                                hadm_id: note.hadm_id.clone(),
                                note_id: note.row_id,
                                category: note.category.clone(),
                                section: sec.id,
                                sent: sent.norm(),
                            });
                        }
                        info!("plotting {gix}");
                        let dot_file = note_path.join(format!("{gix}.dot"));
                        let front_text = format!("[{gix}]");
                        self.write_plot(&dot_file, &render_dot(&[&sent.amr], Some(&front_text)))
                            .await?;
                        files.push(dot_file);
                    }
                }
            }
        }
        Ok(())
    }

    async fn write_plot(&self, dot_file: &Path, dot: &str) -> anyhow::Result<()> {
        tokio::fs::write(dot_file, dot).await?;
        if let Some(command) = &self.render_command {
            let pdf_file = dot_file.with_extension("pdf");
            let status = Command::new(command)
                .arg("-Tpdf")
                .arg("-o")
                .arg(&pdf_file)
                .arg(dot_file)
                .status()
                .await?;
            anyhow::ensure!(status.success(), "{command} failed on {}: {status}", dot_file.display());
        }
        Ok(())
    }

    /// Return the sentence with id `<row_id>-<sec_id>-<pix>-<six>`.
    pub async fn get_sent(&self, hadm_id: &str, sent_id: &str) -> anyhow::Result<AmrFeatureSentence> {
        let (key, six) = ParagraphKey::parse_sentence_id(sent_id)?;
        let adm = self.corpus.admission(hadm_id).await?;
        let note = adm.note_by_id(key.row_id)?;
        let para = self.factory.paragraph(note, key.sec_id, key.pix).await?;
        let len = para.sents.len();
        para.sents
            .into_iter()
            .nth(six)
            .ok_or_else(|| {
                ClinicalAmrError::OutOfRange {
                    what: "sentence",
                    index: six,
                    len,
                }
                .into()
            })
    }

    /// Check a proofed sheet against the corpus and write the rows that have
    /// a correctness value.  Returns the number of rows written.
    pub async fn feasibility_report(&self, input: &Path, output: &Path) -> anyhow::Result<usize> {
        let mut reader = csv::Reader::from_path(input)?;
        let proofed: Vec<ProofedRow> = reader.deserialize().collect::<Result<Vec<_>, _>>()?;
        let mut rows = Vec::new();
        for row in proofed {
            let Some(correctness) = row.correctness.clone().filter(|c| !c.trim().is_empty()) else {
                continue;
            };
            let sent = match self.get_sent(&row.hadm_id, &row.id).await {
                Ok(sent) => sent,
                Err(e) => {
                    error!("Could not get sentence: {}: {e:#}", row.id);
                    continue;
                }
            };
            let norm = sent.norm();
            let org_sent: String = row.sent.chars().take(FEASIBILITY_MATCH_LEN).collect();
            let match_sent: String = norm.chars().take(FEASIBILITY_MATCH_LEN).collect();
            anyhow::ensure!(
                org_sent == match_sent,
                "Sentences mismatch: {org_sent} != {match_sent} for {}",
                row.id
            );
            rows.push(FeasibilityRow {
                id: row.id.clone(),
                correctness,
                issues: row.issues.clone(),
                model: row.model().to_string(),
                sent: norm,
            });
        }
        write_rows(output, &rows)?;
        info!("wrote: {} ({} rows)", output.display(), rows.len());
        Ok(rows.len())
    }
}
