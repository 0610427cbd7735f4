use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

/// One sentence plot to proof; `how_correct` and `issues` are left for the
/// annotator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProofingRow {
    pub id: String,
    pub how_correct: Option<String>,
    pub issues: Option<String>,
    pub file: String,
    pub hadm_id: String,
    pub note_id: i64,
    pub category: String,
    pub section: usize,
    pub sent: String,
}

impl ProofingRow {
    /// The row with its file as a spreadsheet link to the proofing site.
    fn linked(&self, proofing_url: &str) -> Self {
        let url = format!("{}/{}", proofing_url.trim_end_matches('/'), self.file);
        Self {
            file: format!("=HYPERLINK(\"{url}\",\"{}\")", self.file),
            ..self.clone()
        }
    }
}

/// A proofed row read back from an annotator's sheet.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProofedRow {
    pub id: String,
    #[serde(alias = "how_correct", alias = "how correct", default)]
    pub correctness: Option<String>,
    #[serde(default)]
    pub issues: Option<String>,
    pub file: String,
    pub hadm_id: String,
    pub sent: String,
}

impl ProofedRow {
    /// Model name: the first path component of the plot file, which may be
    /// wrapped in a `HYPERLINK` formula.
    pub fn model(&self) -> &str {
        let file = self
            .file
            .strip_prefix("=HYPERLINK(")
            .and_then(|f| f.rsplit(",\"").next())
            .map_or(self.file.as_str(), |f| f.trim_end_matches(')').trim_matches('"'));
        file.split('/').next().unwrap_or(file)
    }
}

/// A row of the feasibility report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeasibilityRow {
    pub id: String,
    pub correctness: String,
    pub issues: Option<String>,
    pub model: String,
    pub sent: String,
}

/// Write `proofing.csv` and one `proofing-<annotator>.csv` per annotator, rows
/// split in equal chunks and the remainder given to the last annotator.
pub(crate) fn write_proofing(
    plot_path: &Path,
    rows: &[ProofingRow],
    proofing_url: &str,
    annotators: &[String],
) -> anyhow::Result<()> {
    let linked: Vec<ProofingRow> = rows.iter().map(|r| r.linked(proofing_url)).collect();
    let csv_file = plot_path.join("proofing.csv");
    write_rows(&csv_file, &linked)?;
    info!("wrote: {}", csv_file.display());

    for (annotator, chunk) in chunk_rows(&linked, annotators) {
        let ann_file = plot_path.join(format!("proofing-{annotator}.csv"));
        write_rows(&ann_file, chunk)?;
        info!("wrote: {} ({} rows)", ann_file.display(), chunk.len());
    }
    Ok(())
}

fn chunk_rows<'a>(rows: &'a [ProofingRow], annotators: &'a [String]) -> Vec<(&'a str, &'a [ProofingRow])> {
    if annotators.is_empty() {
        return Vec::new();
    }
    let chunk_size = rows.len() / annotators.len();
    annotators
        .iter()
        .enumerate()
        .map(|(i, ann)| {
            let start = i * chunk_size;
            let end = if i + 1 == annotators.len() {
                rows.len()
            } else {
                start + chunk_size
            };
            (ann.as_str(), &rows[start..end])
        })
        .collect()
}

pub(crate) fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: usize) -> ProofingRow {
        ProofingRow {
            id: format!("1-2-0-{id}"),
            how_correct: None,
            issues: None,
            file: format!("t5/1-2-0-{id}.pdf"),
            hadm_id: "100".to_string(),
            note_id: 1,
            category: "Discharge summary".to_string(),
            section: 2,
            sent: "He denies fever.".to_string(),
        }
    }

    #[test]
    fn remainder_goes_to_last_annotator() {
        let rows: Vec<ProofingRow> = (0..7).map(row).collect();
        let anns = vec!["kunal".to_string(), "adam".to_string(), "paul".to_string()];
        let sizes: Vec<(&str, usize)> = chunk_rows(&rows, &anns)
            .into_iter()
            .map(|(a, c)| (a, c.len()))
            .collect();
        assert_eq!(sizes, vec![("kunal", 2), ("adam", 2), ("paul", 3)]);
        assert!(chunk_rows(&rows, &[]).is_empty());
    }

    #[test]
    fn file_becomes_hyperlink() {
        let linked = row(0).linked("http://localhost:8000/proof/");
        assert_eq!(
            linked.file,
            "=HYPERLINK(\"http://localhost:8000/proof/t5/1-2-0-0.pdf\",\"t5/1-2-0-0.pdf\")"
        );
    }

    #[test]
    fn model_from_plain_and_linked_file() {
        let mut proofed = ProofedRow {
            id: "1-2-0-0".to_string(),
            correctness: Some("3".to_string()),
            issues: None,
            file: "gsii/1-2-0-0.pdf".to_string(),
            hadm_id: "100".to_string(),
            sent: "He denies fever.".to_string(),
        };
        assert_eq!(proofed.model(), "gsii");
        proofed.file = row(0).linked("http://localhost:8000/proof").file;
        assert_eq!(proofed.model(), "t5");
    }
}
