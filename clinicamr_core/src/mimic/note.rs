use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ClinicalAmrError, Result};

/// Category of MIMIC-III discharge summary notes.
pub const DISCHARGE_SUMMARY_CATEGORY: &str = "Discharge summary";

/// A named section of a clinical note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Ordinal of the section in its note.
    pub id: usize,
    /// Slug of the header, such as `history-of-present-illness`.
    pub name: String,
    /// Header text as written in the note.
    pub header: Option<String>,
    pub body: String,
}

/// A clinical note split into sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub row_id: i64,
    pub hadm_id: String,
    pub category: String,
    pub description: String,
    pub chartdate: Option<NaiveDate>,
    pub text: String,
    pub sections: Vec<Section>,
}

impl Note {
    #[must_use]
    pub fn is_discharge_summary(&self) -> bool {
        self.category == DISCHARGE_SUMMARY_CATEGORY
    }

    pub fn section(&self, sec_id: usize) -> Result<&Section> {
        self.sections
            .iter()
            .find(|s| s.id == sec_id)
            .ok_or(ClinicalAmrError::SectionNotFound {
                row_id: self.row_id,
                sec_id,
            })
    }

    /// Sections with the given name; a note can repeat a header.
    #[must_use]
    pub fn sections_by_name(&self, name: &str) -> Vec<&Section> {
        self.sections.iter().filter(|s| s.name == name).collect()
    }
}

impl std::fmt::Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.row_id, self.category, self.description)
    }
}

/// The notes of one hospital admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalAdmission {
    pub hadm_id: String,
    pub notes: Vec<Note>,
}

impl HospitalAdmission {
    #[must_use]
    pub fn notes_by_category(&self) -> BTreeMap<&str, Vec<&Note>> {
        let mut by_cat: BTreeMap<&str, Vec<&Note>> = BTreeMap::new();
        for note in &self.notes {
            by_cat.entry(note.category.as_str()).or_default().push(note);
        }
        by_cat
    }

    pub fn note_by_id(&self, row_id: i64) -> Result<&Note> {
        self.notes
            .iter()
            .find(|n| n.row_id == row_id)
            .ok_or_else(|| ClinicalAmrError::NoteNotFound {
                hadm_id: self.hadm_id.clone(),
                row_id,
            })
    }

    /// The most recently charted discharge summary.
    pub fn discharge_summary(&self) -> Result<&Note> {
        self.notes
            .iter()
            .filter(|n| n.is_discharge_summary())
            .max_by(|a, b| a.chartdate.cmp(&b.chartdate).then(b.row_id.cmp(&a.row_id)))
            .ok_or_else(|| ClinicalAmrError::NoDischargeSummary(self.hadm_id.clone()))
    }
}
