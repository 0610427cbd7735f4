//! MIMIC-III admissions, notes and their sections.

mod note;
mod section;

use async_trait::async_trait;

pub use note::{DISCHARGE_SUMMARY_CATEGORY, HospitalAdmission, Note, Section};
pub use section::{
    DEFAULT_SECTION, DEFAULT_SECTION_HEADERS, PREAMBLE_SECTION, SectionSplitter, split_paragraphs,
};

/// Read access to the clinical corpus.
#[async_trait]
pub trait CorpusAccessor: Send + Sync {
    /// Load an admission with all of its notes split into sections.
    async fn admission(&self, hadm_id: &str) -> anyhow::Result<HospitalAdmission>;

    async fn admission_ids(&self) -> anyhow::Result<Vec<String>>;

    async fn exists(&self, hadm_id: &str) -> anyhow::Result<bool>;
}
