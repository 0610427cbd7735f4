use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClinicalAmrError>;

/// Errors raised by the annotation pipeline and its domain types.
#[derive(Debug, Error)]
pub enum ClinicalAmrError {
    #[error("PENMAN parse error at offset {offset}: {message}")]
    Penman { offset: usize, message: String },

    #[error("Bad token index value '{value}' in role {role}")]
    TokenIndex { role: String, value: String },

    #[error("Parser returned {actual} graphs for {expected} sentences")]
    ParseCount { expected: usize, actual: usize },

    #[error("No discharge summaries for admission: {0}")]
    NoDischargeSummary(String),

    #[error("No such note {row_id} in admission {hadm_id}")]
    NoteNotFound { hadm_id: String, row_id: i64 },

    #[error("No such section {sec_id} in note {row_id}")]
    SectionNotFound { row_id: i64, sec_id: usize },

    #[error("Bad sentence id: {0}")]
    SentenceId(String),

    #[error("Index {index} out of range for {what} (length {len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invalid regex: {0}")]
    Regex(#[from] regex::Error),
}
