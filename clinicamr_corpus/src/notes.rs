use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use clinicamr_core::{CorpusAccessor, HospitalAdmission, Note, SectionSplitter};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{debug, info};

type NoteRow = (i64, String, Option<String>, String, Option<String>, String);

const NOTES_BY_ADMISSION: &str = "SELECT row_id, CAST(hadm_id AS TEXT), chartdate, category, description, text \
     FROM noteevents WHERE hadm_id = ? ORDER BY row_id";

/// The `noteevents` table of a MIMIC-III SQLite database.
pub struct MimicCorpus {
    pool: SqlitePool,
    splitter: SectionSplitter,
}

impl MimicCorpus {
    pub async fn connect(database_path: &Path, splitter: SectionSplitter) -> anyhow::Result<Self> {
        if !database_path.exists() {
            anyhow::bail!("MIMIC-III database not found at: {}", database_path.display());
        }
        let db_url = format!("sqlite:{}?mode=ro", database_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&db_url)
            .await?;
        info!("Connected to MIMIC-III database: {}", database_path.display());
        Ok(Self::from_pool(pool, splitter))
    }

    #[must_use]
    pub const fn from_pool(pool: SqlitePool, splitter: SectionSplitter) -> Self {
        Self { pool, splitter }
    }

    fn to_note(&self, row: NoteRow) -> Note {
        let (row_id, hadm_id, chartdate, category, description, text) = row;
        let sections = self.splitter.split(&text);
        Note {
            row_id,
            hadm_id,
            category: category.trim().to_string(),
            description: description.unwrap_or_default(),
            chartdate: chartdate.as_deref().and_then(parse_chartdate),
            text,
            sections,
        }
    }
}

/// Parse the date part of a `YYYY-MM-DD[ HH:MM:SS]` chart date.
fn parse_chartdate(s: &str) -> Option<NaiveDate> {
    let date = s.trim().get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[async_trait]
impl CorpusAccessor for MimicCorpus {
    async fn admission(&self, hadm_id: &str) -> anyhow::Result<HospitalAdmission> {
        let rows: Vec<NoteRow> = sqlx::query_as(NOTES_BY_ADMISSION)
            .bind(hadm_id)
            .fetch_all(&self.pool)
            .await?;
        if rows.is_empty() {
            anyhow::bail!("No notes for admission: {hadm_id}");
        }
        let notes: Vec<Note> = rows.into_iter().map(|row| self.to_note(row)).collect();
        debug!("admission {hadm_id}: {} notes", notes.len());
        Ok(HospitalAdmission {
            hadm_id: hadm_id.to_string(),
            notes,
        })
    }

    async fn admission_ids(&self) -> anyhow::Result<Vec<String>> {
        let ids: Vec<(String,)> = sqlx::query_as(
            "SELECT CAST(hadm_id AS TEXT) FROM noteevents WHERE hadm_id IS NOT NULL GROUP BY hadm_id ORDER BY hadm_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn exists(&self, hadm_id: &str) -> anyhow::Result<bool> {
        let found: Option<(i64,)> =
            sqlx::query_as("SELECT row_id FROM noteevents WHERE hadm_id = ? LIMIT 1")
                .bind(hadm_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }
}
