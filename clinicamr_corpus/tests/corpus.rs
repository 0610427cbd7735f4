use clinicamr_core::{CorpusAccessor, SectionSplitter};
use clinicamr_corpus::MimicCorpus;
use sqlx::sqlite::SqlitePoolOptions;

async fn corpus() -> MimicCorpus {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query(
        r"
        CREATE TABLE noteevents (
            row_id INTEGER PRIMARY KEY,
            subject_id INTEGER,
            hadm_id INTEGER,
            chartdate TEXT,
            category TEXT,
            description TEXT,
            text TEXT
        )
        ",
    )
    .execute(&pool)
    .await
    .unwrap();
    let rows = [
        (12, 100, "2150-03-09", "Discharge summary", "Report", "Chief Complaint:\nfever\n\nHistory of Present Illness:\nHe denies fever."),
        (10, 100, "2150-03-02 00:00:00", "Radiology", "CHEST", "IMPRESSION: No acute process."),
        (20, 200, "2151-01-01", "Nursing", "Note", "Pt resting."),
    ];
    for (row_id, hadm_id, chartdate, category, description, text) in rows {
        sqlx::query(
            "INSERT INTO noteevents (row_id, subject_id, hadm_id, chartdate, category, description, text) VALUES (?, 1, ?, ?, ?, ?, ?)",
        )
        .bind(row_id)
        .bind(hadm_id)
        .bind(chartdate)
        .bind(category)
        .bind(description)
        .bind(text)
        .execute(&pool)
        .await
        .unwrap();
    }
    MimicCorpus::from_pool(pool, SectionSplitter::with_defaults().unwrap())
}

#[tokio::test]
async fn admission_notes_are_sectioned() {
    let corpus = corpus().await;
    let adm = corpus.admission("100").await.unwrap();
    let row_ids: Vec<i64> = adm.notes.iter().map(|n| n.row_id).collect();
    assert_eq!(row_ids, vec![10, 12]);
    let ds = adm.discharge_summary().unwrap();
    assert_eq!(ds.row_id, 12);
    assert_eq!(ds.hadm_id, "100");
    let hpi = ds.sections_by_name("history-of-present-illness");
    assert_eq!(hpi.len(), 1);
    assert_eq!(hpi[0].body, "He denies fever.");
    let rad = adm.note_by_id(10).unwrap();
    assert_eq!(rad.chartdate.unwrap().to_string(), "2150-03-02");
    assert_eq!(rad.sections[0].name, "impression");
}

#[tokio::test]
async fn admission_ids_and_exists() {
    let corpus = corpus().await;
    assert_eq!(corpus.admission_ids().await.unwrap(), vec!["100", "200"]);
    assert!(corpus.exists("200").await.unwrap());
    assert!(!corpus.exists("300").await.unwrap());
    assert!(corpus.admission("300").await.is_err());
}
