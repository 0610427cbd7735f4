//! Annotates the history of present illness of a discharge summary from a
//! note events database and checks the output against committed text.

use std::sync::Arc;

use async_trait::async_trait;
use clinicamr_core::{
    AmrAnnotator, AmrGraph, AmrParser, AmrSentence, CorpusAccessor, CuiFormat, CuiPopulator,
    FeatureDocumentParser, ParagraphFactory, SectionSplitter, TokenIndexMapper, write_paragraphs,
};
use clinicamr_corpus::MimicCorpus;
use clinicamr_providers::LexiconConceptLinker;
use clinicamr_stash::DirectoryParagraphCache;
use sqlx::sqlite::SqlitePoolOptions;

const GOLDEN: &str = include_str!("resources/amr-paras.txt");

const LEXICON: &str = "term,cui,pref_name,ent
kidney failure,C0035078,Kidney Failure,T047
patient,C0030705,Patients,T101
fever,C0015967,Fever,T184
chest pain,C0008031,Chest Pain,T184
";

const DISCHARGE_SUMMARY: &str = "Admission Date:  [**2150-3-1**]     Discharge Date:   [**2150-3-9**]

Date of Birth:  [**2080-1-1**]     Sex:   M

Service: MEDICINE

Allergies:
Patient recorded as having No Known Allergies to Drugs

Attending:[**First Name3 (LF) 1**]

Chief Complaint:
kidney failure

Major Surgical or Invasive Procedure:
None

History of Present Illness:
Patient presents with kidney failure.

He denies fever. No chest pain.

Past Medical History:
CHF

Social History:
Lives alone.

Family History:
Noncontributory.

Physical Exam:
Afebrile.

Pertinent Results:
Creatinine 4.2

Brief Hospital Course:
Dialysis started.

Discharge Medications:
Aspirin

Discharge Diagnosis:
Kidney failure
";

struct StubParser;

#[async_trait]
impl AmrParser for StubParser {
    async fn parse(&self, sents: &[String]) -> anyhow::Result<Vec<AmrSentence>> {
        sents
            .iter()
            .map(|s| -> anyhow::Result<AmrSentence> {
                let graph = match s.as_str() {
                    "Patient presents with kidney failure." => {
                        "(p / present-01 :ARG0 (p2 / patient) :ARG1 (f / fail-01 :ARG1 (k / kidney)))"
                    }
                    "He denies fever." => "(d / deny-01 :ARG0 (h / he) :ARG1 (f / fever))",
                    "No chest pain." => "(p / pain :polarity - :location (c / chest))",
                    _ => anyhow::bail!("unexpected sentence: {s}"),
                };
                Ok(AmrSentence::new(AmrGraph::parse(graph)?))
            })
            .collect()
    }

    fn model(&self) -> &str {
        "spring"
    }
}

/// Fails every request, so only cached paragraphs can be produced.
struct OfflineParser;

#[async_trait]
impl AmrParser for OfflineParser {
    async fn parse(&self, _sents: &[String]) -> anyhow::Result<Vec<AmrSentence>> {
        anyhow::bail!("parse service is offline")
    }

    fn model(&self) -> &str {
        "spring"
    }
}

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
        (1001, "2150-03-09", "Discharge summary", "Report", DISCHARGE_SUMMARY),
        (1002, "2150-03-02", "Radiology", "CHEST (PA & LAT)", "IMPRESSION: No acute process."),
    ];
    for (row_id, chartdate, category, description, text) in rows {
        sqlx::query(
            "INSERT INTO noteevents (row_id, hadm_id, chartdate, category, description, text) VALUES (?, 151608, ?, ?, ?, ?)",
        )
        .bind(row_id)
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

fn factory(parser: Arc<dyn AmrParser>, cache: DirectoryParagraphCache) -> ParagraphFactory {
    let linker = LexiconConceptLinker::from_reader(LEXICON.as_bytes()).unwrap();
    let doc_parser = FeatureDocumentParser::new()
        .unwrap()
        .with_linker(Box::new(linker));
    let annotator = AmrAnnotator::new(parser, TokenIndexMapper::new("toki"));
    ParagraphFactory::new(doc_parser, annotator, Arc::new(cache))
        .with_decorator(Box::new(CuiPopulator::new("toki", "cui", CuiFormat::Cui)))
}

async fn render(factory: &ParagraphFactory, corpus: &MimicCorpus) -> String {
    let adm = corpus.admission("151608").await.unwrap();
    let note = adm.discharge_summary().unwrap();
    let secs = note.sections_by_name("history-of-present-illness");
    assert_eq!(secs.len(), 1);
    let paras = factory.create(note, secs[0]).await.unwrap();
    let mut out = Vec::new();
    write_paragraphs(&paras, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn discharge_summary_sections() {
    let corpus = corpus().await;
    let adm = corpus.admission("151608").await.unwrap();
    assert_eq!(adm.notes.len(), 2);
    let note = adm.discharge_summary().unwrap();
    assert_eq!(note.row_id, 1001);
    assert_eq!(note.sections.len(), 16);
    let names: Vec<&str> = note.sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names[7], "history-of-present-illness");
    assert_eq!(names[15], "discharge-diagnosis");
}

#[tokio::test]
async fn history_of_present_illness_matches_golden() {
    let corpus = corpus().await;
    let dir = tempfile::tempdir().unwrap();
    let factory = factory(
        Arc::new(StubParser),
        DirectoryParagraphCache::new(dir.path()),
    );

    let adm = corpus.admission("151608").await.unwrap();
    let note = adm.discharge_summary().unwrap();
    let hpi = note.sections_by_name("history-of-present-illness")[0];
    let paras = factory.create(note, hpi).await.unwrap();
    assert_eq!(paras.len(), 2);
    assert_eq!(paras[0].sub_path.as_deref(), Some("7-0"));

    assert_eq!(render(&factory, &corpus).await, GOLDEN);
}

#[tokio::test]
async fn regenerated_from_cache_is_identical() {
    let corpus = corpus().await;
    let dir = tempfile::tempdir().unwrap();
    let first = factory(
        Arc::new(StubParser),
        DirectoryParagraphCache::new(dir.path()),
    );
    let parsed = render(&first, &corpus).await;

    let cached = factory(
        Arc::new(OfflineParser),
        DirectoryParagraphCache::new(dir.path()),
    );
    assert_eq!(render(&cached, &corpus).await, parsed);
    assert_eq!(parsed, GOLDEN);

    cached.clear().await.unwrap();
    let adm = corpus.admission("151608").await.unwrap();
    let note = adm.discharge_summary().unwrap();
    let hpi = note.sections_by_name("history-of-present-illness")[0];
    assert!(cached.create(note, hpi).await.is_err());
}
