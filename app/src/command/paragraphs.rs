use clinicamr_config::Config;
use clinicamr_core::write_paragraphs;

use super::{build_corpus, build_factory};

/// Input parameters for the Paragraphs command strategy.
#[derive(Debug, Clone)]
pub struct ParagraphsInput {
    pub config: Config,
    pub hadm_id: String,
    /// Section name, such as `history-of-present-illness`
    pub section: String,
}

/// Strategy for printing the annotated paragraphs of a discharge summary
/// section.
#[derive(Debug, Clone, Copy)]
pub struct ParagraphsStrategy;

impl super::CommandStrategy for ParagraphsStrategy {
    type Input = ParagraphsInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let corpus = build_corpus(&input.config).await?;
        let factory = build_factory(&input.config).await?;
        let adm = corpus.admission(&input.hadm_id).await?;
        let note = adm.discharge_summary()?;
        let secs = note.sections_by_name(&input.section);
        if secs.is_empty() {
            anyhow::bail!("No section {} in note {}", input.section, note.row_id);
        }
        let mut stdout = std::io::stdout().lock();
        for sec in secs {
            let paras = factory.create(note, sec).await?;
            write_paragraphs(&paras, &mut stdout)?;
        }
        Ok(())
    }
}
