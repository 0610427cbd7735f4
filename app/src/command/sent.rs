use clinicamr_config::Config;

use super::build_plotter;

/// Input parameters for the Sent command strategy.
#[derive(Debug, Clone)]
pub struct SentInput {
    pub config: Config,
    pub hadm_id: String,
    /// Sentence id: `<row_id>-<sec_id>-<paragraph index>-<sentence index>`
    pub sent_id: String,
}

/// Strategy for printing a sentence from the proofing sheets.
#[derive(Debug, Clone, Copy)]
pub struct SentStrategy;

impl super::CommandStrategy for SentStrategy {
    type Input = SentInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let plotter = build_plotter(&input.config).await?;
        let sent = plotter.get_sent(&input.hadm_id, &input.sent_id).await?;
        println!("{}", sent.text());
        println!("{}", sent.amr);
        Ok(())
    }
}
