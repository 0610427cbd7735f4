use clap::ValueEnum;
use clinicamr_config::Config;
use clinicamr_plot::PlotMode;
use tracing::info;

use super::{build_corpus, build_plotter};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PlotModeArg {
    ByAdmission,
    ByParagraph,
}

impl From<PlotModeArg> for PlotMode {
    fn from(mode: PlotModeArg) -> Self {
        match mode {
            PlotModeArg::ByAdmission => Self::ByAdmission,
            PlotModeArg::ByParagraph => Self::ByParagraph,
        }
    }
}

/// Input parameters for the Plot command strategy.
#[derive(Debug, Clone)]
pub struct PlotInput {
    pub config: Config,
    /// Admissions to plot; defaults to the annotated notes' admissions
    pub hadm_ids: Vec<String>,
    pub limit: Option<usize>,
    pub mode: PlotModeArg,
    /// Annotators to split the proofing rows between
    pub annotators: Vec<String>,
}

/// Strategy for plotting admissions.
#[derive(Debug, Clone, Copy)]
pub struct PlotStrategy;

impl super::CommandStrategy for PlotStrategy {
    type Input = PlotInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = input.config;
        let hadm_ids = if input.hadm_ids.is_empty() {
            match &config.corpus.annotated_notes {
                Some(path) => clinicamr_corpus::read_annotated_notes(path)?
                    .into_keys()
                    .collect(),
                None => build_corpus(&config).await?.admission_ids().await?,
            }
        } else {
            input.hadm_ids
        };
        let annotators = if input.annotators.is_empty() {
            config.plot.annotators.clone()
        } else {
            input.annotators
        };
        let plotter = build_plotter(&config).await?;
        let files = plotter
            .plot(&hadm_ids, input.limit, input.mode.into(), &annotators)
            .await?;
        info!("wrote {} plots to {}", files.len(), config.plot.path.display());
        Ok(())
    }
}
