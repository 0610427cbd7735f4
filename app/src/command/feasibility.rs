use std::path::PathBuf;

use clinicamr_config::Config;

use super::build_plotter;

/// Input parameters for the Feasibility command strategy.
#[derive(Debug, Clone)]
pub struct FeasibilityInput {
    pub config: Config,
    /// Proofed CSV sheet
    pub input: PathBuf,
    /// Report CSV to write
    pub output: PathBuf,
}

/// Strategy for creating the feasibility report from a proofed sheet.
#[derive(Debug, Clone, Copy)]
pub struct FeasibilityStrategy;

impl super::CommandStrategy for FeasibilityStrategy {
    type Input = FeasibilityInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let plotter = build_plotter(&input.config).await?;
        let count = plotter.feasibility_report(&input.input, &input.output).await?;
        println!("{count} proofed sentences written to {}", input.output.display());
        Ok(())
    }
}
