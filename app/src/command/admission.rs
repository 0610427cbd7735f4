use std::io::Write;
use std::path::PathBuf;

use clinicamr_config::Config;
use tracing::info;

use super::build_admission_factory;

/// Input parameters for the Admission command strategy.
#[derive(Debug, Clone)]
pub struct AdmissionInput {
    pub config: Config,
    pub hadm_id: String,
    /// File to write to instead of standard out
    pub output: Option<PathBuf>,
}

/// Strategy for building and writing an admission AMR document.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionStrategy;

impl super::CommandStrategy for AdmissionStrategy {
    type Input = AdmissionInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let factory = build_admission_factory(&input.config).await?;
        let adm = factory.load(&input.hadm_id).await?;
        match input.output {
            Some(path) => {
                let mut file = std::io::BufWriter::new(std::fs::File::create(&path)?);
                adm.write(&mut file)?;
                file.flush()?;
                info!("wrote: {}", path.display());
            }
            None => adm.write(&mut std::io::stdout().lock())?,
        }
        Ok(())
    }
}
