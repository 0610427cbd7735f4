use std::path::PathBuf;

use clinicamr_config::Config;
use clinicamr_plot::render_dot;
use tracing::info;

use super::build_factory;

/// Input parameters for the Parse command strategy.
#[derive(Debug, Clone)]
pub struct ParseInput {
    pub config: Config,
    /// Text to parse
    pub text: String,
    /// Directory to write a plot of the parse to
    pub plot_dir: Option<PathBuf>,
}

/// Strategy for parsing free text and printing its annotated graphs.
#[derive(Debug, Clone, Copy)]
pub struct ParseStrategy;

impl super::CommandStrategy for ParseStrategy {
    type Input = ParseInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let factory = build_factory(&input.config).await?;
        let doc = factory.annotate_text(&input.text).await?;
        println!("{}", doc.amr().graph_string());

        if let Some(dir) = input.plot_dir {
            tokio::fs::create_dir_all(&dir).await?;
            let sents: Vec<_> = doc.sents.iter().map(|s| &s.amr).collect();
            let dot_file = dir.join("parse.dot");
            tokio::fs::write(&dot_file, render_dot(&sents, None)).await?;
            info!("wrote: {}", dot_file.display());
        }
        Ok(())
    }
}
