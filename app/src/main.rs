#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use clinicamr_config::Config;
use command::{
    AdmissionInput, AdmissionStrategy, ClearStrategy, CommandStrategy, FeasibilityInput,
    FeasibilityStrategy, InfoStrategy, InitStrategy, ParagraphsInput, ParagraphsStrategy,
    ParseInput, ParseStrategy, PlotInput, PlotModeArg, PlotStrategy, SentInput, SentStrategy,
    VersionStrategy,
};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "clinicamr")]
#[command(about = "AMR annotation of MIMIC-III clinical notes", long_about = None)]
struct Cli {
    /// Configuration file, defaults to ~/clinicamr/config.json
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse free text and print its graphs
    Parse {
        /// Text to parse
        #[arg(short = 't', long, default_value = "He died of liver failure.")]
        text: String,

        /// Directory to write a DOT plot of the parse to
        #[arg(short = 'p', long)]
        plot_dir: Option<PathBuf>,
    },
    /// Print the annotated paragraphs of a discharge summary section
    Paragraphs {
        #[arg(short = 'a', long)]
        hadm_id: String,

        /// Section name, such as history-of-present-illness
        #[arg(short = 's', long, default_value = "history-of-present-illness")]
        section: String,
    },
    /// Build and write the AMR document of an admission
    Admission {
        #[arg(short = 'a', long)]
        hadm_id: String,

        /// Output file, defaults to standard out
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Plot admissions and write the proofing sheets
    Plot {
        /// Comma separated admission ids, defaults to the annotated notes
        #[arg(short = 'a', long, value_delimiter = ',')]
        hadm_ids: Vec<String>,

        /// Maximum number of admissions to plot
        #[arg(short = 'l', long)]
        limit: Option<usize>,

        #[arg(short = 'm', long, value_enum, default_value = "by-admission")]
        mode: PlotModeArg,

        /// Comma separated annotators, defaults to the configured annotators
        #[arg(long, value_delimiter = ',')]
        annotators: Vec<String>,
    },
    /// Print a sentence by its proofing sheet id
    Sent {
        #[arg(short = 'a', long)]
        hadm_id: String,

        /// Sentence id as <row_id>-<sec_id>-<pix>-<six>
        #[arg(short = 's', long)]
        sent_id: String,
    },
    /// Create the feasibility report from a proofed sheet
    Feasibility {
        /// Proofed CSV sheet
        #[arg(short = 'i', long)]
        input: PathBuf,

        /// Report CSV to write
        #[arg(short = 'o', long)]
        output: PathBuf,
    },
    /// Remove every cached paragraph
    Clear,
    /// Show configuration and connection status
    Info,
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    info!(
        "Loaded config from {}",
        path.map_or_else(|| Config::default_path().display().to_string(), |p| {
            p.display().to_string()
        })
    );
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Parse { text, plot_dir } => {
            let input = ParseInput {
                config: load_config(config_path)?,
                text,
                plot_dir,
            };
            ParseStrategy.execute(input).await?;
        }
        Commands::Paragraphs { hadm_id, section } => {
            let input = ParagraphsInput {
                config: load_config(config_path)?,
                hadm_id,
                section,
            };
            ParagraphsStrategy.execute(input).await?;
        }
        Commands::Admission { hadm_id, output } => {
            let input = AdmissionInput {
                config: load_config(config_path)?,
                hadm_id,
                output,
            };
            AdmissionStrategy.execute(input).await?;
        }
        Commands::Plot {
            hadm_ids,
            limit,
            mode,
            annotators,
        } => {
            let input = PlotInput {
                config: load_config(config_path)?,
                hadm_ids,
                limit,
                mode,
                annotators,
            };
            PlotStrategy.execute(input).await?;
        }
        Commands::Sent { hadm_id, sent_id } => {
            let input = SentInput {
                config: load_config(config_path)?,
                hadm_id,
                sent_id,
            };
            SentStrategy.execute(input).await?;
        }
        Commands::Feasibility { input, output } => {
            let input = FeasibilityInput {
                config: load_config(config_path)?,
                input,
                output,
            };
            FeasibilityStrategy.execute(input).await?;
        }
        Commands::Clear => ClearStrategy.execute(load_config(config_path)?).await?,
        Commands::Info => InfoStrategy.execute(load_config(config_path)?).await?,
        Commands::Init => InitStrategy.execute(()).await?,
        Commands::Version => VersionStrategy.execute(()).await?,
    }

    Ok(())
}
