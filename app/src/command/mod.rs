//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type.

use std::sync::Arc;
use std::time::Duration;

use clinicamr_config::{CacheBackend, Config};
use clinicamr_core::{
    AdmissionAmrFactory, AmrAnnotator, CorpusAccessor, CuiPopulator, FeatureDocumentParser,
    ParagraphCache, ParagraphFactory, SectionSplitter, TokenIndexMapper,
};
use clinicamr_corpus::{MimicCorpus, read_annotated_notes};
use clinicamr_plot::Plotter;
use clinicamr_providers::{LexiconConceptLinker, SpringAmrParser};
use clinicamr_stash::{DatabaseParagraphCache, DirectoryParagraphCache};
use tracing::info;

mod admission;
mod clear;
mod feasibility;
mod info;
mod init;
mod paragraphs;
mod parse;
mod plot;
mod sent;
mod version;

pub use admission::{AdmissionInput, AdmissionStrategy};
pub use clear::ClearStrategy;
pub use feasibility::{FeasibilityInput, FeasibilityStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use paragraphs::{ParagraphsInput, ParagraphsStrategy};
pub use parse::{ParseInput, ParseStrategy};
pub use plot::{PlotInput, PlotModeArg, PlotStrategy};
pub use sent::{SentInput, SentStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Open the configured paragraph cache.
async fn build_cache(config: &Config) -> anyhow::Result<Arc<dyn ParagraphCache>> {
    Ok(match config.cache.backend {
        CacheBackend::Database => Arc::new(DatabaseParagraphCache::new(&config.cache.url).await?),
        CacheBackend::Directory => {
            info!("Paragraph cache directory: {}", config.cache.directory.display());
            Arc::new(DirectoryParagraphCache::new(&config.cache.directory))
        }
    })
}

/// Build the paragraph factory: tokenizer with concept linking, parse
/// service client, token alignment, CUI population and the cache.
async fn build_factory(config: &Config) -> anyhow::Result<Arc<ParagraphFactory>> {
    let mut doc_parser = FeatureDocumentParser::new()?;
    if let Some(path) = &config.lexicon.path {
        doc_parser = doc_parser.with_linker(Box::new(LexiconConceptLinker::from_path(path)?));
    }

    let parser = SpringAmrParser::new(
        &config.parser.url,
        &config.parser.model,
        Duration::from_secs(config.parser.timeout_secs),
    )?
    .with_retry(
        config
            .parser
            .retry_delays_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect(),
        config.parser.final_retries,
    );

    let ann = &config.annotation;
    let annotator = AmrAnnotator::new(Arc::new(parser), TokenIndexMapper::new(&ann.token_index_role));
    let mut factory = ParagraphFactory::new(doc_parser, annotator, build_cache(config).await?)
        .with_decorator(Box::new(CuiPopulator::new(
            &ann.token_index_role,
            &ann.cui_role,
            ann.cui_format,
        )))
        .with_add_id(ann.add_id)
        .with_id_prefix(ann.id_prefix.clone());
    if let Some(limit) = ann.paragraph_limit {
        factory = factory.with_limit(limit);
    }
    Ok(Arc::new(factory))
}

async fn build_corpus(config: &Config) -> anyhow::Result<Arc<dyn CorpusAccessor>> {
    let splitter = SectionSplitter::new(&config.sections.headers)?;
    Ok(Arc::new(MimicCorpus::connect(&config.corpus.database, splitter).await?))
}

async fn build_admission_factory(config: &Config) -> anyhow::Result<AdmissionAmrFactory> {
    Ok(AdmissionAmrFactory::new(
        build_corpus(config).await?,
        build_factory(config).await?,
        config.summary_sections(),
    ))
}

async fn build_plotter(config: &Config) -> anyhow::Result<Plotter> {
    let mut plotter = Plotter::new(
        build_corpus(config).await?,
        build_factory(config).await?,
        config.plot.path.clone(),
    )
    .with_proofing(config.plot.comparison_models.clone(), config.plot.proofing_url.clone())
    .with_render_command(config.plot.render_command.clone());
    if let Some(path) = &config.corpus.annotated_notes {
        plotter = plotter.with_annotated_notes(read_annotated_notes(path)?);
    }
    Ok(plotter)
}
