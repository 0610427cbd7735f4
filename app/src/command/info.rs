use clinicamr_config::{CacheBackend, Config};
use tracing::info;

use super::{build_cache, build_corpus};

/// Strategy for displaying configuration information.
///
/// Prints the corpus, parse service, annotation, cache and plot settings and
/// checks that the corpus database and paragraph cache can be opened.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = Config;

    async fn execute(&self, config: Self::Input) -> anyhow::Result<()> {
        println!("=== clinicamr Configuration ===\n");

        println!("Corpus:");
        println!("  Database: {}", config.corpus.database.display());
        info!("Testing corpus connection");
        match build_corpus(&config).await {
            Ok(corpus) => match corpus.admission_ids().await {
                Ok(ids) => println!("  Status: Connected ({} admissions)", ids.len()),
                Err(e) => {
                    println!("  Status: Query failed");
                    println!("  Error: {e}");
                }
            },
            Err(e) => {
                println!("  Status: Connection failed");
                println!("  Error: {e}");
            }
        }
        if let Some(ref path) = config.corpus.annotated_notes {
            println!("  Annotated Notes: {}", path.display());
        }
        println!();

        println!("Parser:");
        println!("  URL: {}", config.parser.url);
        println!("  Model: {}", config.parser.model);
        println!("  Timeout: {}s", config.parser.timeout_secs);
        println!(
            "  Retry Delays: {:?} ms, then {} more",
            config.parser.retry_delays_ms, config.parser.final_retries
        );
        println!();

        println!("Annotation:");
        println!("  Token Index Role: :{}", config.annotation.token_index_role);
        println!("  CUI Role: :{}", config.annotation.cui_role);
        println!("  CUI Format: {:?}", config.annotation.cui_format);
        if config.annotation.add_id {
            println!("  Id Prefix: {}", config.annotation.id_prefix);
        }
        if let Some(limit) = config.annotation.paragraph_limit {
            println!("  Paragraph Limit: {limit}");
        }
        match config.lexicon.path {
            Some(ref path) => println!("  Lexicon: {}", path.display()),
            None => println!("  Lexicon: (not set - no concepts linked)"),
        }
        println!();

        println!("Cache:");
        match config.cache.backend {
            CacheBackend::Database => println!("  Database: {}", config.cache.url),
            CacheBackend::Directory => {
                println!("  Directory: {}", config.cache.directory.display());
            }
        }
        match build_cache(&config).await {
            Ok(cache) => match cache.keys().await {
                Ok(keys) => println!("  Status: Ready ({} paragraphs)", keys.len()),
                Err(e) => {
                    println!("  Status: Read failed");
                    println!("  Error: {e}");
                }
            },
            Err(e) => {
                println!("  Status: Connection failed");
                println!("  Error: {e}");
            }
        }
        println!();

        println!("Admission:");
        if config.admission.summary_sections.is_empty() {
            println!("  Summary Sections: (all)");
        } else {
            println!(
                "  Summary Sections: {}",
                config.admission.summary_sections.join(", ")
            );
        }
        println!();

        println!("Plot:");
        println!("  Path: {}", config.plot.path.display());
        println!(
            "  Comparison Models: {}",
            config.plot.comparison_models.join(", ")
        );
        println!("  Proofing URL: {}", config.plot.proofing_url);
        if config.plot.annotators.is_empty() {
            println!("  Annotators: (none)");
        } else {
            println!("  Annotators: {}", config.plot.annotators.join(", "));
        }
        if let Some(ref cmd) = config.plot.render_command {
            println!("  Render Command: {cmd}");
        }

        Ok(())
    }
}
