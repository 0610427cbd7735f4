use clinicamr_config::Config;

use super::build_cache;

/// Strategy for removing every cached paragraph.
#[derive(Debug, Clone, Copy)]
pub struct ClearStrategy;

impl super::CommandStrategy for ClearStrategy {
    type Input = Config;

    async fn execute(&self, config: Self::Input) -> anyhow::Result<()> {
        let cache = build_cache(&config).await?;
        let count = cache.keys().await?.len();
        cache.clear().await?;
        println!("Cleared {count} cached paragraphs");
        Ok(())
    }
}
