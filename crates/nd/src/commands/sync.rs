//! `nd sync` command implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use nd_config::SyncConfig;
use nd_notion::{NotionApi, NotionClient};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the sync command.
#[derive(Args)]
pub(crate) struct SyncArgs {
    /// Path to configuration file.
    #[arg(short, long, default_value = "notedown.toml")]
    config: PathBuf,

    /// Notion API integration token.
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    token: String,

    /// Enable verbose output (per-page render and timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl SyncArgs {
    /// Execute the sync command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading fails or rendering aborts.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Arc::new(SyncConfig::load(&self.config)?);
        let client = NotionClient::new(self.token);
        let stats = client.stats();
        let api: Arc<dyn NotionApi> = Arc::new(client);

        output.info(&format!(
            "Syncing collection {} into {}...",
            config.root_collection,
            config.out_dir.display()
        ));

        let started = Instant::now();
        let report = nd_render::sync(api, Arc::clone(&config)).await?;

        output.success(&format!(
            "\nSync finished in {:.1}s",
            started.elapsed().as_secs_f64()
        ));
        output.info(&format!("Pages written: {}", report.pages()));
        output.info(&format!("Entries indexed: {}", report.entries()));
        output.info(&format!("Index: {}", config.index_path.display()));
        output.info(&format!(
            "API requests: {} ({} retried)",
            stats.requests(),
            stats.retries()
        ));

        Ok(())
    }
}
