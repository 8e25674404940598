//! rentfeed entry point.
//!
//! Thin CLI over the sync engine: resolve configuration, bring up the pool,
//! apply migrations, then run one pass per channel (or keep looping).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use tracing::{debug, error, info};

use rentfeed::config::ConfigLoader;
use rentfeed::source::HttpMessageSource;
use rentfeed::sync::{ChannelSyncEngine, EngineConfig};
use rentfeed::{db, logging};

#[derive(Parser)]
#[command(name = "rentfeed", about = "Channel listing importer and store sync")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run sync passes over the configured channels.
    Sync {
        /// Channel handle to sync; repeatable. Defaults to the configured list.
        #[arg(long = "channel")]
        channels: Vec<String>,
        /// Lookback window in days. Defaults to the configured value.
        #[arg(long)]
        days: Option<i64>,
        /// Purge persisted listings of each channel before the first pass.
        #[arg(long)]
        reset: bool,
        /// Keep running, one pass per configured interval.
        #[arg(long = "loop")]
        run_loop: bool,
    },
    /// Apply pending database migrations and exit.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new().load()?;
    logging::init_subscriber(&config);
    info!(profile = %config.profile, "loaded configuration");
    if let Ok(redacted) = config.redacted_json() {
        debug!("configuration: {redacted}");
    }

    let db = db::init_pool(&config).await?;
    Migrator::up(&db, None).await?;

    match cli.command {
        Command::Migrate => {
            info!("migrations applied");
        }
        Command::Sync {
            channels,
            days,
            reset,
            run_loop,
        } => {
            let channels = if channels.is_empty() {
                config.channels.clone()
            } else {
                channels
            };
            anyhow::ensure!(
                !channels.is_empty(),
                "no channels to sync: pass --channel or set RENTFEED_CHANNELS"
            );
            let lookback_days = days.unwrap_or(config.lookback_days);

            let source = HttpMessageSource::new(&config.feed_base_url)?;
            let engine = ChannelSyncEngine::new(
                db.clone(),
                Arc::new(source),
                EngineConfig {
                    page_size: config.sync.page_size,
                    max_messages_per_pass: config.sync.max_messages_per_pass,
                },
            );

            let interval = Duration::from_secs(config.sync.interval_seconds);
            let mut reset_pending = reset;
            loop {
                let cutoff = Utc::now() - chrono::Duration::days(lookback_days);
                for handle in &channels {
                    match engine.sync_channel(handle, cutoff, reset_pending).await {
                        Ok(summary) => info!(
                            channel = %handle,
                            seen = summary.seen,
                            inserted = summary.inserted,
                            updated = summary.updated,
                            tombstoned = summary.tombstoned,
                            "channel synced"
                        ),
                        Err(e) => error!(channel = %handle, "sync pass failed: {e}"),
                    }
                }
                reset_pending = false;

                if !run_loop {
                    break;
                }
                info!(
                    seconds = config.sync.interval_seconds,
                    "sleeping until next pass"
                );
                tokio::time::sleep(interval).await;
            }
        }
    }

    Ok(())
}
