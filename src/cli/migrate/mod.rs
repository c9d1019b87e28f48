//! Migrate command - applies the embedded schema to PostgreSQL and exits

use clap::Args;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::infrastructure::logging::{self, LoggingConfig};
use crate::infrastructure::storage::{postgres, revert_last_migration, run_migrations};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Database URL; overrides `storage.database_url` and `DATABASE_URL`
    #[arg(long)]
    pub database_url: Option<String>,

    /// Revert the most recently applied migration instead of applying
    #[arg(long)]
    pub revert: bool,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let (config, load_error) = AppConfig::load_or_default();
    logging::init_logging(&LoggingConfig::from(&config.logging));
    if let Some(e) = load_error {
        warn!("Failed to load configuration, using defaults: {}", e);
    }

    let url = args
        .database_url
        .or_else(|| config.storage.database_url.clone())
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .ok_or_else(|| anyhow::anyhow!("No database URL: pass --database-url or set DATABASE_URL"))?;

    let pool = postgres::connect(&config.storage.postgres_config(url)).await?;

    if args.revert {
        let version = revert_last_migration(&pool).await?;
        info!(current_version = ?version, "Reverted last migration");
    } else {
        run_migrations(&pool).await?;
        info!("Migrations applied");
    }

    pool.close().await;
    Ok(())
}
