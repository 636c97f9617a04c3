use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use server_core::domains::jobs::ingest::Feed;
use server_core::domains::notifications::NotificationPayload;
use server_core::kernel::scheduled_tasks::start_scheduler;
use server_core::kernel::ServerDeps;
use server_core::Config;

#[derive(Parser)]
#[command(name = "jobs_cli", about = "Job feed aggregation and push notifications")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one ingestion pass for a feed (reddit or web3career)
    Ingest { feed: String },
    /// Broadcast a notification to every subscriber
    Notify {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long)]
        badge: Option<String>,
    },
    /// Show how many push subscribers are registered
    Subscriptions,
    /// Create or update the database schema
    Migrate,
    /// Run the scheduler until interrupted
    Run,
}

#[derive(Serialize)]
struct IngestSummary {
    feed: String,
    created: usize,
    skipped: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server_core=debug,sqlx=warn")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let deps = ServerDeps::new(pool, &config)?;

    match cli.command {
        Commands::Ingest { feed } => {
            let feed: Feed = feed.parse()?;
            let report = deps.run_ingestion(feed).await?;
            let summary = IngestSummary {
                feed: feed.to_string(),
                created: report.created.len(),
                skipped: report.skipped,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Notify {
            title,
            body,
            url,
            icon,
            badge,
        } => {
            let mut payload = NotificationPayload::new(title, body, url);
            if icon.is_some() {
                payload.icon = icon;
            }
            if badge.is_some() {
                payload.badge = badge;
            }
            let report = deps.notifier.send_to_all(&payload).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Subscriptions => {
            let count =
                server_core::domains::notifications::Subscription::count(&deps.db_pool).await?;
            println!("{}", serde_json::json!({ "subscriptions": count }));
        }
        Commands::Migrate => {
            server_core::schema::run_migrations(&deps.db_pool).await?;
            println!("{}", serde_json::json!({ "migrated": true }));
        }
        Commands::Run => {
            let mut scheduler = start_scheduler(deps).await?;
            tokio::signal::ctrl_c().await?;
            scheduler.shutdown().await?;
        }
    }

    Ok(())
}
