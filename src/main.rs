use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kanban_tracker::cli::{self, Cli};
use kanban_tracker::config::Config;
use kanban_tracker::domain::KanbanError;
use kanban_tracker::infrastructure::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_filter = if args.verbose {
        "info,kanban_tracker=debug"
    } else {
        "warn,kanban_tracker=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env, using defaults: {}", e);
        Config::default()
    });
    if let Some(url) = args.database {
        config.database_url = url;
    }

    let pool = db::init_db(&config.database_url, config.max_connections).await?;

    let outcome = cli::execute(&pool, &config, args.command, args.json).await;
    pool.close().await;

    match outcome {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(err) => {
            if matches!(err, KanbanError::Database(_) | KanbanError::Migration(_)) {
                tracing::error!("Storage failure: {:?}", err);
            }
            eprintln!("{}", err);
            std::process::exit(err.exit_code());
        }
    }
}
