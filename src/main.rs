use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use updatejson::config::{self, Config};
use updatejson::logging::{self, LogConfig};
use updatejson::service::{Request, ResponseCache, UpdateHandler, UpdateService};
use updatejson::version::database::Database;
use updatejson::version::repositories::CurseForgeRepository;

#[derive(Parser)]
#[command(name = "updatejson")]
#[command(version, about = "Forge update.json feeds for CurseForge projects")]
struct Cli {
    /// Log to a file instead of stderr (defaults to the data directory)
    #[arg(long, global = true)]
    log_file: Option<Option<PathBuf>>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one request through the handler and print the response
    ///
    /// Each invocation handles a single request and exits, so answers are
    /// not memoized across runs. Stored versions persist in the database.
    Request {
        /// Request target, e.g. `/238222/jei?ml=forge`
        target: String,
        #[arg(long, default_value = "localhost")]
        host: String,
    },
    /// Print the feed of a mod
    Lookup {
        project: i64,
        mod_id: String,
        #[arg(long)]
        loader: Option<String>,
        /// Print promo key to file URL instead of the feed
        #[arg(long)]
        references: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init(&LogConfig {
        file: cli
            .log_file
            .map(|path| path.unwrap_or_else(config::log_path)),
        json: cli.log_json,
    })?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command))
}

async fn run(command: Command) -> anyhow::Result<()> {
    let config = Config::from_env()?;

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let store = Arc::new(Database::new(&config.database_path)?);
    let repository = Arc::new(CurseForgeRepository::new(
        &config.api_base_url,
        config.api_key.clone(),
    ));
    let service = UpdateService::new(store, repository, config.max_in_flight);

    match command {
        Command::Request { target, host } => {
            let cache = Arc::new(ResponseCache::new(config.cache_ttl));
            let sweeper = cache.spawn_sweeper(config.sweep_interval);
            let handler = UpdateHandler::new(service, cache, config.default_loader);

            info!("Handling {}{}", host, target);
            let response = handler.handle(&Request::from_target(host, &target)).await;
            sweeper.abort();

            println!("{}", response.status);
            for (name, value) in &response.headers {
                println!("{}: {}", name, value);
            }
            if let Some(body) = response.body {
                println!();
                println!("{}", body);
            }
        }
        Command::Lookup {
            project,
            mod_id,
            loader,
            references,
        } => {
            let loader = loader
                .map(|l| l.to_lowercase())
                .unwrap_or_else(|| config.default_loader.as_str().to_string());
            let feed = service.get_update_json(project, &mod_id, &loader).await?;
            let output = if references {
                serde_json::to_string_pretty(&feed.references)?
            } else {
                serde_json::to_string_pretty(&feed)?
            };
            println!("{}", output);
        }
    }

    Ok(())
}
