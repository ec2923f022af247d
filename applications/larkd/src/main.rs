/// Lark daemon - music playback sequencing over a local collection
use clap::{Parser, Subcommand};
use larkd::{DaemonConfig, DaemonEvent, Dispatcher};
use lark_importer::CollectionScanner;
use lark_storage::Catalog;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "larkd")]
#[command(about = "Lark music daemon", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the line protocol on stdin/stdout
    Serve {
        /// Configuration file path
        #[arg(short, long, env = "LARK_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Synchronize the catalog with the music directory and exit
    Scan {
        /// Configuration file path
        #[arg(short, long, env = "LARK_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Configuration file path
        #[arg(short, long, env = "LARK_CONFIG")]
        config: Option<PathBuf>,
    },
    /// List the genres in the catalog
    Genres {
        /// Configuration file path
        #[arg(short, long, env = "LARK_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the protocol
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "larkd=info,lark_playback=info,lark_importer=info,lark_storage=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(load_config(config)?).await?,
        Commands::Scan { config } => scan(load_config(config)?).await?,
        Commands::Config { config } => print!("{}", load_config(config)?.to_toml()?),
        Commands::Genres { config } => list_genres(load_config(config)?).await?,
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<DaemonConfig> {
    let config = DaemonConfig::load(path.as_deref())?;
    config.validate()?;
    Ok(config)
}

async fn open_database(config: &DaemonConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let pool = lark_storage::create_pool(&config.library.database_url).await?;
    lark_storage::run_migrations(&pool).await?;
    tracing::info!("Database connected");
    Ok(pool)
}

async fn serve(config: DaemonConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Lark daemon");
    tracing::info!("Music directory: {}", config.library.music_dir.display());

    let pool = open_database(&config).await?;
    let catalog = Arc::new(Catalog::load(&pool).await?);

    let (tx, rx) = mpsc::unbounded_channel();
    spawn_stdin_reader(tx.clone());
    spawn_interrupt_handler(tx.clone());

    let mut dispatcher = Dispatcher::new(pool, catalog, &config, tx, std::io::stdout());
    dispatcher.restore_settings().await?;
    if config.library.scan_on_start {
        dispatcher.start_scan();
    }

    dispatcher.run(rx).await?;
    tracing::info!("Lark daemon stopped");
    Ok(())
}

fn spawn_stdin_reader(events: UnboundedSender<DaemonEvent>) {
    tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if events.send(DaemonEvent::Line(line)).is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    let _ = events.send(DaemonEvent::InputClosed);
                    break;
                }
                Err(err) => {
                    tracing::warn!("Failed to read stdin: {}", err);
                    let _ = events.send(DaemonEvent::InputClosed);
                    break;
                }
            }
        }
    });
}

fn spawn_interrupt_handler(events: UnboundedSender<DaemonEvent>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted");
            let _ = events.send(DaemonEvent::InputClosed);
        }
    });
}

async fn scan(config: DaemonConfig) -> anyhow::Result<()> {
    let pool = open_database(&config).await?;
    let report = CollectionScanner::new(config.library.music_dir)
        .scan(&pool)
        .await?;

    for failure in &report.errors {
        tracing::warn!("{}: {}", failure.path.display(), failure.message);
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn list_genres(config: DaemonConfig) -> anyhow::Result<()> {
    let pool = open_database(&config).await?;
    for genre in lark_storage::genres::get_all(&pool).await? {
        println!("{}\t{}", genre.id, genre.name);
    }
    Ok(())
}
