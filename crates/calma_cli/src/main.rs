use calma_core::{CalmaConfig, Feeling, Severity};
use calma_engine::select_experience;
use calma_server::ApiServer;
use calma_store::SqliteStore;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "calma.toml")]
    config: String,

    /// Override the database path
    #[arg(long)]
    db: Option<String>,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(long)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (the default)
    Serve,
    /// Run the selection engine locally and print the experience
    Checkin {
        /// stress | anxiety | depression | frustration
        #[arg(long)]
        feeling: String,
        /// Intensity, 1..=10
        #[arg(long)]
        severity: u8,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = Args::parse();

    match args.command.take() {
        Some(Command::Checkin { feeling, severity }) => run_check_in(&feeling, severity),
        Some(Command::Serve) | None => serve(args).await,
    }
}

async fn serve(args: Args) -> anyhow::Result<()> {
    let mut config = CalmaConfig::load_or_default(&args.config);
    if let Some(db) = args.db {
        config.database.path = db;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!("Opening store at {}...", config.database.path);
    let store = Arc::new(SqliteStore::new(&config.database.path).await?);

    let server = ApiServer::new(
        store,
        config.auth.clone(),
        &config.server.host,
        config.server.port,
    );
    let handle = server.start();

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    handle.abort();
    Ok(())
}

fn run_check_in(feeling: &str, severity: u8) -> anyhow::Result<()> {
    let feeling: Feeling = feeling.parse()?;
    let severity = Severity::new(severity)?;
    let experience = select_experience(feeling, severity)?;

    println!(
        "Experience for {} at severity {} ({} min):",
        feeling, severity, experience.duration_minutes
    );
    for item in &experience.items {
        println!(
            "  [{:?}] {} — {}",
            item.kind,
            item.title,
            item.url.as_deref().unwrap_or("-")
        );
    }
    println!("  Prompts:");
    for prompt in &experience.prompts {
        println!("    - {}", prompt);
    }
    if let Some(b) = experience.breathing {
        println!(
            "  Breathing: inhale {}s, hold {}s, exhale {}s × {} cycles",
            b.inhale_secs, b.hold_secs, b.exhale_secs, b.cycles
        );
    }
    Ok(())
}
