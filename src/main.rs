use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use brew_projects::{app, auth, config, AppState, Backends};

#[derive(Parser)]
#[command(name = "brew-projects")]
#[command(about = "Projects API - project records with per-project storage containers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP API (default)")]
    Serve,

    #[command(about = "Repair pending projects and remove orphaned containers, then exit")]
    Reconcile,

    #[command(about = "Print a bearer token for an owner, signed with the configured secret")]
    Token {
        #[arg(long, help = "Owner UUID placed in the sub claim")]
        owner: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .init();

    let cli = Cli::parse();
    let config = config::config();
    tracing::info!("Starting Brew Projects in {:?} mode", config.environment);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if config.security.jwt_secret.is_empty() {
                anyhow::bail!("SECURITY_JWT_SECRET (or JWT_SECRET) must be set");
            }

            let backends = Backends::from_config(config).await?;
            let state = AppState::new(backends.project_service(), config.security.jwt_secret.as_str());
            let router = app(state, &config.security);

            let bind_addr = config.bind_addr();
            let listener = tokio::net::TcpListener::bind(&bind_addr)
                .await
                .with_context(|| format!("failed to bind {}", bind_addr))?;

            tracing::info!("Projects API listening on http://{}", bind_addr);
            axum::serve(listener, router).await.context("server error")?;
        }
        Commands::Reconcile => {
            let backends = Backends::from_config(config).await?;
            let report = backends.reconciler(config.reconcile.pending_grace_secs)?.run().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);

            if !report.is_clean() {
                tracing::warn!("Reconcile finished with {} failure(s)", report.failures.len());
                std::process::exit(1);
            }
        }
        Commands::Token { owner } => {
            println!("{}", auth::mint_owner_token(owner, &config.security)?);
        }
    }

    Ok(())
}
