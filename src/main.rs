use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spectree::{
    api,
    config::Config,
    events::TracingEventSink,
    mcp,
    session::SessionCoordinator,
};

#[derive(Parser)]
#[command(name = "spectree")]
#[command(about = "Execution planning and session handoff for AI agents working on epics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API (overrides SPECTREE_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Start MCP server via stdio (for agent integration)
    Mcp,
}

/// Initialize tracing with output to stderr (for MCP mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "spectree=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // MCP mode: stdout carries the protocol
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting SpecTree server on port {}", config.port);

    let db = config.open_database()?;
    let state = api::AppState::new(db, Arc::new(TracingEventSink), config.history_limit);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", config.port)).await?;
    tracing::info!("SpecTree server listening on http://127.0.0.1:{}", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = matches!(cli.command, Some(Commands::Mcp));
    init_tracing(use_stderr);

    let mut config = Config::from_env();

    match cli.command {
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await?;
        }
        Some(Commands::Mcp) => {
            let db = config.open_database()?;
            let sessions = SessionCoordinator::new(db, Arc::new(TracingEventSink));
            let server = mcp::McpServer::new(sessions, config.history_limit);

            mcp::run_stdio_server(server).await?;
        }
        None => serve(config).await?,
    }

    Ok(())
}
