//! hippo-memory: per-user semantic memory engine for autonomous agents
//!
//! CLI for the write/read/forget/consolidate paths plus a `serve` command
//! exposing the REST API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hippo_memory::config::{EngineConfig, ServerConfig};
use hippo_memory::constants::DEFAULT_RECALL_LIMIT;
use hippo_memory::handlers::{build_router, ServerState};
use hippo_memory::memory::{MemoryEngine, MemoryId, WriteContext};
use hippo_memory::validation;

#[derive(Parser)]
#[command(name = "hippo-memory", version, about = "Semantic memory engine for agents")]
struct Cli {
    /// Storage root (default: platform data dir, HIPPO_STORAGE_PATH override)
    #[arg(long, global = true)]
    storage_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store a memory
    Memorize {
        /// Free text to remember
        content: String,

        /// Extra tags beyond the auto-derived ones
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Project the memory belongs to
        #[arg(long, default_value = "")]
        project: String,

        /// Invocation path
        #[arg(long, default_value = "")]
        path: String,
    },

    /// Recall memories by meaning (lists most recent when no query given)
    Recall {
        /// Query text
        query: Option<String>,

        /// Maximum results
        #[arg(long, default_value_t = DEFAULT_RECALL_LIMIT)]
        limit: usize,
    },

    /// Delete a memory by id
    Forget {
        /// Memory id (UUID)
        id: String,
    },

    /// Purge stub memories and synthesize project snapshots
    Consolidate,

    /// Report unresolved bugs and technical debt for a project
    Risks {
        /// Project name
        project: String,
    },

    /// Run the REST API server
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = EngineConfig::from_env();
    if let Some(path) = cli.storage_path {
        config.storage_path = path;
    }

    match cli.command {
        Command::Memorize { content, tags, project, path } => {
            validation::validate_content(&content)?;
            validation::validate_tags(&tags)?;

            let engine = MemoryEngine::open(config)?;
            let outcome = engine.memorize(&content, &tags, &WriteContext { project, path })?;
            if outcome.created {
                println!("stored {} (tags: {})", outcome.id, outcome.tags.join(", "));
                if let Some(prior) = outcome.conflict_with {
                    println!("  potential conflict with {prior}");
                }
            } else {
                println!("already known as {}", outcome.id);
            }
        }

        Command::Recall { query, limit } => {
            let engine = MemoryEngine::open(config)?;
            match query {
                Some(query) => {
                    validation::validate_query(&query)?;
                    let results = engine.recall(&query, limit, None)?;
                    if results.is_empty() {
                        println!("no matching memories");
                    }
                    for result in results {
                        println!(
                            "[{:.3}] ({}) {}  {}",
                            result.distance, result.relation, result.id, result.content
                        );
                    }
                }
                None => {
                    let mut memories = engine.list()?;
                    memories.sort_by(|a, b| b.metadata.timestamp.cmp(&a.metadata.timestamp));
                    for memory in memories.into_iter().take(limit) {
                        println!(
                            "[{}] {}  {}",
                            memory.metadata.timestamp.format("%Y-%m-%d %H:%M"),
                            memory.id,
                            memory.content
                        );
                    }
                }
            }
        }

        Command::Forget { id } => {
            let uuid = validation::validate_memory_id(&id)?;
            let engine = MemoryEngine::open(config)?;
            engine.forget(&MemoryId(uuid))?;
            println!("forgot {id}");
        }

        Command::Consolidate => {
            let engine = MemoryEngine::open(config)?;
            let report = engine.consolidate()?;
            println!(
                "purged {} stub memories, created {} snapshot(s), {} project(s) already consolidated",
                report.purged, report.snapshots_created, report.projects_already_consolidated
            );
        }

        Command::Risks { project } => {
            validation::validate_project(&project)?;
            let engine = MemoryEngine::open(config)?;
            let findings = engine.risks(&project)?;
            if findings.is_empty() {
                println!("no risk signals for '{project}'");
            }
            for finding in findings {
                println!("- {finding}");
            }
        }

        Command::Serve { host, port } => {
            let mut server = ServerConfig::from_env();
            if let Some(host) = host {
                server.host = host;
            }
            if let Some(port) = port {
                server.port = port;
            }
            serve(config, server).await?;
        }
    }

    Ok(())
}

async fn serve(config: EngineConfig, server: ServerConfig) -> Result<()> {
    let engine = MemoryEngine::open(config)?;
    info!(memories = engine.len(), "engine opened");

    let state = Arc::new(ServerState { engine });
    let router = build_router(state);

    let addr: SocketAddr = format!("{}:{}", server.host, server.port).parse()?;
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
