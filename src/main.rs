//! AgentGraph chat — console entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI flags
//!   3. Load settings (YAML + environment); fail before any UI on error
//!   4. Resolve effective log level (`-v` flags > env > config), init logger
//!   5. Build the agent graph and the chat facade
//!   6. Spawn Ctrl-C → shutdown watcher
//!   7. Run the console shell until quit / EOF / Ctrl-C

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::info;

use agentgraph_chat::chat::ChatBot;
use agentgraph_chat::error::AppError;
use agentgraph_chat::graph::build_graph;
use agentgraph_chat::memory::TranscriptStore;
use agentgraph_chat::ui::{run_shell, Session};
use agentgraph_chat::{config, logger};

#[derive(Debug, Parser)]
#[command(name = "agentgraph-chat", version, about = "Chat with the agent graph from the terminal")]
struct Cli {
    /// Tools config file (default: configs/tools_config.yml)
    #[arg(long, value_name = "PATH")]
    tools_config: Option<PathBuf>,

    /// Project config file (default: configs/project_config.yml, if present)
    #[arg(long, value_name = "PATH")]
    project_config: Option<PathBuf>,

    /// Increase logging verbosity (-v warn, -vv info, -vvv debug, -vvvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let settings = config::load(cli.tools_config.as_deref(), cli.project_config.as_deref())?;

    let cli_level = logger::level_for_verbosity(cli.verbose);
    let effective_log_level = cli_level.unwrap_or(settings.project.log_level.as_str());
    logger::init(effective_log_level)?;

    info!(
        model = %settings.primary_agent.llm,
        thread_id = %settings.thread_id(),
        memory_dir = %settings.project.memory_dir.display(),
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    let graph = Arc::new(build_graph(&settings)?);
    let store = TranscriptStore::new(settings.project.memory_dir.clone());
    let chat = ChatBot::new(graph, store, settings.thread_id());

    // Ctrl-C handler — cancels the token so the shell loop exits.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let mut session = Session::new();
    let mut stdout = std::io::stdout();
    run_shell(&chat, &mut session, tokio::io::stdin(), &mut stdout, shutdown).await?;

    writeln!(stdout, "\nBye :) ...")?;
    stdout.flush()?;
    Ok(())
}
