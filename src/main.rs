use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use backlog::config::Config;
use backlog::db::Database;
use backlog::hierarchy::Hierarchy;
use backlog::{api, render};

#[derive(Parser)]
#[command(name = "backlog")]
#[command(about = "Hierarchical backlog of epics, features, tasks and bugs")]
struct Cli {
    /// Database file (overrides BACKLOG_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API (overrides BACKLOG_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Also apply containment rules when moving nodes
        #[arg(long)]
        validate_moves: bool,
    },
    /// Print the backlog as a tree
    Tree,
    /// Renumber sibling orders to 0..n, repairing duplicates and gaps
    Normalize,
}

/// Initialize tracing with output to stderr (for one-shot commands) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "backlog=info,tower_http=debug".into()),
    );

    if use_stderr {
        // Keep stdout clean for the command's own output
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

fn open_hierarchy(config: &Config) -> anyhow::Result<Hierarchy<Database>> {
    let db = Database::open_configured(config.db_path.clone())?;
    db.migrate()?;
    Ok(Hierarchy::with_policy(db, config.policy()))
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting backlog server on port {}", config.port);

    let hierarchy = open_hierarchy(&config)?;
    let app = api::create_router(hierarchy);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", config.port)).await?;
    tracing::info!("backlog server listening on http://127.0.0.1:{}", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = matches!(cli.command, Some(Commands::Tree | Commands::Normalize));
    init_tracing(use_stderr);

    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = Some(db);
    }

    match cli.command {
        Some(Commands::Serve {
            port,
            validate_moves,
        }) => {
            if let Some(port) = port {
                config.port = port;
            }
            config.validate_containment_on_move |= validate_moves;
            serve(config).await?;
        }
        Some(Commands::Tree) => {
            let hierarchy = open_hierarchy(&config)?;
            print!("{}", render::render_tree(&hierarchy.forest()?));
        }
        Some(Commands::Normalize) => {
            let hierarchy = open_hierarchy(&config)?;
            let updates = hierarchy.normalize()?;
            if updates.is_empty() {
                println!("Sibling orders are already normalized");
            } else {
                println!("Renumbered {} node(s)", updates.len());
            }
        }
        None => serve(config).await?,
    }

    Ok(())
}
