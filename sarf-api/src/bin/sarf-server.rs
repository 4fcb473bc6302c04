use clap::Parser;
use sarf_api::start_server;
use sarf_storage::{Storage, StorageOptions};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "sarf-server", about = "Arabic morphology service")]
struct Cli {
    /// HTTP listening address
    #[arg(long, env = "SARF_ADDR", default_value = "0.0.0.0:8000")]
    addr: SocketAddr,

    /// Directory holding the snapshot, journal and optional rule files
    #[arg(long, env = "SARF_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,

    /// Irregular rule table; defaults to <data-dir>/irregular_rules.txt
    #[arg(long, env = "SARF_RULES_FILE")]
    rules_file: Option<PathBuf>,

    /// Category metadata (JSON); defaults to <data-dir>/categories.json
    #[arg(long, env = "SARF_CATEGORIES_FILE")]
    categories_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_observability();

    let cli = Cli::parse();
    info!("Starting Sarf Server");
    info!("Data directory: {:?}", cli.data_dir);

    let options = StorageOptions {
        data_dir: cli.data_dir,
        rules_file: cli.rules_file,
        categories_file: cli.categories_file,
    };
    let mut storage = Storage::open_with(options)?;
    if storage.journal_len() > 0 {
        storage.compact()?;
    }

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    let listener = tokio::net::TcpListener::bind(cli.addr).await?;
    info!("Listening on http://{}", cli.addr);
    start_server(listener, storage, shutdown).await.await??;

    info!("Server stopped successfully");
    Ok(())
}

fn init_observability() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .json();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,sarf_api=debug,sarf_storage=debug,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();
}
