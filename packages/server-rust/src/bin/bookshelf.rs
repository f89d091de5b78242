//! `bookshelf` binary: parses flags, installs logging, and runs the server
//! until Ctrl-C or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use bookshelf_core::{BookRepository, IdAssignment, InMemoryBookStore};
use bookshelf_server::network::DEFAULT_PORT;
use bookshelf_server::{NetworkConfig, NetworkModule};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum IdAssignmentArg {
    /// Next id is the last record's id + 1.
    LastPlusOne,
    /// Next id is the highest id ever assigned + 1.
    Monotonic,
}

impl From<IdAssignmentArg> for IdAssignment {
    fn from(arg: IdAssignmentArg) -> Self {
        match arg {
            IdAssignmentArg::LastPlusOne => IdAssignment::LastPlusOne,
            IdAssignmentArg::Monotonic => IdAssignment::Monotonic,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

/// In-memory book collection served over HTTP.
#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about)]
struct Args {
    /// Address to bind.
    #[arg(long, env = "BOOKSHELF_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "BOOKSHELF_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// How ids are assigned to new books.
    #[arg(long, value_enum, default_value_t = IdAssignmentArg::LastPlusOne)]
    id_assignment: IdAssignmentArg,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    /// Allowed CORS origin; repeat for several. Defaults to any origin.
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,

    /// Log output format. Filtering follows `RUST_LOG` (default `info`).
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Start with an empty collection instead of the two seed books.
    #[arg(long)]
    empty: bool,
}

impl Args {
    fn network_config(&self) -> NetworkConfig {
        let mut config = NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..NetworkConfig::default()
        };
        if !self.cors_origins.is_empty() {
            config.cors_origins.clone_from(&self.cors_origins);
        }
        config
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let id_assignment = IdAssignment::from(args.id_assignment);
    let store = if args.empty {
        InMemoryBookStore::new(id_assignment)
    } else {
        InMemoryBookStore::seeded(id_assignment)
    };
    info!(books = store.len(), ?id_assignment, "Book store initialized");

    let mut module = NetworkModule::new(args.network_config(), Arc::new(store));
    module.start().await?;
    module.serve(shutdown_signal()).await
}
