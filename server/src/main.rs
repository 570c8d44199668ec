use anyhow::Result;
use axum::Router;
use clap::{ArgGroup, Parser};
use server::{build_app, IndexSource};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};
use triage_core::query::{DEFAULT_THRESHOLD, DEFAULT_TOP_K};
use triage_core::QueryParams;

#[derive(Parser)]
#[command(group(ArgGroup::new("source").required(true).args(["dataset", "index"])))]
struct Args {
    /// Historical ticket dataset to fit at startup
    #[arg(long, env = "TRIAGE_DATASET")]
    dataset: Option<PathBuf>,
    /// Prebuilt snapshot directory
    #[arg(long, env = "TRIAGE_INDEX")]
    index: Option<PathBuf>,
    /// Host to bind
    #[arg(long, env = "TRIAGE_HOST", default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, env = "TRIAGE_PORT", default_value_t = 8080)]
    port: u16,
    /// Suggestions returned when a request does not say
    #[arg(long, env = "TRIAGE_TOP_K", default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
    /// Minimum adjusted score when a request does not say
    #[arg(long, env = "TRIAGE_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let source = match (args.dataset, args.index) {
        (Some(path), _) => IndexSource::Dataset(path),
        (None, Some(dir)) => IndexSource::Snapshot(dir),
        (None, None) => anyhow::bail!("pass --dataset or --index"),
    };
    let defaults = QueryParams::new(args.top_k, args.threshold)?;
    let app: Router = build_app(&source, defaults)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
