use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use triage_core::persist::{load_meta, load_snapshot, save_snapshot, IndexPaths, MetaFile};
use triage_core::query::{DEFAULT_THRESHOLD, DEFAULT_TOP_K};
use triage_core::{QueryParams, TicketIndex};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query the historical ticket similarity index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the index from a dataset (CSV, JSON, JSONL, or a directory of them) and write a snapshot
    Build {
        /// Dataset path (file or directory)
        #[arg(long)]
        input: String,
        /// Output snapshot directory
        #[arg(long)]
        output: String,
    },
    /// Rank historical tickets against a description
    Query {
        /// Dataset to fit before querying
        #[arg(long, conflicts_with = "index")]
        input: Option<String>,
        /// Snapshot directory written by `build`
        #[arg(long)]
        index: Option<String>,
        /// Ticket description
        #[arg(long)]
        q: String,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
    },
    /// Print snapshot metadata
    Inspect {
        #[arg(long)]
        index: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build(&input, &output),
        Commands::Query { input, index, q, top_k, threshold } => {
            let params = QueryParams::new(top_k, threshold)?;
            let index = match (input, index) {
                (Some(input), None) => TicketIndex::build(&input)?,
                (None, Some(dir)) => load_snapshot(&IndexPaths::new(dir))?.0,
                _ => bail!("pass exactly one of --input or --index"),
            };
            let results = index.query(&q, &params);
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Commands::Inspect { index } => {
            let meta = load_meta(&IndexPaths::new(index))?;
            println!("{}", serde_json::to_string_pretty(&meta)?);
            Ok(())
        }
    }
}

fn build(input: &str, output: &str) -> Result<()> {
    let index = TicketIndex::build(input)?;
    let out_paths = IndexPaths::new(output);
    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default();
    let meta = MetaFile::for_index(&index, created_at, Some(input.to_string()));
    save_snapshot(&out_paths, &index, &meta)?;

    tracing::info!(output, num_docs = meta.num_docs, num_terms = meta.num_terms, "snapshot written");
    Ok(())
}
