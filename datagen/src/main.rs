use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "datagen")]
#[command(about = "Generate a synthetic historical IT ticket dataset as CSV")]
struct Cli {
    /// Output CSV path
    #[arg(long, default_value = "./data/tickets.csv")]
    output: PathBuf,
    /// Tickets generated for each category
    #[arg(long, default_value_t = 60)]
    per_category: usize,
    /// Seed for reproducible output; random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let rows = datagen::generate(&mut rng, args.per_category);
    datagen::write_csv(&args.output, &rows)?;
    tracing::info!(output = %args.output.display(), rows = rows.len(), "dataset written");
    Ok(())
}
