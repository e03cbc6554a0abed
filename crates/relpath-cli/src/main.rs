//! CLI binary for relpath: align tokenizations and extract, render and encode
//! paths between entity spans over JSON-lines batches.

mod batch;
mod records;

use anyhow::{Context, Result};
use batch::{BatchIo, Summary};
use clap::{Parser, Subcommand};
use records::Pipeline;
use relpath_core::anchor::AnchorMode;
use relpath_core::config::RelpathConfig;
use relpath_core::node_id::NodeIds;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "relpath", about = "Relation paths between entity spans")]
struct Cli {
    /// Project root holding .relpath/config.toml (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// JSON-lines input file (defaults to stdin)
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// JSON-lines output file (defaults to stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Worker threads, 0 for one per core (overrides the config file)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Span anchor: `parent` of the first token or the span's `head`
    #[arg(long, global = true)]
    anchor: Option<AnchorMode>,

    /// Node ids of parse tokens: `layered` (0.<n>) or `plain` (<n>)
    #[arg(long, global = true)]
    node_ids: Option<NodeIds>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align `tokens` with `parse_tokens` and report totality/surjectivity
    Align,

    /// Render the path between the subject and object anchors
    Paths,

    /// Encode every terminal by the labels on its way to the root
    Encodings,

    /// Distance of each token from the subject-object path over `heads`
    Distances,
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;
    let mut config = RelpathConfig::load(&project_root)?;
    if let Some(threads) = cli.threads {
        config.batch.threads = threads;
    }
    if let Some(mode) = cli.anchor {
        config.anchor.mode = mode;
    }
    if let Some(node_ids) = cli.node_ids {
        config.anchor.node_ids = node_ids;
    }

    if config.batch.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.batch.threads)
            .build_global()
            .context("failed to configure worker threads")?;
    }

    let io = BatchIo {
        input: cli.input,
        output: cli.output,
    };
    let pipeline = Pipeline::new(&config);

    let summary = match cli.command {
        Commands::Align => cmd_align(&io, &pipeline),
        Commands::Paths => cmd_paths(&io, &pipeline),
        Commands::Encodings => cmd_encodings(&io, &pipeline),
        Commands::Distances => cmd_distances(&io, &pipeline),
    }?;

    if summary.failed > 0 {
        tracing::warn!(
            "{} of {} sentences could not be processed",
            summary.failed,
            summary.records
        );
    }
    Ok(())
}

fn cmd_align(io: &BatchIo, pipeline: &Pipeline) -> Result<Summary> {
    batch::run(io, |record| pipeline.align(record))
}

fn cmd_paths(io: &BatchIo, pipeline: &Pipeline) -> Result<Summary> {
    batch::run(io, |record| pipeline.paths(record))
}

fn cmd_encodings(io: &BatchIo, pipeline: &Pipeline) -> Result<Summary> {
    batch::run(io, |record| pipeline.encodings(record))
}

fn cmd_distances(io: &BatchIo, pipeline: &Pipeline) -> Result<Summary> {
    batch::run(io, |record| pipeline.distances(record))
}
