//! CLI for the search engine: data generation, index build, line-protocol
//! search, and the HTTP server.

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use kimera_search::graph::BuildParams;
use kimera_search::{protocol, write_artifact, DistanceKernel, SearchEngine, VectorStore};

#[derive(Parser)]
#[command(name = "kimera-search")]
#[command(about = "Approximate nearest neighbor search over static embedding corpora", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy)]
enum Metric {
    SquaredEuclidean,
    NegativeDot,
}

impl From<Metric> for DistanceKernel {
    fn from(metric: Metric) -> Self {
        match metric {
            Metric::SquaredEuclidean => DistanceKernel::SquaredEuclidean,
            Metric::NegativeDot => DistanceKernel::NegativeDot,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a raw embeddings file of seeded random float32 rows
    Generate {
        /// Output file path
        output: PathBuf,
        /// Number of embeddings
        #[arg(long)]
        count: usize,
        /// Embedding dimension
        #[arg(long, default_value = "128")]
        dim: usize,
        /// RNG seed (fixed default keeps runs reproducible)
        #[arg(long, default_value = "42")]
        seed: u64,
    },
    /// Build an index artifact from a raw embeddings file
    Build {
        /// Raw embeddings file (headerless little-endian float32)
        embeddings: PathBuf,
        /// Output artifact path
        output: PathBuf,
        /// Number of embeddings in the file
        #[arg(long)]
        count: usize,
        /// Embedding dimension
        #[arg(long, default_value = "128")]
        dim: usize,
        /// Max neighbors per node
        #[arg(long, default_value = "16")]
        max_degree: usize,
        /// Candidate-frontier width during construction
        #[arg(long, default_value = "128")]
        ef_construction: usize,
        /// Distance metric
        #[arg(long, value_enum, default_value = "squared-euclidean")]
        metric: Metric,
    },
    /// Serve queries over stdin/stdout using the line protocol
    Search {
        /// Index artifact path
        index: PathBuf,
        /// Raw embeddings file the artifact was built from
        embeddings: PathBuf,
        /// Number of embeddings
        #[arg(long)]
        count: usize,
        /// Embedding dimension
        #[arg(long, default_value = "128")]
        dim: usize,
        /// Candidate-frontier width at query time
        #[arg(long, default_value = "64")]
        ef_search: usize,
        /// Distance metric (must match the artifact)
        #[arg(long, value_enum, default_value = "squared-euclidean")]
        metric: Metric,
    },
    /// Start the HTTP API server
    Serve {
        /// Index artifact path
        index: PathBuf,
        /// Raw embeddings file the artifact was built from
        embeddings: PathBuf,
        /// Number of embeddings
        #[arg(long)]
        count: usize,
        /// Embedding dimension
        #[arg(long, default_value = "128")]
        dim: usize,
        /// Default candidate-frontier width at query time
        #[arg(long, default_value = "64")]
        ef_search: usize,
        /// Distance metric (must match the artifact)
        #[arg(long, value_enum, default_value = "squared-euclidean")]
        metric: Metric,
        /// Address to bind to
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: String,
    },
}

fn generate(output: &PathBuf, count: usize, dim: usize, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut file = File::create(output)?;

    eprintln!("Generating {} embeddings of dimension {}...", count, dim);
    let mut buf = Vec::with_capacity(dim * 4);
    for _ in 0..count {
        buf.clear();
        for _ in 0..dim {
            buf.extend_from_slice(&rng.gen::<f32>().to_le_bytes());
        }
        file.write_all(&buf)?;
    }
    file.sync_all()?;

    eprintln!("Saved {} raw embeddings to {:?}.", count, output);
    Ok(())
}

fn run_line_protocol(engine: &SearchEngine, ef_search: usize) -> Result<()> {
    eprintln!("Index loaded. Ready to receive queries on stdin.");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        // Per-request errors are reported and the stream keeps going.
        match protocol::parse_query_line(&line, engine.dimension())
            .and_then(|(k, query)| engine.search(&query, k, ef_search))
        {
            Ok(results) => protocol::write_results(&mut stdout, &results)?,
            Err(e) => eprintln!("Request failed: {}", e),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            output,
            count,
            dim,
            seed,
        } => generate(&output, count, dim, seed),
        Commands::Build {
            embeddings,
            output,
            count,
            dim,
            max_degree,
            ef_construction,
            metric,
        } => {
            eprintln!("Loading embeddings from {:?}...", embeddings);
            let store = VectorStore::load(&embeddings, count, dim)?;

            eprintln!("Building search index...");
            let params = BuildParams {
                dimension: dim,
                max_degree,
                ef_construction,
                kernel: metric.into(),
            };
            let engine = SearchEngine::build(store, params)?;

            eprintln!("Saving index to {:?}...", output);
            write_artifact(&output, engine.graph())?;
            eprintln!("Index built and saved successfully.");
            Ok(())
        }
        Commands::Search {
            index,
            embeddings,
            count,
            dim,
            ef_search,
            metric,
        } => {
            eprintln!("Loading pre-built index from {:?}...", index);
            let engine = SearchEngine::open(&embeddings, &index, count, dim, metric.into())?;
            run_line_protocol(&engine, ef_search)
        }
        Commands::Serve {
            index,
            embeddings,
            count,
            dim,
            ef_search,
            metric,
            addr,
        } => {
            eprintln!("Loading pre-built index from {:?}...", index);
            let engine = SearchEngine::open(&embeddings, &index, count, dim, metric.into())?;
            kimera_search::server::start(&addr, engine, ef_search).await
        }
    }
}
