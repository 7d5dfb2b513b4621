use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
    time::Instant,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::{distributions::Alphanumeric, rngs::StdRng, Rng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use string_queue::{LinkedQueue, QueueError};

mod script;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

/// number of distinct strings the benchmark cycles through
const STRING_POOL: usize = 1024;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match Cli::parse().command {
        Command::Bench(config) => benchmark(config),
        Command::Run { script: path } => match path {
            Some(path) => {
                let file = File::open(&path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                script::run(BufReader::new(file), io::stdout().lock())
            }
            None => script::run(io::stdin().lock(), io::stdout().lock()),
        },
    }
}

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Time a random mix of operations on a single queue.
    Bench(BenchConfig),
    /// Execute a queue command script.
    Run {
        /// script to execute; reads stdin when omitted.
        script: Option<PathBuf>,
    },
}

#[derive(Args)]
struct BenchConfig {
    /// number of elements to add to the queue before starting the timed
    /// operations.
    #[arg(long, default_value_t = 0)]
    prefill: usize,
    /// number of timed operations.
    #[arg(long)]
    operations: usize,
    /// length of every inserted string.
    #[arg(long, default_value_t = 8)]
    string_len: usize,
    /// seed for the workload generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// reverse and sort the queue every this many operations, 0 disables.
    #[arg(long, default_value_t = 0)]
    reshape_every: usize,
    /// cpu core to pin the benchmark thread to.
    #[arg(long)]
    core: Option<usize>,
}

fn benchmark(config: BenchConfig) -> Result<()> {
    if let Some(core) = config.core {
        let pinned = core_affinity::get_core_ids()
            .and_then(|ids| ids.into_iter().find(|id| id.id == core))
            .map_or(false, core_affinity::set_for_current);
        if !pinned {
            warn!(core, "could not pin benchmark thread");
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let pool: Vec<String> = (0..STRING_POOL)
        .map(|_| {
            (&mut rng)
                .sample_iter(Alphanumeric)
                .take(config.string_len)
                .map(char::from)
                .collect()
        })
        .collect();

    let mut queue = LinkedQueue::new();
    for i in 0..config.prefill {
        queue.insert_tail(&pool[i % STRING_POOL])?;
    }
    info!(prefill = config.prefill, operations = config.operations, "starting benchmark");

    let mut buf = vec![0u8; config.string_len + 1];
    let mut inserts = 0usize;
    let mut removals = 0usize;
    let mut reshapes = 0usize;
    let start = Instant::now();
    for op in 1..=config.operations {
        let value = &pool[rng.gen_range(0..STRING_POOL)];
        match rng.gen_range(0..3) {
            0 => {
                queue.insert_head(value)?;
                inserts += 1;
            }
            1 => {
                queue.insert_tail(value)?;
                inserts += 1;
            }
            _ => match queue.remove_head(Some(buf.as_mut_slice())) {
                Ok(()) => removals += 1,
                Err(QueueError::Empty) => {}
                Err(err) => return Err(err.into()),
            },
        }
        if config.reshape_every > 0 && op % config.reshape_every == 0 {
            queue.reverse();
            queue.sort();
            reshapes += 1;
        }
    }
    let elapsed = start.elapsed();

    println!(
        "throughput: {}",
        config.operations as f64 / elapsed.as_secs_f64()
    );
    println!("number of inserts: {}", inserts);
    println!("number of removals: {}", removals);
    println!("number of reshapes: {}", reshapes);
    println!("final size: {}", queue.size());
    println!("elapsed: {:?}", elapsed);
    info!(released = queue.destroy(), "benchmark finished");
    Ok(())
}
