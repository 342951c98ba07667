use std::error::Error;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use clap::Parser;
use env_logger::{Env, Target};
use log::error;
use csimlib::cache::CacheModel;
use csimlib::config::{PartialSimulationConfig, SimulationConfig};
use csimlib::error::SimError;
use csimlib::io::open_trace;
use csimlib::report::{write_results, RESULTS_PATH};
use csimlib::simulator::Simulator;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Set-associative LRU data cache simulator for memory traces"))]
struct Args {
    /// Number of set index bits, the cache has 2^s sets
    #[arg(short = 's', long)]
    set_index_bits: Option<u32>,

    /// Associativity, the number of lines per set
    #[arg(short = 'E', long)]
    associativity: Option<u32>,

    /// Number of block offset bits, blocks are 2^b bytes
    #[arg(short = 'b', long)]
    block_offset_bits: Option<u32>,

    /// Trace file to replay
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Echo every record with its hits, misses, and evictions
    #[arg(short, long)]
    verbose: bool,

    /// JSON configuration file, flags take precedence over its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to persist the results
    #[arg(long, default_value = RESULTS_PATH)]
    results: PathBuf,

    /// Also print the results as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .target(Target::Stderr)
        .init();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let start = Instant::now();
    let config = resolve_config(&args)?;
    let mut simulator = Simulator::new(&config.geometry(), config.verbose)?;
    let trace = open_trace(&config.trace)?;
    let result = *simulator.simulate(trace, BufWriter::new(io::stdout().lock()))?;
    println!("{result}");
    // Only a completed run gets this far, an aborted run never persists partial results
    write_results(&args.results, &result)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result).map_err(|e| format!("Couldn't serialise the output {e}"))?);
    }
    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        #[cfg(debug_assertions)]
        eprintln!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        eprintln!("Parsed input configuration: {config:?}");
        eprintln!("Uninitialised cache lines: {}", simulator.cache().uninitialised_line_count());
        eprintln!("Skipped trace records: {}", simulator.skipped_records());
    }
    Ok(())
}

/// Combines the flags with the optional config file. Flags win, and every geometry value and the
/// trace must come from one or the other
fn resolve_config(args: &Args) -> Result<SimulationConfig, SimError> {
    let flags = PartialSimulationConfig {
        associativity: args.associativity,
        block_offset_bits: args.block_offset_bits,
        set_index_bits: args.set_index_bits,
        verbose: args.verbose.then_some(true),
        trace: args.trace.clone(),
    };
    let file = match &args.config {
        Some(path) => PartialSimulationConfig::from_json_file(path)?,
        None => PartialSimulationConfig::default(),
    };
    Ok(flags.or(file).resolve()?)
}
