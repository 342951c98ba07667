//! # CsimLib
//!
//! Csimlib is a library for trace driven simulation of a set-associative data cache
//!
//! It models cache geometry and LRU replacement only, no data is stored. A trace of loads, stores,
//! and modifies is replayed against the cache to count hits, misses, and evictions
//!
//! The pieces can be used separately: [`address::AddressDecoder`] splits addresses,
//! [`cache::Cache`] keeps line state, and [`simulator::Simulator`] ties them to a trace

/// Contains bit field extraction and the decoder splitting addresses into tags and set indices
pub mod address;

/// Contains the LRU cache implementation, and the trait cache models implement
pub mod cache;

/// Contains the cache geometry and run configuration, which can be read from JSON
pub mod config;

/// Contains the error types for configuration, trace records, and simulation runs
pub mod error;

/// Contains helpers to open trace files efficiently
pub mod io;

/// Contains the summary and result file output
pub mod report;

/// Contains the simulator used to replay a trace against a cache
pub mod simulator;

/// Contains the trace record types and parser
pub mod trace;

// Generated from the build.rs, private
mod hex {
    include!(concat!(env!("OUT_DIR"), "/hex.rs"));
}
#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
