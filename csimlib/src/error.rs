use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Rejected or incomplete configuration. Raised before any cache storage is allocated
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("associativity must be at least 1")]
    NonPositiveAssociativity,
    #[error("block offset bits ({block_offset_bits}) plus set index bits ({set_index_bits}) exceed the 64 bit address width")]
    AddressBitsOverflow {
        block_offset_bits: u32,
        set_index_bits: u32,
    },
    #[error("a cache of 2^{set_index_bits} sets with {associativity} lines each is too large to allocate")]
    CapacityOverflow {
        set_index_bits: u32,
        associativity: u32,
    },
    #[error("missing {0}, pass it as a flag or in the config file")]
    MissingSetting(&'static str),
}

/// A bit range outside `0 <= low <= high <= 63`
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("illegal bit range [{low}, {high}], expected 0 <= low <= high <= 63")]
pub struct IllegalRange {
    pub low: u32,
    pub high: u32,
}

/// Problems with a single trace record. These never abort a run, the record is skipped
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraceLineError {
    #[error("malformed trace line: {0}")]
    Malformed(&'static str),
    #[error("invalid memory access attempted, unknown operation '{0}'")]
    UnknownOperation(char),
}

/// Fatal errors, anything that stops a simulation run
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("couldn't open the config file at path {}: {source}", path.display())]
    ConfigOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("couldn't parse the config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to open trace file {}: {source}", path.display())]
    TraceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("couldn't read the trace: {0}")]
    TraceRead(#[source] io::Error),
    #[error("couldn't write verbose output: {0}")]
    Output(#[source] io::Error),
    #[error("couldn't write results to {}: {source}", path.display())]
    ResultWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
