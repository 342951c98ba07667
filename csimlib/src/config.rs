use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use crate::cache::CacheLine;
use crate::error::{ConfigError, SimError};

/// Width of the simulated addresses
pub const ADDRESS_BITS: u32 = u64::BITS;

/// The shape of the cache: lines per set, and how an address splits into tag, set, and block offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    pub associativity: u32,
    pub block_offset_bits: u32,
    pub set_index_bits: u32,
}

impl CacheGeometry {
    pub fn new(associativity: u32, block_offset_bits: u32, set_index_bits: u32) -> Self {
        Self {
            associativity,
            block_offset_bits,
            set_index_bits,
        }
    }

    /// Checks the geometry describes a cache which can be built
    ///
    /// Associativity must be positive, the set and block offset fields must fit in an address, and
    /// `2^set_index_bits * associativity` lines must fit in memory
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.associativity == 0 {
            return Err(ConfigError::NonPositiveAssociativity);
        }
        let address_bits = self.block_offset_bits.checked_add(self.set_index_bits);
        if address_bits.map_or(true, |bits| bits > ADDRESS_BITS) {
            return Err(ConfigError::AddressBitsOverflow {
                block_offset_bits: self.block_offset_bits,
                set_index_bits: self.set_index_bits,
            });
        }
        self.line_count().map(|_| ())
    }

    /// Number of sets, `2^set_index_bits`
    pub fn num_sets(&self) -> Result<usize, ConfigError> {
        1usize.checked_shl(self.set_index_bits).ok_or_else(|| self.capacity_overflow())
    }

    /// Total number of lines across all sets
    pub fn line_count(&self) -> Result<usize, ConfigError> {
        let lines = self
            .num_sets()?
            .checked_mul(self.associativity as usize)
            .ok_or_else(|| self.capacity_overflow())?;
        // Vec can't hold more than isize::MAX bytes
        match lines.checked_mul(std::mem::size_of::<CacheLine>()) {
            Some(bytes) if bytes <= isize::MAX as usize => Ok(lines),
            _ => Err(self.capacity_overflow()),
        }
    }

    fn capacity_overflow(&self) -> ConfigError {
        ConfigError::CapacityOverflow {
            set_index_bits: self.set_index_bits,
            associativity: self.associativity,
        }
    }
}

/// Everything needed for a simulation run. Usually built from command line flags, but can also be
/// read from JSON, using either the long field names or the flag letters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(alias = "E")]
    pub associativity: u32,
    #[serde(alias = "b")]
    pub block_offset_bits: u32,
    #[serde(alias = "s")]
    pub set_index_bits: u32,
    #[serde(default, alias = "v")]
    pub verbose: bool,
    #[serde(alias = "t")]
    pub trace: PathBuf,
}

impl SimulationConfig {
    pub fn geometry(&self) -> CacheGeometry {
        CacheGeometry::new(self.associativity, self.block_offset_bits, self.set_index_bits)
    }

    /// Reads a complete configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, SimError> {
        read_json(path)
    }
}

/// A configuration with gaps, such as a config file which leaves some values to the command line
///
/// Accepts the same names and aliases as [`SimulationConfig`], every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PartialSimulationConfig {
    #[serde(alias = "E")]
    pub associativity: Option<u32>,
    #[serde(alias = "b")]
    pub block_offset_bits: Option<u32>,
    #[serde(alias = "s")]
    pub set_index_bits: Option<u32>,
    #[serde(alias = "v")]
    pub verbose: Option<bool>,
    #[serde(alias = "t")]
    pub trace: Option<PathBuf>,
}

impl PartialSimulationConfig {
    /// Reads a possibly incomplete configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, SimError> {
        read_json(path)
    }

    /// Fills the gaps in `self` with the values of `fallback`, values already present win
    pub fn or(self, fallback: Self) -> Self {
        Self {
            associativity: self.associativity.or(fallback.associativity),
            block_offset_bits: self.block_offset_bits.or(fallback.block_offset_bits),
            set_index_bits: self.set_index_bits.or(fallback.set_index_bits),
            verbose: self.verbose.or(fallback.verbose),
            trace: self.trace.or(fallback.trace),
        }
    }

    /// Builds the full configuration, every geometry value and the trace must be present. Verbose
    /// defaults to off
    pub fn resolve(self) -> Result<SimulationConfig, ConfigError> {
        Ok(SimulationConfig {
            associativity: self.associativity.ok_or(ConfigError::MissingSetting("associativity (-E)"))?,
            block_offset_bits: self
                .block_offset_bits
                .ok_or(ConfigError::MissingSetting("block offset bits (-b)"))?,
            set_index_bits: self.set_index_bits.ok_or(ConfigError::MissingSetting("set index bits (-s)"))?,
            verbose: self.verbose.unwrap_or(false),
            trace: self.trace.ok_or(ConfigError::MissingSetting("trace file (-t)"))?,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SimError> {
    let file = File::open(path).map_err(|source| SimError::ConfigOpen {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| SimError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}
