use std::fmt::{Display, Formatter};
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use crate::address::AddressDecoder;
use crate::cache::{Cache, CacheModel};
use crate::config::CacheGeometry;
use crate::error::{ConfigError, SimError};
use crate::trace::{parse_record_with_trailer, AccessKind, MemoryAccess};

/// Drives a cache model with a trace and collects the results
///
/// It supports calling simulate multiple times, the cache state, the counters, and the time taken
/// all carry over between calls. Use a fresh simulator for an independent run
pub struct Simulator<C: CacheModel = Cache> {
    cache: C,
    decoder: AddressDecoder,
    counters: SimulationCounters,
    verbose: bool,
    skipped_records: u64,
    simulation_time: Duration,
}

/// The result of a simulation. Can be serialised as JSON
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct SimulationCounters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// What happened on a single cache access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    Hit,
    /// Miss into a free line
    Miss,
    /// Miss which evicted the least recently used line
    MissEviction,
}

/// The verbose mode tokens, `hit`, `miss`, or `miss eviction`
impl Display for AccessOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessOutcome::Hit => f.write_str("hit"),
            AccessOutcome::Miss => f.write_str("miss"),
            AccessOutcome::MissEviction => f.write_str("miss eviction"),
        }
    }
}

impl Simulator<Cache> {
    /// Creates a new simulator with a cold LRU cache
    ///
    /// # Arguments
    ///
    /// * `geometry`: The cache geometry, validated before anything is allocated
    /// * `verbose`: Whether [`Simulator::simulate`] echoes every record with its outcomes
    ///
    /// returns: Result<Simulator, ConfigError>
    pub fn new(geometry: &CacheGeometry, verbose: bool) -> Result<Self, ConfigError> {
        let decoder = AddressDecoder::new(geometry)?;
        let cache = Cache::new(geometry)?;
        debug!(
            "Simulating {} sets of {} lines, {} block offset bits",
            cache.num_sets(),
            cache.associativity(),
            geometry.block_offset_bits
        );
        Ok(Self::with_cache(cache, decoder, verbose))
    }
}

impl<C: CacheModel> Simulator<C> {
    /// Creates a simulator around an existing cache model
    pub fn with_cache(cache: C, decoder: AddressDecoder, verbose: bool) -> Self {
        Self {
            cache,
            decoder,
            counters: SimulationCounters::default(),
            verbose,
            skipped_records: 0,
            simulation_time: Duration::ZERO,
        }
    }

    /// Performs one cache access on an already decoded set and tag, updating the counters
    ///
    /// The eviction check happens before the insertion, a miss only evicts if the set was full
    pub fn access(&mut self, set: usize, tag: u64) -> AccessOutcome {
        if self.cache.contains(set, tag) {
            self.counters.hits += 1;
            let promoted = self.cache.record_hit(set, tag);
            debug_assert!(promoted);
            return AccessOutcome::Hit;
        }
        self.counters.misses += 1;
        let outcome = if self.cache.is_full(set) {
            self.counters.evictions += 1;
            AccessOutcome::MissEviction
        } else {
            AccessOutcome::Miss
        };
        self.cache.record_miss_insert(set, tag);
        outcome
    }

    /// Simulates a single record. Instruction fetches are ignored
    ///
    /// A modify makes two accesses, strictly one after the other, as the second observes the
    /// line brought in by the first
    ///
    /// # Arguments
    ///
    /// * `access`: The record
    /// * `out`: Where the verbose transcript goes. Untouched unless verbose
    ///
    /// returns: Result<(), SimError>, only fails if writing to `out` fails
    pub fn process<W: Write>(&mut self, access: &MemoryAccess, out: &mut W) -> Result<(), SimError> {
        self.process_echoing(access, &[], out)
    }

    /// [`Simulator::process`], with `trailer` echoed between the record and its outcomes
    fn process_echoing<W: Write>(&mut self, access: &MemoryAccess, trailer: &[u8], out: &mut W) -> Result<(), SimError> {
        if access.kind == AccessKind::Instruction {
            return Ok(());
        }
        let tag = self.decoder.tag_of(access.address);
        let set = self.decoder.set_of(access.address);
        if self.verbose {
            write!(out, "{access}").map_err(SimError::Output)?;
            out.write_all(trailer).map_err(SimError::Output)?;
        }
        for _ in 0..access.kind.sub_accesses() {
            let outcome = self.access(set, tag);
            if self.verbose {
                write!(out, " {outcome}").map_err(SimError::Output)?;
            }
        }
        if self.verbose {
            writeln!(out).map_err(SimError::Output)?;
        }
        Ok(())
    }

    /// Simulates a whole trace, one record per line
    ///
    /// Records are handled strictly in order. Malformed records and unknown operations are
    /// reported with a warning and skipped, they don't stop the run. Failing to read the trace does
    ///
    /// # Arguments
    ///
    /// * `reader`: The trace source
    /// * `out`: The verbose transcript sink, pass [`std::io::sink`] if not verbose
    ///
    /// returns: Result<&SimulationCounters, SimError>
    pub fn simulate<R: BufRead, W: Write>(&mut self, reader: R, mut out: W) -> Result<&SimulationCounters, SimError> {
        let start = Instant::now();
        for (index, line) in reader.split(b'\n').enumerate() {
            let line = line.map_err(SimError::TraceRead)?;
            match parse_record_with_trailer(&line) {
                Ok(Some((access, trailer))) => self.process_echoing(&access, trailer, &mut out)?,
                Ok(None) => {}
                Err(e) => {
                    self.skipped_records += 1;
                    warn!("Skipping trace line {}: {e}", index + 1);
                }
            }
        }
        out.flush().map_err(SimError::Output)?;
        self.simulation_time += start.elapsed();
        Ok(&self.counters)
    }

    pub fn counters(&self) -> &SimulationCounters {
        &self.counters
    }

    /// Number of records skipped as malformed or with an unknown operation
    pub fn skipped_records(&self) -> u64 {
        self.skipped_records
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Gets the wall-clock time spent in [`Simulator::simulate`]
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }
}
