use log::trace;
use crate::config::CacheGeometry;
use crate::error::ConfigError;

/// A generic trait for set-associative cache models
///
/// The trait only deals in already decoded set indices and tags, splitting addresses is the
/// responsibility of the caller (see [`crate::address::AddressDecoder`]). Hit and miss
/// accounting is also left to the caller, the model only keeps line state and recency order
pub trait CacheModel {
    /// True if some valid line in `set` holds `tag`
    fn contains(&self, set: usize, tag: u64) -> bool;

    /// True if the set has no free line, so inserting a new tag would evict
    fn is_full(&self, set: usize) -> bool;

    /// Promotes the line holding `tag` to most recently used
    ///
    /// # Arguments
    ///
    /// * `set`: The set index
    /// * `tag`: The tag which was hit
    ///
    /// returns: bool, false if no valid line holds the tag, in which case nothing changes
    fn record_hit(&mut self, set: usize, tag: u64) -> bool;

    /// Inserts `tag` as the most recently used line, discarding the least recently used line
    ///
    /// Callers wanting to count evictions must check [`CacheModel::is_full`] first
    ///
    /// returns: Option<u64>, the tag of the evicted line if a valid line was discarded
    fn record_miss_insert(&mut self, set: usize, tag: u64) -> Option<u64>;

    /// Gets the number of lines never written. Useful for analysing cache performance or debugging
    fn uninitialised_line_count(&self) -> usize;
}

/// A single line. Only the tag is tracked, no data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheLine {
    pub tag: u64,
    pub valid: bool,
}

/// An LRU set-associative cache
///
/// All lines live in one flat buffer, set `n` occupies `lines[n * associativity..(n + 1) * associativity]`.
/// Within a set, slot 0 is the most recently used line and the last slot the least recently used.
/// Slot order is the only record of recency, there are no timestamps
///
/// Lines are always inserted at slot 0 with everything else shifted back, so valid lines form a
/// prefix of each set. This is what lets [`CacheModel::is_full`] look at the last slot alone
#[derive(Debug, Clone)]
pub struct Cache {
    lines: Vec<CacheLine>,
    associativity: usize,
    num_sets: usize,
}

impl Cache {
    /// Creates a cold cache, every line invalid
    ///
    /// A geometry which is valid on paper can still ask for more memory than the system has, that
    /// is reported as [`ConfigError::CapacityOverflow`] rather than aborting
    pub fn new(geometry: &CacheGeometry) -> Result<Self, ConfigError> {
        geometry.validate()?;
        let num_sets = geometry.num_sets()?;
        let line_count = geometry.line_count()?;
        let mut lines = Vec::new();
        lines
            .try_reserve_exact(line_count)
            .map_err(|_| ConfigError::CapacityOverflow {
                set_index_bits: geometry.set_index_bits,
                associativity: geometry.associativity,
            })?;
        lines.resize(line_count, CacheLine::default());
        Ok(Self {
            lines,
            associativity: geometry.associativity as usize,
            num_sets,
        })
    }

    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    pub fn associativity(&self) -> usize {
        self.associativity
    }

    /// The lines of a set, most recently used first
    ///
    /// Panics if `set` is out of range
    pub fn set(&self, set: usize) -> &[CacheLine] {
        let lower = set * self.associativity;
        &self.lines[lower..lower + self.associativity]
    }

    fn set_mut(&mut self, set: usize) -> &mut [CacheLine] {
        let lower = set * self.associativity;
        &mut self.lines[lower..lower + self.associativity]
    }
}

impl CacheModel for Cache {
    fn contains(&self, set: usize, tag: u64) -> bool {
        self.set(set).iter().any(|line| line.valid && line.tag == tag)
    }

    fn is_full(&self, set: usize) -> bool {
        self.set(set)[self.associativity - 1].valid
    }

    fn record_hit(&mut self, set: usize, tag: u64) -> bool {
        let lines = self.set_mut(set);
        match lines.iter().position(|line| line.valid && line.tag == tag) {
            Some(index) => {
                // Lines in front of the hit move back one slot, lines behind it stay put
                lines[..=index].rotate_right(1);
                true
            }
            None => false,
        }
    }

    fn record_miss_insert(&mut self, set: usize, tag: u64) -> Option<u64> {
        let lines = self.set_mut(set);
        lines.rotate_right(1);
        let discarded = std::mem::replace(&mut lines[0], CacheLine { tag, valid: true });
        if discarded.valid {
            trace!("Set {set}: evicted tag {:#x} for tag {tag:#x}", discarded.tag);
            Some(discarded.tag)
        } else {
            None
        }
    }

    fn uninitialised_line_count(&self) -> usize {
        self.lines.iter().filter(|line| !line.valid).count()
    }
}
