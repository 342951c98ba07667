use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use crate::error::SimError;
use crate::simulator::SimulationCounters;

/// Where the results are persisted for automatic checking, relative to the working directory
pub const RESULTS_PATH: &str = ".csim_results";

/// The summary line, `hits:4 misses:5 evictions:3`
impl Display for SimulationCounters {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "hits:{} misses:{} evictions:{}", self.hits, self.misses, self.evictions)
    }
}

/// Writes the counters as `<hits> <misses> <evictions>` followed by a newline, replacing any
/// previous results
pub fn write_results(path: &Path, counters: &SimulationCounters) -> Result<(), SimError> {
    let contents = format!("{} {} {}\n", counters.hits, counters.misses, counters.evictions);
    fs::write(path, contents).map_err(|source| SimError::ResultWrite {
        path: path.to_path_buf(),
        source,
    })
}
