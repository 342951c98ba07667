use std::fs::File;
use std::io::{sink, BufReader};
use crate::cache::CacheModel;
use crate::config::CacheGeometry;
use crate::error::SimError;
use crate::io::open_trace;
use crate::report::write_results;
use crate::simulator::{AccessOutcome, SimulationCounters, Simulator};
use crate::test::sample_trace;
use crate::util::synthetic_trace;

fn counters(hits: u64, misses: u64, evictions: u64) -> SimulationCounters {
    SimulationCounters { hits, misses, evictions }
}

fn run(geometry: CacheGeometry, trace: &[u8]) -> SimulationCounters {
    let mut simulator = Simulator::new(&geometry, false).unwrap();
    *simulator.simulate(trace, sink()).unwrap()
}

fn run_verbose(geometry: CacheGeometry, trace: &[u8]) -> String {
    let mut simulator = Simulator::new(&geometry, true).unwrap();
    let mut out = Vec::new();
    simulator.simulate(trace, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn lru_evicts_least_recently_used() {
    let mut simulator = Simulator::new(&CacheGeometry::new(2, 0, 0), false).unwrap();
    let outcomes: Vec<AccessOutcome> = [0xa, 0xb, 0xa, 0xc].iter().map(|tag| simulator.access(0, *tag)).collect();
    assert_eq!(
        outcomes,
        vec![AccessOutcome::Miss, AccessOutcome::Miss, AccessOutcome::Hit, AccessOutcome::MissEviction]
    );
    assert_eq!(*simulator.counters(), counters(1, 3, 1));
    // B was the victim, A survived
    assert!(simulator.cache().contains(0, 0xa));
    assert!(!simulator.cache().contains(0, 0xb));
    assert!(simulator.cache().contains(0, 0xc));
}

#[test]
fn no_evictions_until_set_overflows() {
    let mut simulator = Simulator::new(&CacheGeometry::new(4, 0, 0), false).unwrap();
    for tag in 0..4 {
        simulator.access(0, tag);
        assert_eq!(simulator.counters().evictions, 0);
    }
    for tag in 0..4 {
        assert_eq!(simulator.access(0, tag), AccessOutcome::Hit);
    }
    assert_eq!(simulator.access(0, 4), AccessOutcome::MissEviction);
    assert_eq!(*simulator.counters(), counters(4, 5, 1));
}

#[test]
fn direct_mapped_thrashing() {
    // With 8 byte blocks 0x10 and 0x18 share the only set but have different tags
    let trace = b" L 10,1\n L 18,1\n L 10,1\n";
    assert_eq!(run(CacheGeometry::new(1, 3, 0), trace), counters(0, 3, 2));
    // With 16 byte blocks they are the same block
    assert_eq!(run(CacheGeometry::new(1, 4, 0), trace), counters(2, 1, 0));
}

#[test]
fn modify_on_cold_set_misses_then_hits() {
    for associativity in [1, 2, 8] {
        assert_eq!(run(CacheGeometry::new(associativity, 4, 2), b" M 7ff0005c8,8\n"), counters(1, 1, 0));
    }
}

#[test]
fn instructions_never_count() {
    let trace = b"I 0400d7d4,8\nI 04f6b868,8\nI garbage\nI\n";
    assert_eq!(run(CacheGeometry::new(1, 4, 4), trace), counters(0, 0, 0));
    let mut simulator = Simulator::new(&CacheGeometry::new(1, 4, 4), false).unwrap();
    simulator.simulate(&trace[..], sink()).unwrap();
    assert_eq!(simulator.skipped_records(), 0);
    assert_eq!(simulator.cache().uninitialised_line_count(), 16);
}

#[test]
fn bad_records_are_skipped_and_counted() {
    let trace = b" L 10,1\n X 10,1\n L zz,1\n L 20\n L 10,1\n";
    let mut simulator = Simulator::new(&CacheGeometry::new(1, 4, 4), false).unwrap();
    let result = *simulator.simulate(&trace[..], sink()).unwrap();
    assert_eq!(result, counters(1, 1, 0));
    assert_eq!(simulator.skipped_records(), 3);
}

#[test]
fn loads_and_stores_are_identical() {
    let loads = b" L 10,1\n L 110,1\n L 10,1\n L 210,1\n";
    let stores = b" S 10,1\n S 110,1\n S 10,1\n S 210,1\n";
    let geometry = CacheGeometry::new(2, 4, 4);
    assert_eq!(run(geometry, loads), run(geometry, stores));
}

#[test]
fn yi_trace() {
    let trace = open_trace(&sample_trace("yi.trace")).unwrap();
    let mut simulator = Simulator::new(&CacheGeometry::new(1, 4, 4), false).unwrap();
    assert_eq!(*simulator.simulate(trace, sink()).unwrap(), counters(4, 5, 3));
}

#[test]
fn yi_trace_verbose() {
    let file = File::open(sample_trace("yi.trace")).unwrap();
    let trace = std::io::read_to_string(BufReader::new(file)).unwrap();
    let expected = "\
L 10,1 miss
M 20,1 miss hit
L 22,1 hit
S 18,1 hit
L 110,1 miss eviction
L 210,1 miss eviction
M 12,1 miss eviction hit
";
    assert_eq!(run_verbose(CacheGeometry::new(1, 4, 4), trace.as_bytes()), expected);
}

#[test]
fn verbose_echo_keeps_trailing_content() {
    let trace = b" L 10,1 first touch\n M 10,4\t\n";
    let expected = "L 10,1 first touch miss\nM 10,4 hit hit\n";
    assert_eq!(run_verbose(CacheGeometry::new(1, 4, 0), trace), expected);
}

#[test]
fn dave_trace() {
    let trace = open_trace(&sample_trace("dave.trace")).unwrap();
    let mut simulator = Simulator::new(&CacheGeometry::new(2, 3, 1), false).unwrap();
    assert_eq!(*simulator.simulate(trace, sink()).unwrap(), counters(0, 5, 1));
}

#[test]
fn quiet_runs_write_nothing() {
    let mut simulator = Simulator::new(&CacheGeometry::new(1, 4, 4), false).unwrap();
    let mut out = Vec::new();
    simulator.simulate(&b" L 10,1\n M 20,1\n"[..], &mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn replaying_a_trace_is_deterministic() {
    let trace = synthetic_trace(20_000, 42);
    for geometry in [CacheGeometry::new(1, 4, 4), CacheGeometry::new(4, 5, 2), CacheGeometry::new(16, 6, 0)] {
        let first = run(geometry, &trace);
        let second = run(geometry, &trace);
        assert_eq!(first, second);
        assert!(first.evictions <= first.misses);
        assert!(first.hits + first.misses > 0);
    }
}

#[test]
fn counters_carry_over_between_calls() {
    let mut simulator = Simulator::new(&CacheGeometry::new(1, 4, 4), false).unwrap();
    simulator.simulate(&b" L 10,1\n"[..], sink()).unwrap();
    let result = *simulator.simulate(&b" L 10,1\n"[..], sink()).unwrap();
    assert_eq!(result, counters(1, 1, 0));
}

#[test]
fn missing_trace_is_fatal() {
    let error = open_trace(&sample_trace("does-not-exist.trace")).err().unwrap();
    assert!(matches!(error, SimError::TraceOpen { .. }));
}

#[test]
fn results_file_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".csim_results");
    write_results(&path, &counters(4, 5, 3)).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "4 5 3\n");
    assert_eq!(counters(4, 5, 3).to_string(), "hits:4 misses:5 evictions:3");
}

#[test]
fn counters_serialise_as_json() {
    let json = serde_json::to_string(&counters(9, 8, 6)).unwrap();
    assert_eq!(json, r#"{"hits":9,"misses":8,"evictions":6}"#);
}
