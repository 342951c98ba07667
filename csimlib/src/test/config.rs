use std::io::Write;
use std::path::PathBuf;
use crate::config::{CacheGeometry, PartialSimulationConfig, SimulationConfig};
use crate::error::{ConfigError, SimError};

#[test]
fn geometry_limits() {
    assert_eq!(CacheGeometry::new(1, 0, 0).validate(), Ok(()));
    assert_eq!(CacheGeometry::new(1, 64, 0).validate(), Ok(()));
    assert_eq!(CacheGeometry::new(2, 60, 4).validate(), Ok(()));
    assert_eq!(CacheGeometry::new(0, 4, 4).validate(), Err(ConfigError::NonPositiveAssociativity));
    assert_eq!(
        CacheGeometry::new(1, 60, 5).validate(),
        Err(ConfigError::AddressBitsOverflow { block_offset_bits: 60, set_index_bits: 5 })
    );
    assert!(matches!(
        CacheGeometry::new(1, u32::MAX, 1).validate(),
        Err(ConfigError::AddressBitsOverflow { .. })
    ));
}

#[test]
fn geometry_counts() {
    let geometry = CacheGeometry::new(4, 6, 3);
    assert_eq!(geometry.num_sets(), Ok(8));
    assert_eq!(geometry.line_count(), Ok(32));
}

#[test]
fn config_deserialises_with_long_names() {
    let config: SimulationConfig = serde_json::from_str(
        r#"{"associativity": 2, "block_offset_bits": 4, "set_index_bits": 1, "verbose": true, "trace": "traces/yi.trace"}"#,
    )
    .unwrap();
    assert_eq!(config.geometry(), CacheGeometry::new(2, 4, 1));
    assert!(config.verbose);
    assert_eq!(config.trace, PathBuf::from("traces/yi.trace"));
}

#[test]
fn config_deserialises_with_flag_letters() {
    let config: SimulationConfig = serde_json::from_str(r#"{"E": 1, "b": 4, "s": 4, "t": "yi.trace"}"#).unwrap();
    assert_eq!(config.geometry(), CacheGeometry::new(1, 4, 4));
    assert!(!config.verbose);
    assert_eq!(config.trace, PathBuf::from("yi.trace"));
}

#[test]
fn config_requires_geometry() {
    assert!(serde_json::from_str::<SimulationConfig>(r#"{"E": 1, "b": 4, "t": "yi.trace"}"#).is_err());
    assert!(serde_json::from_str::<SimulationConfig>(r#"{"E": -1, "b": 4, "s": 4, "t": "yi.trace"}"#).is_err());
}

#[test]
fn config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"E": 2, "b": 3, "s": 1, "v": true, "t": "dave.trace"}}"#).unwrap();
    let config = SimulationConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.geometry(), CacheGeometry::new(2, 3, 1));
    assert!(config.verbose);
    assert!(SimulationConfig::from_json_file(&PathBuf::from("/nonexistent/config.json")).is_err());
}

#[test]
fn partial_config_accepts_missing_fields() {
    let partial: PartialSimulationConfig = serde_json::from_str(r#"{"E": 1, "b": 4, "s": 4}"#).unwrap();
    assert_eq!(partial.associativity, Some(1));
    assert_eq!(partial.trace, None);
    assert_eq!(partial.clone().resolve(), Err(ConfigError::MissingSetting("trace file (-t)")));
    let flags = PartialSimulationConfig { trace: Some(PathBuf::from("yi.trace")), ..Default::default() };
    let config = flags.or(partial).resolve().unwrap();
    assert_eq!(config.geometry(), CacheGeometry::new(1, 4, 4));
    assert_eq!(config.trace, PathBuf::from("yi.trace"));
    assert!(!config.verbose);
}

#[test]
fn partial_config_present_values_win() {
    let flags = PartialSimulationConfig { associativity: Some(2), ..Default::default() };
    let file: PartialSimulationConfig =
        serde_json::from_str(r#"{"associativity": 8, "block_offset_bits": 3, "s": 1, "v": true, "t": "dave.trace"}"#).unwrap();
    let config = flags.or(file).resolve().unwrap();
    assert_eq!(config.geometry(), CacheGeometry::new(2, 3, 1));
    assert!(config.verbose);
}

#[test]
fn config_file_errors_keep_their_source() {
    let missing = PartialSimulationConfig::from_json_file(&PathBuf::from("/nonexistent/config.json"));
    assert!(matches!(missing, Err(SimError::ConfigOpen { .. })));
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();
    let broken = PartialSimulationConfig::from_json_file(file.path());
    assert!(matches!(broken, Err(SimError::ConfigParse { .. })));
}
