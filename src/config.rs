//! Scenario and tuning configuration.
//!
//! A scenario is the five integers `N M w x y` (population, group size,
//! print/bind/entry-book durations), given on the command line or in a
//! whitespace-separated file. Tuning covers everything the scenario does
//! not: staff count, binding stations, delay distribution, pacing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Population cap, inherited from the reference scenario format.
pub const MAX_STUDENTS: u32 = 100;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("student count must be greater than zero")]
    ZeroStudents,

    #[error("group size must be greater than zero")]
    ZeroGroupSize,

    #[error("at most {MAX_STUDENTS} students are supported, got {0}")]
    TooManyStudents(u32),

    #[error("student count {students} is not divisible by group size {group_size}")]
    UnevenGroups { students: u32, group_size: u32 },

    #[error("scenario needs five integers (N M w x y), got {found}")]
    WrongFieldCount { found: usize },

    #[error("invalid {field} value {value:?}")]
    InvalidField { field: &'static str, value: String },

    #[error("no scenario given: pass `N M w x y` or --input FILE")]
    MissingScenario,

    #[error("binding station count must be greater than zero")]
    ZeroBindStations,

    #[error("delay mean must be a finite non-negative number, got {0}")]
    InvalidMean(f64),

    #[error("failed to read {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: Box<toml::de::Error>,
    },
}

/// The five scenario parameters.
///
/// Durations are unsigned logical time units; a negative value on input
/// fails at the parse boundary before any actor starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Population size N.
    pub students: u32,
    /// Group size M; N must be divisible by M.
    pub group_size: u32,
    /// Printing duration w.
    pub print_units: u64,
    /// Binding duration x.
    pub bind_units: u64,
    /// Entry-book read/write duration y.
    pub entry_units: u64,
}

impl Scenario {
    pub fn new(
        students: u32,
        group_size: u32,
        print_units: u64,
        bind_units: u64,
        entry_units: u64,
    ) -> Result<Self, ConfigError> {
        let scenario = Scenario {
            students,
            group_size,
            print_units,
            bind_units,
            entry_units,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Validation order mirrors the reference loader: zero checks, then the
    /// population cap, then divisibility.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.students == 0 {
            return Err(ConfigError::ZeroStudents);
        }
        if self.group_size == 0 {
            return Err(ConfigError::ZeroGroupSize);
        }
        if self.students > MAX_STUDENTS {
            return Err(ConfigError::TooManyStudents(self.students));
        }
        if self.students % self.group_size != 0 {
            return Err(ConfigError::UnevenGroups {
                students: self.students,
                group_size: self.group_size,
            });
        }
        Ok(())
    }

    /// Parse the whitespace-separated `N M w x y` form.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(ConfigError::WrongFieldCount {
                found: fields.len(),
            });
        }
        Self::new(
            parse_field("student count", fields[0])?,
            parse_field("group size", fields[1])?,
            parse_field("print duration", fields[2])?,
            parse_field("bind duration", fields[3])?,
            parse_field("entry duration", fields[4])?,
        )
    }

    /// Load a scenario file in the `N M w x y` format.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Build from the positional CLI parameters, in `N M w x y` order.
    pub fn from_params(params: &[u64]) -> Result<Self, ConfigError> {
        if params.len() != 5 {
            return Err(ConfigError::WrongFieldCount {
                found: params.len(),
            });
        }
        let students = u32::try_from(params[0]).map_err(|_| ConfigError::InvalidField {
            field: "student count",
            value: params[0].to_string(),
        })?;
        let group_size = u32::try_from(params[1]).map_err(|_| ConfigError::InvalidField {
            field: "group size",
            value: params[1].to_string(),
        })?;
        Self::new(students, group_size, params[2], params[3], params[4])
    }

    /// Number of groups (and leaders).
    pub fn groups(&self) -> u32 {
        self.students / self.group_size
    }
}

fn parse_field<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidField {
        field,
        value: raw.to_string(),
    })
}

/// Everything configurable that is not part of the scenario itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Number of staff reader actors.
    pub staff: u32,
    /// Binding-station pool capacity.
    pub bind_stations: usize,
    /// Mean of the Poisson delay distribution.
    pub delay_mean: f64,
    /// Fixed RNG seed; omit for entropy.
    pub seed: Option<u64>,
    /// Real milliseconds per logical time unit. Zero disables pacing.
    pub time_unit_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            staff: 2,
            bind_stations: 2,
            delay_mean: 3.0,
            seed: None,
            time_unit_ms: 100,
        }
    }
}

impl Tuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_stations == 0 {
            return Err(ConfigError::ZeroBindStations);
        }
        if !self.delay_mean.is_finite() || self.delay_mean < 0.0 {
            return Err(ConfigError::InvalidMean(self.delay_mean));
        }
        Ok(())
    }
}

/// Load a TOML tuning file. Missing keys take their defaults.
pub fn load_tuning(path: &Path) -> Result<Tuning, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
        path: path.to_owned(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::ParseFailed {
        path: path.to_owned(),
        source: Box::new(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_parse_accepts_reference_format() {
        let s = Scenario::parse("4 2 2 1 1").expect("valid scenario");
        assert_eq!(s.students, 4);
        assert_eq!(s.group_size, 2);
        assert_eq!(s.print_units, 2);
        assert_eq!(s.bind_units, 1);
        assert_eq!(s.entry_units, 1);
        assert_eq!(s.groups(), 2);
    }

    #[test]
    fn scenario_parse_rejects_wrong_field_count() {
        let err = Scenario::parse("4 2 2").unwrap_err();
        assert!(matches!(err, ConfigError::WrongFieldCount { found: 3 }));
    }

    #[test]
    fn scenario_parse_rejects_negative_duration() {
        let err = Scenario::parse("4 2 -2 1 1").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                field: "print duration",
                ..
            }
        ));
    }

    #[test]
    fn scenario_rejects_zero_population() {
        assert!(matches!(
            Scenario::new(0, 2, 1, 1, 1),
            Err(ConfigError::ZeroStudents)
        ));
    }

    #[test]
    fn scenario_rejects_uneven_groups() {
        assert!(matches!(
            Scenario::new(5, 2, 1, 1, 1),
            Err(ConfigError::UnevenGroups {
                students: 5,
                group_size: 2
            })
        ));
    }

    #[test]
    fn scenario_rejects_population_over_cap() {
        assert!(matches!(
            Scenario::new(104, 2, 1, 1, 1),
            Err(ConfigError::TooManyStudents(104))
        ));
    }

    #[test]
    fn tuning_defaults_from_empty_table() {
        let tuning: Tuning = toml::from_str("").expect("empty tuning parses");
        assert_eq!(tuning.staff, 2);
        assert_eq!(tuning.bind_stations, 2);
        assert_eq!(tuning.delay_mean, 3.0);
        assert_eq!(tuning.seed, None);
        assert_eq!(tuning.time_unit_ms, 100);
    }

    #[test]
    fn tuning_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tuning.toml");
        let tuning = Tuning {
            staff: 3,
            bind_stations: 1,
            delay_mean: 1.5,
            seed: Some(42),
            time_unit_ms: 0,
        };
        let rendered = toml::to_string_pretty(&tuning).expect("render tuning");
        std::fs::write(&path, rendered).expect("write tuning");

        let loaded = load_tuning(&path).expect("load tuning");
        assert_eq!(loaded.staff, 3);
        assert_eq!(loaded.bind_stations, 1);
        assert_eq!(loaded.delay_mean, 1.5);
        assert_eq!(loaded.seed, Some(42));
        assert_eq!(loaded.time_unit_ms, 0);
    }

    #[test]
    fn tuning_rejects_zero_bind_stations() {
        let tuning = Tuning {
            bind_stations: 0,
            ..Tuning::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::ZeroBindStations)
        ));
    }
}
