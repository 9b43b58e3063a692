use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::{AttributeSet, CflPolicy, FluxScheme, RefinementLevel, MAX_LEVEL, MIN_LEVEL};

/// Immutable study configuration, handed to every component at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub store_root: PathBuf,
    pub report_dir: PathBuf,
    pub advection_speed: f64,
    pub output_time: f64,
    pub cfl_policy: CflPolicy,
    /// Empirical bound on floating-point drift of a conservative scheme.
    pub conservation_tolerance: f64,
    /// Levels the solver sweep computes. Analysis always covers [6, 16].
    pub solve_min_level: u32,
    pub solve_max_level: u32,
}

impl Default for StudyConfig {
    fn default() -> Self {
        StudyConfig {
            store_root: PathBuf::from("output_database/computations_output"),
            report_dir: PathBuf::from("reports"),
            advection_speed: 3.0,
            output_time: 9.0,
            cfl_policy: CflPolicy::default(),
            conservation_tolerance: 0.1,
            solve_min_level: MIN_LEVEL,
            solve_max_level: MAX_LEVEL,
        }
    }
}

impl StudyConfig {
    /// Default configuration rooted at `store_root`.
    pub fn with_store_root(store_root: impl Into<PathBuf>) -> Self {
        StudyConfig {
            store_root: store_root.into(),
            ..StudyConfig::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: StudyConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        RefinementLevel::new(self.solve_min_level)?;
        RefinementLevel::new(self.solve_max_level)?;
        if self.solve_min_level > self.solve_max_level {
            return Err(Error::DomainError(format!(
                "solver level range {}..={} is empty",
                self.solve_min_level, self.solve_max_level
            )));
        }
        if !(self.advection_speed > 0.0) {
            return Err(Error::DomainError(format!(
                "advection speed must be positive, got {}",
                self.advection_speed
            )));
        }
        Ok(())
    }

    /// Attribute set written into the group of `scheme` at store creation.
    pub fn attributes(&self, scheme: FluxScheme) -> AttributeSet {
        AttributeSet {
            a: self.advection_speed,
            t: self.output_time,
            cfl: self.cfl_policy.cfl(scheme),
        }
    }

    pub fn solve_levels(&self) -> impl Iterator<Item = RefinementLevel> + '_ {
        RefinementLevel::all()
            .filter(move |k| (self.solve_min_level..=self.solve_max_level).contains(&k.k()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_study() {
        let config = StudyConfig::default();
        let attrs = config.attributes(FluxScheme::LaxWendroff);
        assert_eq!(attrs.a, 3.0);
        assert_eq!(attrs.t, 9.0);
        assert_eq!(attrs.cfl, 0.9);
        assert_eq!(config.solve_levels().count(), 11);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("study.json");
        fs::write(&path, r#"{ "solve_max_level": 9, "report_dir": "out" }"#).unwrap();

        let config = StudyConfig::from_json_file(&path).unwrap();
        assert_eq!(config.report_dir, PathBuf::from("out"));
        assert_eq!(config.advection_speed, 3.0);
        let levels: Vec<u32> = config.solve_levels().map(|k| k.k()).collect();
        assert_eq!(levels, vec![6, 7, 8, 9]);
    }

    #[test]
    fn rejects_out_of_range_solver_levels() {
        let config = StudyConfig {
            solve_max_level: 20,
            ..StudyConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidLevel(20))));

        let config = StudyConfig {
            solve_min_level: 12,
            solve_max_level: 8,
            ..StudyConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::DomainError(_))));
    }
}
