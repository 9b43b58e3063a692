//! Persisted hierarchical store of initial data, computation groups and solutions.
//!
//! Layout under the store root (see [`StoreKey::relative_path`]):
//!
//! ```text
//! Square_Wave/k = 6 initial_data.csv
//! Square_Wave/Upwind/attributes.json
//! Square_Wave/Upwind/k = 6.csv
//! ```
//!
//! Datasets are single-column CSV files without a header. The schema (initial data,
//! groups and attributes) is written exactly once; solutions are added with
//! create-new semantics and never overwritten.

extern crate nalgebra as na;

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::config::StudyConfig;
use crate::error::{Error, Result};
use crate::fv_core::initial::initial_data;
use crate::schema::{AttributeSet, FluxScheme, InitialCondition, RefinementLevel, StoreKey};

const ATTRIBUTES_FILE: &str = "attributes.json";

/// Outcome of [`create_store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Created,
    /// The store was left untouched.
    AlreadyExists,
}

/// Create the store with its full schema unless it already exists.
///
/// The schema is assembled in a staging directory next to the store root and
/// published with a single rename, so either the complete store appears or
/// nothing does.
pub fn create_store(config: &StudyConfig) -> Result<StoreStatus> {
    let root = &config.store_root;
    if root.exists() {
        info!(path = %root.display(), "store already exists and is ready to record solutions");
        return Ok(StoreStatus::AlreadyExists);
    }

    let create_failure = |e: io::Error| Error::CreateFailure {
        path: root.display().to_string(),
        reason: e.to_string(),
    };

    // Unique per call; leftovers of a killed run are left untouched.
    let staging = staging_dir(root).map_err(create_failure)?;
    build_schema(staging.path(), config).map_err(create_failure)?;
    if root.exists() {
        return Err(create_failure(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "store root appeared during creation",
        )));
    }

    let staged = staging.keep();
    if let Err(e) = fs::rename(&staged, root) {
        if let Err(cleanup) = fs::remove_dir_all(&staged) {
            warn!(path = %staged.display(), error = %cleanup, "failed to remove staging directory");
        }
        return Err(create_failure(e));
    }

    info!(path = %root.display(), "store created and ready to record solutions");
    Ok(StoreStatus::Created)
}

/// Fresh staging directory next to `root`, removed on drop unless kept.
fn staging_dir(root: &Path) -> io::Result<TempDir> {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store".to_string());
    let parent = match root.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    tempfile::Builder::new()
        .prefix(&format!(".{name}.partial-"))
        .tempdir_in(parent)
}

fn build_schema(staging: &Path, config: &StudyConfig) -> io::Result<()> {
    for condition in InitialCondition::ALL {
        fs::create_dir(staging.join(condition.name()))?;

        for level in RefinementLevel::all() {
            let key = StoreKey::InitialData(condition, level);
            let path = staging.join(key.relative_path());
            write_dataset(&path, &initial_data(condition, level)).map_err(into_io)?;
        }

        for scheme in FluxScheme::ALL {
            let group = staging.join(StoreKey::Group(condition, scheme).relative_path());
            fs::create_dir(&group)?;
            let mut attributes = BufWriter::new(create_new(&group.join(ATTRIBUTES_FILE))?);
            serde_json::to_writer_pretty(&mut attributes, &config.attributes(scheme))?;
            attributes.flush()?;
        }
    }
    Ok(())
}

fn into_io(e: Error) -> io::Error {
    match e {
        Error::Io(e) => e,
        other => io::Error::other(other.to_string()),
    }
}

fn create_new(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

fn write_dataset(path: &Path, data: &na::DVector<f64>) -> Result<()> {
    let file = create_new(path)?;
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
    for &value in data.iter() {
        wtr.serialize((value,))?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_dataset(path: &Path) -> Result<na::DVector<f64>> {
    let mut rdr = ReaderBuilder::new().has_headers(false).from_path(path)?;
    let values = rdr
        .deserialize::<(f64,)>()
        .map(|row| row.map(|(value,)| value))
        .collect::<std::result::Result<Vec<f64>, csv::Error>>()?;
    Ok(na::DVector::from_vec(values))
}

/// Handle on an existing store.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::NotFound(format!("store {}", root.display())));
        }
        Ok(Store { root })
    }

    /// Create the store if needed, then open it.
    pub fn create_or_open(config: &StudyConfig) -> Result<(Self, StoreStatus)> {
        let status = create_store(config)?;
        Ok((Store::open(&config.store_root)?, status))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &StoreKey) -> PathBuf {
        self.root.join(key.relative_path())
    }

    fn existing(&self, key: StoreKey) -> Result<PathBuf> {
        let path = self.path(&key);
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::NotFound(key.canonical()))
        }
    }

    pub fn read_initial(
        &self,
        condition: InitialCondition,
        level: RefinementLevel,
    ) -> Result<na::DVector<f64>> {
        read_dataset(&self.existing(StoreKey::InitialData(condition, level))?)
    }

    pub fn read_solution(
        &self,
        condition: InitialCondition,
        scheme: FluxScheme,
        level: RefinementLevel,
    ) -> Result<na::DVector<f64>> {
        read_dataset(&self.existing(StoreKey::Solution(condition, scheme, level))?)
    }

    pub fn has_solution(
        &self,
        condition: InitialCondition,
        scheme: FluxScheme,
        level: RefinementLevel,
    ) -> bool {
        self.path(&StoreKey::Solution(condition, scheme, level)).exists()
    }

    pub fn read_attributes(
        &self,
        condition: InitialCondition,
        scheme: FluxScheme,
    ) -> Result<AttributeSet> {
        let key = StoreKey::Group(condition, scheme);
        let group = self.existing(key)?;
        let file = match File::open(group.join(ATTRIBUTES_FILE)) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::NotFound(key.canonical()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_reader(io::BufReader::new(file))?)
    }

    /// Write a computed solution into its group. Existing datasets are never replaced.
    pub fn record_solution(
        &self,
        condition: InitialCondition,
        scheme: FluxScheme,
        level: RefinementLevel,
        data: &na::DVector<f64>,
    ) -> Result<()> {
        self.existing(StoreKey::Group(condition, scheme))?;

        let key = StoreKey::Solution(condition, scheme, level);
        if data.len() != level.num_points() {
            return Err(Error::ShapeMismatch {
                key: key.canonical(),
                expected: level.num_points(),
                found: data.len(),
            });
        }

        let path = self.path(&key);
        match write_dataset(&path, data) {
            Ok(()) => {
                debug!(key = %key, "solution recorded");
                Ok(())
            }
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(Error::AlreadyExists(key.canonical()))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(k: u32) -> RefinementLevel {
        RefinementLevel::new(k).unwrap()
    }

    fn fresh_store() -> (TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let config = StudyConfig::with_store_root(dir.path().join("db"));
        let (store, status) = Store::create_or_open(&config).unwrap();
        assert_eq!(status, StoreStatus::Created);
        (dir, store)
    }

    #[test]
    fn schema_contains_every_initial_dataset_and_group() {
        let (_dir, store) = fresh_store();
        for condition in InitialCondition::ALL {
            for k in RefinementLevel::all() {
                let data = store.read_initial(condition, k).unwrap();
                assert_eq!(data, initial_data(condition, k));
            }
            for scheme in FluxScheme::ALL {
                let attrs = store.read_attributes(condition, scheme).unwrap();
                assert_eq!(attrs.a, 3.0);
                assert_eq!(attrs.t, 9.0);
            }
        }
        assert_eq!(
            store
                .read_attributes(InitialCondition::Semicircle, FluxScheme::LaxWendroffFourthOrder)
                .unwrap()
                .cfl,
            0.2
        );
    }

    #[test]
    fn no_staging_directory_is_left_behind() {
        let (dir, _store) = fresh_store();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn missing_solution_is_not_found() {
        let (_dir, store) = fresh_store();
        let err = store
            .read_solution(InitialCondition::SquareWave, FluxScheme::Upwind, level(6))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(ref key) if key == "Square_Wave/Upwind/k = 6"));
    }

    #[test]
    fn solutions_are_never_overwritten() {
        let (_dir, store) = fresh_store();
        let k = level(6);
        let first = na::DVector::from_element(64, 1.0);
        let second = na::DVector::from_element(64, 2.0);
        store
            .record_solution(InitialCondition::GaussianPulse, FluxScheme::Fromm, k, &first)
            .unwrap();
        let err = store
            .record_solution(InitialCondition::GaussianPulse, FluxScheme::Fromm, k, &second)
            .unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(
            store
                .read_solution(InitialCondition::GaussianPulse, FluxScheme::Fromm, k)
                .unwrap(),
            first
        );
    }

    #[test]
    fn wrong_length_is_rejected() {
        let (_dir, store) = fresh_store();
        let err = store
            .record_solution(
                InitialCondition::SquareWave,
                FluxScheme::Upwind,
                level(7),
                &na::DVector::zeros(64),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                expected: 128,
                found: 64,
                ..
            }
        ));
    }

    #[test]
    fn recording_into_a_missing_group_is_not_found() {
        let (_dir, store) = fresh_store();
        fs::remove_dir_all(store.root().join("Semicircle").join("Upwind")).unwrap();
        let err = store
            .record_solution(
                InitialCondition::Semicircle,
                FluxScheme::Upwind,
                level(6),
                &na::DVector::zeros(64),
            )
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(ref key) if key == "Semicircle/Upwind"));
        assert!(matches!(
            store.read_attributes(InitialCondition::Semicircle, FluxScheme::Upwind),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn leftover_staging_from_a_killed_run_does_not_block_creation() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir
            .path()
            .join(format!(".db.partial-{}", std::process::id()));
        fs::create_dir(&stale).unwrap();
        fs::write(stale.join("Square_Wave"), b"half written").unwrap();
        let config = StudyConfig::with_store_root(dir.path().join("db"));

        assert_eq!(create_store(&config).unwrap(), StoreStatus::Created);
        assert!(Store::open(&config.store_root).is_ok());
        // Someone else's staging directory is not ours to remove.
        assert!(stale.join("Square_Wave").is_file());
    }

    #[test]
    fn group_without_attributes_is_not_found() {
        let (_dir, store) = fresh_store();
        fs::remove_file(store.root().join("Square_Wave/Fromm/attributes.json")).unwrap();
        assert!(matches!(
            store.read_attributes(InitialCondition::SquareWave, FluxScheme::Fromm),
            Err(Error::NotFound(ref key)) if key == "Square_Wave/Fromm"
        ));
    }

    #[test]
    fn creation_failure_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, b"").unwrap();
        let config = StudyConfig::with_store_root(blocker.join("db"));

        let err = create_store(&config).unwrap_err();
        assert!(matches!(err, Error::CreateFailure { .. }));
        assert!(!blocker.join("db").exists());
    }

    #[test]
    fn open_requires_an_existing_store() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Store::open(dir.path().join("absent")),
            Err(Error::NotFound(_))
        ));
    }
}
