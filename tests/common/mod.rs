#![allow(dead_code)]

use advection_convergence::config::StudyConfig;
use advection_convergence::schema::{FluxScheme, InitialCondition, RefinementLevel};
use advection_convergence::store::{Store, StoreStatus};
use nalgebra::DVector;
use tempfile::TempDir;

/// Fresh store in a temporary directory, reports next to it.
pub fn fresh_store() -> (TempDir, StudyConfig, Store) {
    let dir = tempfile::tempdir().unwrap();
    let config = StudyConfig {
        report_dir: dir.path().join("reports"),
        ..StudyConfig::with_store_root(dir.path().join("computations_output"))
    };
    let (store, status) = Store::create_or_open(&config).unwrap();
    assert_eq!(status, StoreStatus::Created);
    (dir, config, store)
}

/// Record `f(initial, level)` as the solution of one unit at every level.
pub fn record_all_levels<F>(store: &Store, condition: InitialCondition, scheme: FluxScheme, f: F)
where
    F: Fn(&DVector<f64>, RefinementLevel) -> DVector<f64>,
{
    for level in RefinementLevel::all() {
        let initial = store.read_initial(condition, level).unwrap();
        store
            .record_solution(condition, scheme, level, &f(&initial, level))
            .unwrap();
    }
}
