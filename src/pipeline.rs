//! Batch driver: create the store, compute every missing solution, then analyze
//! each (condition, scheme) unit.
//!
//! Structural errors abort only the unit they occur in. Conservation violations
//! are gathered into one report for the whole sweep.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::config::StudyConfig;
use crate::conservation::{check_conservation, ConservationReport, ToleranceViolation};
use crate::convergence::{convergence_table, write_convergence_csv, ConvergenceRow};
use crate::error::{Error, Result};
use crate::schema::{FluxScheme, InitialCondition, RefinementLevel, StoreKey};
use crate::store::{Store, StoreStatus};
use crate::time_integrator::forward_euler::{progress_bar, solver_fo};

/// A unit (or task) that could not be processed.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitFailure {
    pub unit: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct SolveSummary {
    pub solved: usize,
    pub skipped: usize,
    pub failures: Vec<UnitFailure>,
}

#[derive(Debug, Default)]
pub struct AnalysisSummary {
    pub tables: Vec<(InitialCondition, FluxScheme, PathBuf)>,
    pub conservation: ConservationReport,
    pub failures: Vec<UnitFailure>,
}

#[derive(Debug)]
pub struct StudySummary {
    pub store_status: StoreStatus,
    pub solve: SolveSummary,
    pub analysis: AnalysisSummary,
}

/// Compute one solution and record it in its group.
pub fn solve_task(
    store: &Store,
    condition: InitialCondition,
    scheme: FluxScheme,
    level: RefinementLevel,
) -> Result<()> {
    let key = StoreKey::Solution(condition, scheme, level);
    if store.has_solution(condition, scheme, level) {
        return Err(Error::AlreadyExists(key.canonical()));
    }

    let initial = store.read_initial(condition, level)?;
    let attrs = store.read_attributes(condition, scheme)?;

    info!(%key, cfl = attrs.cfl, "computation in progress");
    let start = Instant::now();
    let pb = progress_bar(100)?;
    let solution = solver_fo(&initial, scheme, &attrs, &pb)?;
    pb.finish_and_clear();

    store.record_solution(condition, scheme, level, &solution)?;
    info!(%key, elapsed_s = start.elapsed().as_secs_f64(), "computation completed");
    Ok(())
}

pub fn solve_all(store: &Store, config: &StudyConfig) -> SolveSummary {
    let mut summary = SolveSummary::default();
    for condition in InitialCondition::ALL {
        for scheme in FluxScheme::ALL {
            for level in config.solve_levels() {
                match solve_task(store, condition, scheme, level) {
                    Ok(()) => summary.solved += 1,
                    Err(e) if e.is_already_exists() => summary.skipped += 1,
                    Err(e) => {
                        let unit = StoreKey::Solution(condition, scheme, level).canonical();
                        error!(%unit, error = %e, "computation failed");
                        summary.failures.push(UnitFailure {
                            unit,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }
    }
    summary
}

/// Conservation check plus convergence table (exported as CSV) for one unit.
pub fn analyze_unit(
    store: &Store,
    config: &StudyConfig,
    condition: InitialCondition,
    scheme: FluxScheme,
) -> Result<(Vec<ToleranceViolation>, Vec<ConvergenceRow>, PathBuf)> {
    let violations = check_conservation(store, condition, scheme, config.conservation_tolerance)?;
    let rows = convergence_table(store, condition, scheme)?;

    fs::create_dir_all(&config.report_dir)?;
    let csv_path = config.report_dir.join(format!("{condition}_{scheme}.csv"));
    write_convergence_csv(&rows, &csv_path)?;
    Ok((violations, rows, csv_path))
}

pub fn analyze_all(store: &Store, config: &StudyConfig) -> AnalysisSummary {
    let mut summary = AnalysisSummary::default();
    for condition in InitialCondition::ALL {
        for scheme in FluxScheme::ALL {
            match analyze_unit(store, config, condition, scheme) {
                Ok((violations, _rows, csv_path)) => {
                    summary.conservation.extend(violations);
                    summary.tables.push((condition, scheme, csv_path));
                }
                Err(e) => {
                    let unit = StoreKey::Group(condition, scheme).canonical();
                    warn!(%unit, error = %e, "analysis skipped");
                    summary.failures.push(UnitFailure {
                        unit,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
    if summary.conservation.is_clean() {
        info!("conservation preserved for every analyzed computation");
    } else {
        warn!(
            violations = summary.conservation.violations.len(),
            "conservation check reported violations"
        );
    }
    summary
}

pub fn run_study(config: &StudyConfig) -> Result<StudySummary> {
    config.validate()?;
    let (store, store_status) = Store::create_or_open(config)?;
    let solve = solve_all(&store, config);
    let analysis = analyze_all(&store, config);
    Ok(StudySummary {
        store_status,
        solve,
        analysis,
    })
}
