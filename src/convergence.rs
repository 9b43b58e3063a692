extern crate nalgebra as na;

use std::collections::BTreeMap;
use std::f64::consts::LN_2;
use std::path::Path;

use csv::Writer;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::norm::{grid_norm, NormKind};
use crate::schema::{FluxScheme, InitialCondition, RefinementLevel, StoreKey};
use crate::store::Store;

/// Norms of the error vector at one refinement level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorNormRecord {
    pub sup_norm: f64,
    pub one_norm: f64,
    pub two_norm: f64,
}

impl ErrorNormRecord {
    pub fn from_error(error: &na::DVector<f64>) -> Result<Self> {
        Ok(ErrorNormRecord {
            sup_norm: grid_norm(error, NormKind::LInf)?,
            one_norm: grid_norm(error, NormKind::L1)?,
            two_norm: grid_norm(error, NormKind::L2)?,
        })
    }

    pub fn get(&self, kind: NormKind) -> f64 {
        match kind {
            NormKind::LInf => self.sup_norm,
            NormKind::L1 => self.one_norm,
            NormKind::L2 => self.two_norm,
        }
    }
}

/// Error norms keyed by refinement level, in increasing order.
pub type ErrorNorms = BTreeMap<RefinementLevel, ErrorNormRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConvergenceRow {
    pub k: u32,
    #[serde(rename = "M")]
    pub m: usize,
    pub h: f64,
    pub sup_norm: f64,
    pub sup_norm_rate: Option<f64>,
    pub one_norm: f64,
    pub one_norm_rate: Option<f64>,
    pub two_norm: f64,
    pub two_norm_rate: Option<f64>,
}

/// `initial - solution`, elementwise.
pub fn error_vector(
    initial: &na::DVector<f64>,
    solution: &na::DVector<f64>,
    key: &StoreKey,
) -> Result<na::DVector<f64>> {
    if initial.len() != solution.len() {
        return Err(Error::ShapeMismatch {
            key: key.canonical(),
            expected: initial.len(),
            found: solution.len(),
        });
    }
    Ok(initial - solution)
}

pub fn error_norms(
    store: &Store,
    condition: InitialCondition,
    scheme: FluxScheme,
) -> Result<ErrorNorms> {
    let mut norms = ErrorNorms::new();
    for level in RefinementLevel::all() {
        let initial = store.read_initial(condition, level)?;
        let solution = store.read_solution(condition, scheme, level)?;
        let key = StoreKey::Solution(condition, scheme, level);
        let error = error_vector(&initial, &solution, &key)?;
        norms.insert(level, ErrorNormRecord::from_error(&error)?);
    }
    Ok(norms)
}

/// Empirical order between `level - 1` and `level`:
/// `|ln e[k-1] - ln e[k]| / ln 2`.
pub fn convergence_rate(level: RefinementLevel, kind: NormKind, norms: &ErrorNorms) -> Result<f64> {
    let coarser = level.coarser().ok_or_else(|| {
        Error::DomainError(format!("no coarser level below k = {level} to compare against"))
    })?;
    let lookup = |k: RefinementLevel| {
        norms
            .get(&k)
            .map(|record| record.get(kind))
            .ok_or_else(|| Error::NotFound(format!("error norms for k = {k}")))
    };
    let coarse = lookup(coarser)?;
    let fine = lookup(level)?;

    for (k, value) in [(coarser, coarse), (level, fine)] {
        if !(value > 0.0 && value.is_finite()) {
            return Err(Error::DomainError(format!(
                "logarithm undefined for {kind:?} error {value} at k = {k}"
            )));
        }
    }
    Ok((coarse.ln() - fine.ln()).abs() / LN_2)
}

fn rate_cell(level: RefinementLevel, kind: NormKind, norms: &ErrorNorms) -> Result<Option<f64>> {
    match convergence_rate(level, kind, norms) {
        Ok(rate) => Ok(Some(rate)),
        Err(Error::DomainError(reason)) => {
            warn!(k = level.k(), norm = ?kind, %reason, "convergence rate omitted");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Rows for every level that has a coarser neighbour, i.e. k = 7..16.
pub fn convergence_rows(norms: &ErrorNorms) -> Result<Vec<ConvergenceRow>> {
    RefinementLevel::all()
        .filter(|level| level.coarser().is_some())
        .map(|level| {
            let record = norms
                .get(&level)
                .ok_or_else(|| Error::NotFound(format!("error norms for k = {level}")))?;
            Ok(ConvergenceRow {
                k: level.k(),
                m: level.num_points(),
                h: level.spacing(),
                sup_norm: record.sup_norm,
                sup_norm_rate: rate_cell(level, NormKind::LInf, norms)?,
                one_norm: record.one_norm,
                one_norm_rate: rate_cell(level, NormKind::L1, norms)?,
                two_norm: record.two_norm,
                two_norm_rate: rate_cell(level, NormKind::L2, norms)?,
            })
        })
        .collect()
}

pub fn convergence_table(
    store: &Store,
    condition: InitialCondition,
    scheme: FluxScheme,
) -> Result<Vec<ConvergenceRow>> {
    let norms = error_norms(store, condition, scheme)?;
    let rows = convergence_rows(&norms)?;
    debug!(%condition, %scheme, rows = rows.len(), "convergence table computed");
    Ok(rows)
}

pub fn write_convergence_csv(rows: &[ConvergenceRow], csv_path: &Path) -> Result<()> {
    let mut wtr = Writer::from_path(csv_path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
