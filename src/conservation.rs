//! Discrete mass conservation: the Riemann sums of the initial data and of the
//! computed solution must agree up to floating-point accumulation.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::schema::{FluxScheme, InitialCondition, RefinementLevel};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToleranceViolation {
    pub condition: InitialCondition,
    pub scheme: FluxScheme,
    pub level: RefinementLevel,
    pub conservation_error: f64,
}

impl fmt::Display for ToleranceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/k = {}: conservation is not preserved (error {:.1e})",
            self.condition, self.scheme, self.level, self.conservation_error
        )
    }
}

/// Violations collected over a sweep. Never aborts anything on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConservationReport {
    pub violations: Vec<ToleranceViolation>,
}

impl ConservationReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn extend(&mut self, violations: impl IntoIterator<Item = ToleranceViolation>) {
        self.violations.extend(violations);
    }
}

impl fmt::Display for ConservationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "conservation preserved for every computation");
        }
        writeln!(f, "{} conservation violation(s):", self.violations.len())?;
        for violation in &self.violations {
            writeln!(f, "\t{violation}")?;
        }
        Ok(())
    }
}

/// `|Σ initial - Σ solution| · h`
pub fn conservation_error(initial: &[f64], solution: &[f64], h: f64) -> f64 {
    let initial_sum: f64 = initial.iter().sum();
    let solution_sum: f64 = solution.iter().sum();
    (initial_sum - solution_sum).abs() * h
}

/// A NaN error (a blown-up solution) counts as a violation.
pub fn exceeds_tolerance(error: f64, tolerance: f64) -> bool {
    error.is_nan() || error > tolerance
}

/// Check every level of one (condition, scheme) unit against `tolerance`.
///
/// Missing datasets abort the unit with `NotFound`; violations are returned, not raised.
pub fn check_conservation(
    store: &Store,
    condition: InitialCondition,
    scheme: FluxScheme,
    tolerance: f64,
) -> Result<Vec<ToleranceViolation>> {
    let mut violations = Vec::new();
    for level in RefinementLevel::all() {
        let initial = store.read_initial(condition, level)?;
        let solution = store.read_solution(condition, scheme, level)?;
        let error = conservation_error(initial.as_slice(), solution.as_slice(), level.spacing());

        if exceeds_tolerance(error, tolerance) {
            let violation = ToleranceViolation {
                condition,
                scheme,
                level,
                conservation_error: error,
            };
            warn!("{violation}");
            violations.push(violation);
        }
    }
    Ok(violations)
}
