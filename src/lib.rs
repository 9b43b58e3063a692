//! Empirical convergence study for the periodic linear advection equation
//! `u_t + a u_x = 0` on `[0, 1)`.
//!
//! Solutions for three initial conditions and nine flux schemes at refinement
//! levels `k = 6..16` (grids of `2^k` points) are kept in a persisted
//! [`store`]. The analysis side computes error norms against the exact initial
//! profile (after `T = 9` the pulse has been transported around the domain
//! `a T = 27` times), empirical convergence rates and a discrete conservation check.
//!
//! ```rust,no_run
//! use advection_convergence::{
//!     config::StudyConfig,
//!     convergence::convergence_table,
//!     schema::{FluxScheme, InitialCondition},
//!     store::Store,
//! };
//!
//! let config = StudyConfig::default();
//! let (store, _status) = Store::create_or_open(&config)?;
//! for row in convergence_table(&store, InitialCondition::GaussianPulse, FluxScheme::Fromm)? {
//!     println!("k = {} rate = {:?}", row.k, row.one_norm_rate);
//! }
//! # Ok::<(), advection_convergence::Error>(())
//! ```

pub mod config;
pub mod conservation;
pub mod convergence;
pub mod error;
pub mod fv_core;
pub mod norm;
pub mod pipeline;
pub mod schema;
pub mod store;
pub mod time_integrator;

pub use error::{Error, Result};
