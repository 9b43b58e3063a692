extern crate nalgebra as na;

use crate::fv_core::mesh::Mesh;

//traits
pub trait InitialProfile {
    /// Values at the physical nodes of `mesh`, without ghost cells.
    fn compute(&self, mesh: &dyn Mesh) -> na::DVector<f64>;
}

pub trait BCEnforcer {
    fn enforce(&self, u: &mut na::DVector<f64>);
}

//structs for initial
pub struct PointSampled<F>
where
    F: Fn(f64) -> f64,
{
    pub f: F,
}

//structs for boundary
/// Periodic wrap of two ghost cells on each side.
pub struct PeriodicBC;

pub const PERIODIC_GHOSTS: usize = 2;

//implementation for initial
impl<F> InitialProfile for PointSampled<F>
where
    F: Fn(f64) -> f64,
{
    fn compute(&self, mesh: &dyn Mesh) -> na::DVector<f64> {
        let values: Vec<f64> = mesh.physical_points().iter().map(|&x| (self.f)(x)).collect();
        na::DVector::from_vec(values)
    }
}

//implementation for boundary
impl BCEnforcer for PeriodicBC {
    fn enforce(&self, u: &mut na::DVector<f64>) {
        let length = u.len();
        debug_assert!(length >= 2 * PERIODIC_GHOSTS + 2, "not enough elements");

        let n = length - 2 * PERIODIC_GHOSTS;
        u[0] = u[n];
        u[1] = u[n + 1];
        u[n + 2] = u[2];
        u[n + 3] = u[3];
    }
}

/// Embed physical values into a vector with periodic ghost cells filled in.
pub fn with_ghosts<B>(physical: &na::DVector<f64>, bc: &B) -> na::DVector<f64>
where
    B: BCEnforcer,
{
    let n = physical.len();
    let mut u = na::DVector::zeros(n + 2 * PERIODIC_GHOSTS);
    u.rows_mut(PERIODIC_GHOSTS, n).copy_from(physical);
    bc.enforce(&mut u);
    u
}

/// Strip the ghost cells again.
pub fn physical_part(u: &na::DVector<f64>) -> na::DVector<f64> {
    let n = u.len() - 2 * PERIODIC_GHOSTS;
    u.rows(PERIODIC_GHOSTS, n).into_owned()
}
