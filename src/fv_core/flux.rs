extern crate nalgebra as na;

use crate::fv_core::condition::{physical_part, with_ghosts, PeriodicBC, PERIODIC_GHOSTS};
use crate::fv_core::reconstruction::{Limiter, McLimiter};
use crate::schema::{AttributeSet, FluxScheme};

/// Numerical flux for `u_t + a u_x = 0`, `a > 0`, on a periodic grid.
///
/// `u` carries two ghost cells on each side (length `M + 4`). The result has
/// length `M + 1`: entry `j` is the flux into physical cell `j` through its left
/// edge, and entry `M` repeats entry `0`.
pub trait FluxFunction {
    fn interface_fluxes(&self, u: &na::DVector<f64>) -> na::DVector<f64>;
}

pub struct UpwindFlux {
    pub a: f64,
}

pub struct LaxFriedrichFlux {
    pub a: f64,
    pub cfl: f64,
}

pub struct LaxWendroffFlux {
    pub a: f64,
    pub cfl: f64,
}

pub struct FrommFlux {
    pub a: f64,
    pub cfl: f64,
}

pub struct FrommVanLeerFlux<L: Limiter> {
    pub a: f64,
    pub cfl: f64,
    pub limiter: L,
}

pub struct FluxCorrectedTransport {
    pub a: f64,
    pub cfl: f64,
}

pub struct LaxWendroffFourthOrderFlux {
    pub a: f64,
    pub cfl: f64,
}

//HELPERS
/// Evaluate `flux(j, u_at)` at every physical edge, `u_at` indexed by physical cell.
fn edge_fluxes<F>(u: &na::DVector<f64>, flux: F) -> na::DVector<f64>
where
    F: Fn(isize, &dyn Fn(isize) -> f64) -> f64,
{
    let m = u.len() - 2 * PERIODIC_GHOSTS;
    let u_at = |i: isize| u[(i + PERIODIC_GHOSTS as isize) as usize];
    let mut f: Vec<f64> = (0..m as isize).map(|j| flux(j, &u_at)).collect();
    f.push(f[0]);
    na::DVector::from_vec(f)
}

/// One conservative step `u_j + (dt/dx)(F_j - F_{j+1})` on the physical cells.
pub(crate) fn apply_fluxes(u: &na::DVector<f64>, f: &na::DVector<f64>, t_over_h: f64) -> na::DVector<f64> {
    let mut u_new = u.clone();
    let m = f.len() - 1;
    for j in 0..m {
        u_new[j + PERIODIC_GHOSTS] += t_over_h * (f[j] - f[j + 1]);
    }
    u_new
}

//IMPLEMENTATIONS
impl FluxFunction for UpwindFlux {
    fn interface_fluxes(&self, u: &na::DVector<f64>) -> na::DVector<f64> {
        edge_fluxes(u, |j, u| self.a * u(j - 1))
    }
}

impl FluxFunction for LaxFriedrichFlux {
    fn interface_fluxes(&self, u: &na::DVector<f64>) -> na::DVector<f64> {
        let half_a = 0.5 * self.a;
        let inv_cfl = 1.0 / self.cfl;
        edge_fluxes(u, |j, u| {
            half_a * ((u(j - 1) + u(j)) + inv_cfl * (u(j - 1) - u(j)))
        })
    }
}

impl FluxFunction for LaxWendroffFlux {
    fn interface_fluxes(&self, u: &na::DVector<f64>) -> na::DVector<f64> {
        let half_a = 0.5 * self.a;
        edge_fluxes(u, |j, u| {
            half_a * ((u(j) + u(j - 1)) + self.cfl * (u(j - 1) - u(j)))
        })
    }
}

impl FluxFunction for FrommFlux {
    fn interface_fluxes(&self, u: &na::DVector<f64>) -> na::DVector<f64> {
        let cfl_expr = 0.25 * (1.0 - self.cfl);
        edge_fluxes(u, |j, u| self.a * (u(j - 1) + cfl_expr * (u(j) - u(j - 2))))
    }
}

impl<L: Limiter> FluxFunction for FrommVanLeerFlux<L> {
    fn interface_fluxes(&self, u: &na::DVector<f64>) -> na::DVector<f64> {
        // Half of the limited slope in the upwind cell, damped by (1 - CFL).
        let cfl_expr = 0.5 * (1.0 - self.cfl);
        edge_fluxes(u, |j, u| {
            let slope = self.limiter.limit(u(j) - u(j - 1), u(j - 1) - u(j - 2));
            self.a * (u(j - 1) + cfl_expr * slope)
        })
    }
}

impl FluxFunction for FluxCorrectedTransport {
    fn interface_fluxes(&self, u: &na::DVector<f64>) -> na::DVector<f64> {
        let t_over_h = self.cfl / self.a;
        let h_over_t = self.a / self.cfl;
        let cfl_expr = 0.5 * self.a * (1.0 - self.cfl);

        let low_order = UpwindFlux { a: self.a }.interface_fluxes(u);
        let transported = with_ghosts(
            &physical_part(&apply_fluxes(u, &low_order, t_over_h)),
            &PeriodicBC,
        );
        let u_td = |i: isize| transported[(i + PERIODIC_GHOSTS as isize) as usize];

        let corrections = edge_fluxes(u, |j, u| {
            let anti_diffusive = cfl_expr * (u(j) - u(j - 1));
            let s = anti_diffusive.signum();
            let theta = (s * h_over_t * (u_td(j + 1) - u_td(j)))
                .min(s * h_over_t * (u_td(j - 1) - u_td(j - 2)))
                .min(s * anti_diffusive);
            s * theta.max(0.0)
        });

        low_order + corrections
    }
}

impl FluxFunction for LaxWendroffFourthOrderFlux {
    fn interface_fluxes(&self, u: &na::DVector<f64>) -> na::DVector<f64> {
        let a = self.a;
        let half_cfl = 0.5 * self.cfl;
        let cfl_expr = a * (4.0 * self.cfl.powi(3) + 1.0) / 16.0;
        let alpha = a * 7.0 / 12.0;
        let beta = a / 12.0;
        let gamma = a * 5.0 / 4.0;
        edge_fluxes(u, |j, u| {
            let u_n = alpha * (u(j) + u(j - 1)) - beta * (u(j + 1) + u(j - 2));
            let f = u_n
                - half_cfl * (gamma * (u(j) - u(j - 1)) - beta * (u(j + 1) - u(j - 2)));
            let d = cfl_expr * ((u(j + 1) - u(j - 2)) - 3.0 * (u(j) - u(j - 1)));
            f + d
        })
    }
}

/// The flux evaluated for `scheme` with the group's attributes.
///
/// The `_CFL_half` variants share the flux of their parent scheme; only the
/// Courant number in their attribute set differs.
pub fn flux_for(scheme: FluxScheme, attrs: &AttributeSet) -> Box<dyn FluxFunction> {
    let (a, cfl) = (attrs.a, attrs.cfl);
    match scheme {
        FluxScheme::Upwind => Box::new(UpwindFlux { a }),
        FluxScheme::LaxFriedrichs => Box::new(LaxFriedrichFlux { a, cfl }),
        FluxScheme::LaxWendroff => Box::new(LaxWendroffFlux { a, cfl }),
        FluxScheme::Fromm | FluxScheme::FrommCflHalf => Box::new(FrommFlux { a, cfl }),
        FluxScheme::FrommVanLeer | FluxScheme::FrommVanLeerCflHalf => Box::new(FrommVanLeerFlux {
            a,
            cfl,
            limiter: McLimiter,
        }),
        FluxScheme::FluxCorrectedTransport => Box::new(FluxCorrectedTransport { a, cfl }),
        FluxScheme::LaxWendroffFourthOrder => Box::new(LaxWendroffFourthOrderFlux { a, cfl }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ghosted(values: &[f64]) -> na::DVector<f64> {
        with_ghosts(&na::DVector::from_column_slice(values), &PeriodicBC)
    }

    fn attrs(cfl: f64) -> AttributeSet {
        AttributeSet { a: 3.0, t: 9.0, cfl }
    }

    #[test]
    fn fluxes_are_periodic() {
        let u = ghosted(&[0.0, 1.0, 4.0, 2.0, 0.5, 0.0, 3.0, 1.0]);
        for scheme in FluxScheme::ALL {
            let f = flux_for(scheme, &attrs(0.9)).interface_fluxes(&u);
            assert_eq!(f.len(), 9, "{scheme}");
            assert_eq!(f[0], f[8], "{scheme}");
        }
    }

    #[test]
    fn constant_state_has_flux_a_times_u() {
        let u = ghosted(&[2.0; 16]);
        for scheme in FluxScheme::ALL {
            let f = flux_for(scheme, &attrs(0.5)).interface_fluxes(&u);
            for value in f.iter() {
                assert!((value - 6.0).abs() < 1e-12, "{scheme}: {value}");
            }
        }
    }

    #[test]
    fn upwind_reads_the_left_neighbour() {
        let u = ghosted(&[1.0, 2.0, 3.0, 4.0]);
        let f = UpwindFlux { a: 2.0 }.interface_fluxes(&u);
        assert_eq!(f.as_slice(), &[8.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn unit_cfl_upwind_step_is_an_exact_shift() {
        let u = ghosted(&[1.0, 2.0, 3.0, 4.0]);
        let f = UpwindFlux { a: 1.0 }.interface_fluxes(&u);
        let stepped = physical_part(&apply_fluxes(&u, &f, 1.0));
        assert_eq!(stepped.as_slice(), &[4.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn unit_cfl_lax_wendroff_is_upwind() {
        let u = ghosted(&[0.0, 1.0, 4.0, 2.0]);
        let lw = LaxWendroffFlux { a: 3.0, cfl: 1.0 }.interface_fluxes(&u);
        let up = UpwindFlux { a: 3.0 }.interface_fluxes(&u);
        assert_eq!(lw, up);
    }

    #[test]
    fn limiter_switches_fromm_off_at_extrema() {
        // Cell 2 is a local maximum, so the edge to its right gets no correction.
        let u = ghosted(&[0.0, 1.0, 5.0, 1.0, 0.0, 0.0]);
        let f = FrommVanLeerFlux {
            a: 1.0,
            cfl: 0.5,
            limiter: McLimiter,
        }
        .interface_fluxes(&u);
        assert_eq!(f[3], 5.0);
    }

    #[test]
    fn flux_corrected_transport_reduces_to_upwind_on_monotone_plateaus() {
        let u = ghosted(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0]);
        let fct = FluxCorrectedTransport { a: 3.0, cfl: 0.9 }.interface_fluxes(&u);
        let up = UpwindFlux { a: 3.0 }.interface_fluxes(&u);
        // Away from the jumps the anti-diffusive flux is zero.
        assert_eq!(fct[1], up[1]);
        assert_eq!(fct[5], up[5]);
    }
}
