extern crate nalgebra as na;

use crate::error::{Error, Result};
use crate::fv_core::{
    condition::{physical_part, with_ghosts, BCEnforcer, PeriodicBC},
    flux::{apply_fluxes, flux_for, FluxFunction},
};
use crate::schema::{AttributeSet, FluxScheme};

use indicatif::{ProgressBar, ProgressStyle};

//TRAITS
pub trait TimeIntegrator {
    fn update(
        &self,
        u: &na::DVector<f64>,
        t_over_h: f64,
        flux_func: &dyn FluxFunction,
        bc: &dyn BCEnforcer,
    ) -> na::DVector<f64>;
}

//STRUCTS
/// Conservative forward Euler: `u_j <- u_j + (dt/dx)(F_j - F_{j+1})`.
pub struct FoIntegrator;

//IMPLEMENTATIONS
impl TimeIntegrator for FoIntegrator {
    fn update(
        &self,
        u: &na::DVector<f64>,
        t_over_h: f64,
        flux_func: &dyn FluxFunction,
        bc: &dyn BCEnforcer,
    ) -> na::DVector<f64> {
        let f = flux_func.interface_fluxes(u);
        let mut u_new = apply_fluxes(u, &f, t_over_h);
        bc.enforce(&mut u_new);

        u_new
    }
}

//HELPERS
/// `N = round(T M / (CFL / a))`: the fixed step `dt = CFL h / a` that reaches `T`.
pub fn step_count(attrs: &AttributeSet, num_points: usize) -> u64 {
    let t_over_h = attrs.cfl / attrs.a;
    (attrs.t * num_points as f64 / t_over_h + 0.5).floor() as u64
}

pub fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}% (eta: {eta}) {msg}",
            )?
            .progress_chars("█░"),
    );
    Ok(pb)
}

/// Advance `initial` to the output time of `attrs` with the flux of `scheme`.
pub fn solver_fo(
    initial: &na::DVector<f64>,
    scheme: FluxScheme,
    attrs: &AttributeSet,
    pb: &ProgressBar,
) -> Result<na::DVector<f64>> {
    if initial.is_empty() {
        return Err(Error::DomainError("cannot advance an empty grid".to_string()));
    }
    if !(attrs.a > 0.0 && attrs.cfl > 0.0 && attrs.cfl <= 1.0) {
        return Err(Error::DomainError(format!(
            "unsupported attributes a = {}, CFL = {}",
            attrs.a, attrs.cfl
        )));
    }

    let flux_func = flux_for(scheme, attrs);
    let bc = PeriodicBC;
    let integrator = FoIntegrator;
    let t_over_h = attrs.cfl / attrs.a;
    let num_steps = step_count(attrs, initial.len());

    let mut u = with_ghosts(initial, &bc);
    let mut percent = 0;
    for step in 0..num_steps {
        u = integrator.update(&u, t_over_h, flux_func.as_ref(), &bc);

        let fraction = (step + 1) * 100 / num_steps;
        if fraction != percent {
            percent = fraction;
            pb.set_position(percent);
        }
    }

    Ok(physical_part(&u))
}
