extern crate nalgebra as na;

use crate::fv_core::{
    condition::{InitialProfile, PointSampled},
    mesh::Mesh1d,
};
use crate::schema::{InitialCondition, RefinementLevel};

/// Unit box on [0.25, 0.75], edges included.
pub fn square_wave() -> PointSampled<fn(f64) -> f64> {
    PointSampled {
        f: (|x| if (x - 0.5).abs() <= 0.25 { 1.0 } else { 0.0 }) as fn(f64) -> f64,
    }
}

/// Upper half of the circle of radius 0.5 centered at 0.5.
pub fn semicircle() -> PointSampled<fn(f64) -> f64> {
    PointSampled {
        f: (|x| (0.25 - (x - 0.5).powi(2)).max(0.0).sqrt()) as fn(f64) -> f64,
    }
}

pub fn gaussian_pulse() -> PointSampled<fn(f64) -> f64> {
    PointSampled {
        f: (|x| (-256.0 * (x - 0.5).powi(2)).exp()) as fn(f64) -> f64,
    }
}

pub fn profile(condition: InitialCondition) -> PointSampled<fn(f64) -> f64> {
    match condition {
        InitialCondition::SquareWave => square_wave(),
        InitialCondition::Semicircle => semicircle(),
        InitialCondition::GaussianPulse => gaussian_pulse(),
    }
}

/// Exact initial data sampled at `x_i = i 2^-k`, `i = 0..2^k`.
pub fn initial_data(condition: InitialCondition, level: RefinementLevel) -> na::DVector<f64> {
    let mesh = Mesh1d::new(level);
    profile(condition).compute(&mesh)
}
