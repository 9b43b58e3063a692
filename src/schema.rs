//! Identities and keys of the persisted study.
//!
//! Every dataset in the store is addressed by a [`StoreKey`]; the canonical
//! relative paths are produced here and nowhere else.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const MIN_LEVEL: u32 = 6;
pub const MAX_LEVEL: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InitialCondition {
    #[serde(rename = "Square_Wave")]
    SquareWave,
    #[serde(rename = "Semicircle")]
    Semicircle,
    #[serde(rename = "Gaussian_Pulse")]
    GaussianPulse,
}

impl InitialCondition {
    pub const ALL: [InitialCondition; 3] = [
        InitialCondition::SquareWave,
        InitialCondition::Semicircle,
        InitialCondition::GaussianPulse,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InitialCondition::SquareWave => "Square_Wave",
            InitialCondition::Semicircle => "Semicircle",
            InitialCondition::GaussianPulse => "Gaussian_Pulse",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FluxScheme {
    #[serde(rename = "Upwind")]
    Upwind,
    #[serde(rename = "Lax_Friedrichs")]
    LaxFriedrichs,
    #[serde(rename = "Lax_Wendroff")]
    LaxWendroff,
    #[serde(rename = "Fromm")]
    Fromm,
    #[serde(rename = "Fromm_CFL_half")]
    FrommCflHalf,
    #[serde(rename = "Fromm_van_Leer")]
    FrommVanLeer,
    #[serde(rename = "Fromm_van_Leer_CFL_half")]
    FrommVanLeerCflHalf,
    #[serde(rename = "Flux_Corrected_Transport")]
    FluxCorrectedTransport,
    #[serde(rename = "Lax_Wendroff_Fourth_Order")]
    LaxWendroffFourthOrder,
}

impl FluxScheme {
    pub const ALL: [FluxScheme; 9] = [
        FluxScheme::Upwind,
        FluxScheme::LaxFriedrichs,
        FluxScheme::LaxWendroff,
        FluxScheme::Fromm,
        FluxScheme::FrommCflHalf,
        FluxScheme::FrommVanLeer,
        FluxScheme::FrommVanLeerCflHalf,
        FluxScheme::FluxCorrectedTransport,
        FluxScheme::LaxWendroffFourthOrder,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FluxScheme::Upwind => "Upwind",
            FluxScheme::LaxFriedrichs => "Lax_Friedrichs",
            FluxScheme::LaxWendroff => "Lax_Wendroff",
            FluxScheme::Fromm => "Fromm",
            FluxScheme::FrommCflHalf => "Fromm_CFL_half",
            FluxScheme::FrommVanLeer => "Fromm_van_Leer",
            FluxScheme::FrommVanLeerCflHalf => "Fromm_van_Leer_CFL_half",
            FluxScheme::FluxCorrectedTransport => "Flux_Corrected_Transport",
            FluxScheme::LaxWendroffFourthOrder => "Lax_Wendroff_Fourth_Order",
        }
    }
}

impl fmt::Display for InitialCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for FluxScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InitialCondition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        InitialCondition::ALL
            .into_iter()
            .find(|ic| ic.name() == s)
            .ok_or_else(|| Error::UnknownName {
                kind: "initial condition",
                name: s.to_string(),
            })
    }
}

impl FromStr for FluxScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FluxScheme::ALL
            .into_iter()
            .find(|scheme| scheme.name() == s)
            .ok_or_else(|| Error::UnknownName {
                kind: "flux scheme",
                name: s.to_string(),
            })
    }
}

/// Refinement exponent `k`: the grid has `2^k` points and spacing `2^-k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RefinementLevel(u32);

impl RefinementLevel {
    pub fn new(k: u32) -> Result<Self> {
        if (MIN_LEVEL..=MAX_LEVEL).contains(&k) {
            Ok(RefinementLevel(k))
        } else {
            Err(Error::InvalidLevel(k))
        }
    }

    /// All supported levels in increasing order.
    pub fn all() -> impl Iterator<Item = RefinementLevel> {
        (MIN_LEVEL..=MAX_LEVEL).map(RefinementLevel)
    }

    pub fn k(self) -> u32 {
        self.0
    }

    pub fn num_points(self) -> usize {
        1_usize << self.0
    }

    pub fn spacing(self) -> f64 {
        1.0 / self.num_points() as f64
    }

    /// The next coarser level, if it is still in range.
    pub fn coarser(self) -> Option<RefinementLevel> {
        RefinementLevel::new(self.0 - 1).ok()
    }
}

impl TryFrom<u32> for RefinementLevel {
    type Error = Error;

    fn try_from(k: u32) -> Result<Self> {
        RefinementLevel::new(k)
    }
}

impl From<RefinementLevel> for u32 {
    fn from(level: RefinementLevel) -> u32 {
        level.0
    }
}

impl fmt::Display for RefinementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameters of one (condition, scheme) computation, fixed when the store is created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet {
    /// Advection speed
    pub a: f64,
    /// Output time
    #[serde(rename = "T")]
    pub t: f64,
    /// Courant number
    #[serde(rename = "CFL")]
    pub cfl: f64,
}

/// Courant number per flux scheme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CflPolicy {
    pub default: f64,
    pub half: f64,
    pub fourth_order: f64,
}

impl Default for CflPolicy {
    fn default() -> Self {
        CflPolicy {
            default: 0.9,
            half: 0.5,
            fourth_order: 0.2,
        }
    }
}

impl CflPolicy {
    pub fn cfl(&self, scheme: FluxScheme) -> f64 {
        match scheme {
            FluxScheme::LaxWendroffFourthOrder => self.fourth_order,
            FluxScheme::FrommCflHalf | FluxScheme::FrommVanLeerCflHalf => self.half,
            FluxScheme::Upwind
            | FluxScheme::LaxFriedrichs
            | FluxScheme::LaxWendroff
            | FluxScheme::Fromm
            | FluxScheme::FrommVanLeer
            | FluxScheme::FluxCorrectedTransport => self.default,
        }
    }
}

/// Typed address of an entry in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    InitialData(InitialCondition, RefinementLevel),
    Group(InitialCondition, FluxScheme),
    Solution(InitialCondition, FluxScheme, RefinementLevel),
}

impl StoreKey {
    /// Canonical hierarchical key, e.g. `Semicircle/Fromm/k = 9`.
    pub fn canonical(&self) -> String {
        match self {
            StoreKey::InitialData(ic, k) => format!("{ic}/k = {k} initial_data"),
            StoreKey::Group(ic, scheme) => format!("{ic}/{scheme}"),
            StoreKey::Solution(ic, scheme, k) => format!("{ic}/{scheme}/k = {k}"),
        }
    }

    /// Location of the entry relative to the store root.
    pub fn relative_path(&self) -> PathBuf {
        match self {
            StoreKey::InitialData(ic, k) => {
                PathBuf::from(ic.name()).join(format!("k = {k} initial_data.csv"))
            }
            StoreKey::Group(ic, scheme) => PathBuf::from(ic.name()).join(scheme.name()),
            StoreKey::Solution(ic, scheme, k) => PathBuf::from(ic.name())
                .join(scheme.name())
                .join(format!("k = {k}.csv")),
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}
