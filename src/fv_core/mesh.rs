use crate::schema::RefinementLevel;

pub trait Mesh {
    /// Sample locations of the physical values, in increasing order.
    fn physical_points(&self) -> &[f64];
}

/// Nodes `x_i = i h`, `i = 0..2^k`, of the periodic unit interval.
pub struct Mesh1d {
    nodes: Vec<f64>,
}

impl Mesh1d {
    pub fn new(level: RefinementLevel) -> Self {
        let h = level.spacing();
        Mesh1d {
            nodes: (0..level.num_points()).map(|i| i as f64 * h).collect(),
        }
    }
}

impl Mesh for Mesh1d {
    fn physical_points(&self) -> &[f64] {
        &self.nodes
    }
}
