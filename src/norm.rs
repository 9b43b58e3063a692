//! Discrete grid norms of a vector sampled on a uniform grid of spacing `h = 1/len`.

extern crate nalgebra as na;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormKind {
    /// `h Σ |x_i|`
    L1,
    /// `sqrt(h Σ x_i²)`
    L2,
    /// `max |x_i|`
    LInf,
}

impl NormKind {
    pub const ALL: [NormKind; 3] = [NormKind::LInf, NormKind::L1, NormKind::L2];
}

pub fn grid_norm(x: &na::DVector<f64>, kind: NormKind) -> Result<f64> {
    if x.is_empty() {
        return Err(Error::DomainError(
            "grid norm of an empty vector is undefined".to_string(),
        ));
    }
    let h = 1.0 / x.len() as f64;
    let norm = match kind {
        NormKind::LInf => x.amax(),
        NormKind::L1 => h * x.iter().map(|v| v.abs()).sum::<f64>(),
        NormKind::L2 => (h * x.dot(x)).sqrt(),
    };
    Ok(norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn vector(values: &[f64]) -> na::DVector<f64> {
        na::DVector::from_column_slice(values)
    }

    #[test]
    fn sup_norm() {
        assert_eq!(grid_norm(&vector(&[1.0, -3.0, 2.0]), NormKind::LInf).unwrap(), 3.0);
    }

    #[test]
    fn one_norm() {
        let norm = grid_norm(&vector(&[1.0, 1.0, 1.0]), NormKind::L1).unwrap();
        assert!((norm - 1.0).abs() < 1e-15);
    }

    #[test]
    fn two_norm() {
        let norm = grid_norm(&vector(&[3.0, 4.0]), NormKind::L2).unwrap();
        assert!((norm - 12.5_f64.sqrt()).abs() < 1e-15);
    }

    #[test]
    fn empty_input_is_a_domain_error() {
        let empty = na::DVector::<f64>::zeros(0);
        for kind in NormKind::ALL {
            assert!(matches!(grid_norm(&empty, kind), Err(Error::DomainError(_))));
        }
    }

    proptest! {
        #[test]
        fn norms_are_ordered(values in proptest::collection::vec(-100.0f64..100.0, 1..64)) {
            let x = vector(&values);
            let one = grid_norm(&x, NormKind::L1).unwrap();
            let two = grid_norm(&x, NormKind::L2).unwrap();
            let sup = grid_norm(&x, NormKind::LInf).unwrap();
            // h = 1/M makes the grid a probability measure: L1 <= L2 <= Linf.
            prop_assert!(one <= two + 1e-9);
            prop_assert!(two <= sup + 1e-9);
        }

        #[test]
        fn constant_vectors_have_equal_norms(c in -10.0f64..10.0, len in 1usize..128) {
            let x = na::DVector::from_element(len, c);
            for kind in NormKind::ALL {
                prop_assert!((grid_norm(&x, kind).unwrap() - c.abs()).abs() < 1e-9);
            }
        }
    }
}
