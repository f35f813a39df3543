use nalgebra::base::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Representing basis vectors of a simulation cell
pub struct Lattice {
    /// basis.column(i) is the i-th basis vector
    pub basis: Matrix3<f64>,
}

impl Lattice {
    /// Create a new lattice from row basis vectors
    pub fn new(row_basis: Matrix3<f64>) -> Self {
        Self {
            basis: row_basis.transpose(),
        }
    }

    /// Return cartesian coordinates from the given fractional coordinates
    pub fn cartesian_coords(&self, fractional_coords: &Vector3<f64>) -> Vector3<f64> {
        self.basis * fractional_coords
    }

    /// Return the cartesian translation that maps the primary cell onto the
    /// replica tile (i, j, k)
    pub fn tile_translation(&self, i: i32, j: i32, k: i32) -> Vector3<f64> {
        self.basis * Vector3::new(i as f64, j as f64, k as f64)
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{matrix, Vector3};

    use super::Lattice;

    #[test]
    fn test_cartesian_coords() {
        let lattice = Lattice::new(matrix![
            2.0, 0.0, 0.0;
            0.0, 4.0, 0.0;
            0.0, 0.0, 8.0;
        ]);
        assert_relative_eq!(
            lattice.cartesian_coords(&Vector3::new(0.5, 0.5, 0.25)),
            Vector3::new(1.0, 2.0, 2.0)
        );
    }

    #[test]
    fn test_tile_translation() {
        // rows are basis vectors, so the translation is basis^T * (i, j, k)
        let lattice = Lattice::new(matrix![
            1.0, 2.0, 0.0;
            0.0, 3.0, 0.0;
            0.0, 0.0, 5.0;
        ]);
        assert_relative_eq!(
            lattice.tile_translation(1, -1, 0),
            Vector3::new(1.0, -1.0, 0.0)
        );
    }
}
