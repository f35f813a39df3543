#[macro_use]
extern crate approx;

use std::fs;

use nalgebra::{DMatrix, Matrix3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::rstest;

use nabor::similarity::{
    distance_metric, distance_metric_single_thread, PermutationTable, SKIPPED,
};
use nabor::{Cell, Lattice, SimilarityAnalysis, State};

fn table_for(size: usize) -> PermutationTable {
    let mut table = PermutationTable::new();
    table.ensure(size).unwrap();
    table
}

fn read_matrix(path: &str, size: usize) -> DMatrix<f64> {
    let text = fs::read_to_string(path).unwrap();
    let values: Vec<f64> = text
        .split_whitespace()
        .map(|field| field.parse().unwrap())
        .collect();
    assert_eq!(values.len(), size * size);
    DMatrix::from_row_slice(size, size, &values)
}

fn random_symmetric(size: usize, rng: &mut StdRng) -> DMatrix<f64> {
    let mut matrix = DMatrix::zeros(size, size);
    for i in 0..size {
        for j in (i + 1)..size {
            let value = rng.gen_range(1.0..2.0);
            matrix[(i, j)] = value;
            matrix[(j, i)] = value;
        }
    }
    matrix
}

#[test]
fn test_identity_pair() {
    let dm = DMatrix::<f64>::zeros(8, 8);
    let table = table_for(8);

    let result = distance_metric(&dm, &dm, &table).unwrap();
    assert_eq!(result.distance, 0.0);
    assert_eq!(result.permutation, vec![0, 1, 2, 3, 4, 5, 6, 7]);

    let result = distance_metric_single_thread(&dm, &dm, &table).unwrap();
    assert_eq!(result.distance, 0.0);
    assert_eq!(result.permutation, vec![0, 1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn test_random_pair_single_vs_parallel() {
    let mut rng = StdRng::seed_from_u64(42);
    let dm1 = random_symmetric(8, &mut rng);
    let dm2 = random_symmetric(8, &mut rng);
    let table = table_for(8);

    let single = distance_metric_single_thread(&dm1, &dm2, &table).unwrap();
    let parallel = distance_metric(&dm1, &dm2, &table).unwrap();
    assert_relative_eq!(single.distance, parallel.distance, epsilon = 1e-7);
    assert_eq!(single.permutation, parallel.permutation);
}

#[test]
fn test_known_equivalent_pair() {
    // the fixture matrices differ only by a relabeling
    let dm1 = read_matrix("tests/assets/mat1.txt", 8);
    let dm2 = read_matrix("tests/assets/mat2.txt", 8);
    let table = table_for(8);

    let single = distance_metric_single_thread(&dm1, &dm2, &table).unwrap();
    let parallel = distance_metric(&dm1, &dm2, &table).unwrap();
    assert!(single.distance < 1e-4);
    assert_relative_eq!(single.distance, parallel.distance, epsilon = 1e-7);
}

#[rstest]
#[case(6)]
#[case(7)]
#[case(8)]
fn test_analytic_distance(#[case] size: usize) {
    // dm2 is dm1 under the reversal relabeling, shifted by one on every
    // off-diagonal entry; the minimum is sqrt(k^2 - k)
    let dm1 = DMatrix::from_fn(size, size, |i, j| {
        if i == j {
            0.0
        } else {
            ((i + 1) * (j + 1)) as f64
        }
    });
    let dm2 = DMatrix::from_fn(size, size, |i, j| {
        if i == j {
            0.0
        } else {
            ((size - i) * (size - j)) as f64 + 1.0
        }
    });
    let table = table_for(size);

    let result = distance_metric(&dm1, &dm2, &table).unwrap();
    let expected = ((size * size - size) as f64).sqrt();
    assert_relative_eq!(result.distance, expected, epsilon = 1e-10);
}

#[test]
fn test_pair_distances_symmetric_and_non_negative() {
    let cell = Cell::new(
        Lattice::new(Matrix3::identity() * 50.0),
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.5, 0.0, 0.0),
            Vector3::new(0.0, 1.7, 0.0),
            Vector3::new(0.0, 0.0, 2.0),
        ],
        vec!["Cu".to_string(); 4],
        false,
    );
    let state = State::build(cell).unwrap();
    let analysis = SimilarityAnalysis::new(&state);

    for i in 0..4 {
        assert_eq!(analysis.pair_distance[(i, i)], SKIPPED);
        for j in 0..4 {
            assert_eq!(
                analysis.pair_distance[(i, j)],
                analysis.pair_distance[(j, i)]
            );
            if i != j {
                assert!(analysis.pair_distance[(i, j)] >= 0.0);
            }
        }
    }
}

#[test]
fn test_oversize_environments_are_skipped_per_pair() {
    // a 13-fold coordinated center is refused (K > 12), while pairs among
    // the ring atoms still run
    let mut positions = vec![Vector3::new(0.0, 0.0, 0.0)];
    for step in 0..13 {
        let angle = 2.0 * std::f64::consts::PI * step as f64 / 13.0;
        positions.push(Vector3::new(angle.cos(), angle.sin(), 0.0));
    }
    let cell = Cell::new(
        Lattice::new(Matrix3::identity() * 50.0),
        positions,
        vec!["Cu".to_string(); 14],
        false,
    );
    let state = State::build(cell).unwrap();
    let analysis = SimilarityAnalysis::new(&state);

    for j in 1..14 {
        assert_eq!(analysis.pair_distance[(0, j)], SKIPPED);
    }
    assert!(analysis.pair_distance[(1, 2)] >= 0.0);
    // times are recorded for every off-diagonal pair, refused or not
    assert!(analysis.pair_time[(0, 1)] >= 0.0);
}
