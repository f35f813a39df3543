use nalgebra::DMatrix;
use rayon::prelude::*;

use super::permutation::{PermutationStream, PermutationTable, MAX_PERMUTATION_SIZE};
use crate::base::NaborError;

/// Number of permutations a worker evaluates per scheduling unit
const CHUNK_PERMUTATIONS: u64 = 5_040;

#[derive(Debug, Clone, PartialEq)]
/// Outcome of one permutation-invariant distance minimization
pub struct MetricResult {
    /// `sqrt(min_sigma f(sigma))` over all relabelings of the smaller matrix
    pub distance: f64,
    /// A relabeling realizing the minimum; lowest lexicographic index on ties
    pub permutation: Vec<u8>,
}

/// Minimize the Frobenius mismatch between two symmetric zero-diagonal local
/// distance matrices over all relabelings of the smaller one, enumerating the
/// full permutation table for the common embedding size.
///
/// Fails with `Unsupported` when the embedding size exceeds
/// [`MAX_PERMUTATION_SIZE`].
pub fn distance_metric(
    dm1: &DMatrix<f64>,
    dm2: &DMatrix<f64>,
    table: &PermutationTable,
) -> Result<MetricResult, NaborError> {
    let (larger, smaller, size) = canonicalize(dm1, dm2)?;
    if size == 0 {
        return Ok(MetricResult {
            distance: 0.0,
            permutation: Vec::new(),
        });
    }

    let total = PermutationTable::count(size);
    let (lowest, index) = if let Some(flat) = table.flat(size) {
        // table-driven: contiguous chunks of the materialized buffer
        flat.par_chunks(CHUNK_PERMUTATIONS as usize * size)
            .enumerate()
            .map(|(chunk, permutations)| {
                let base = chunk as u64 * CHUNK_PERMUTATIONS;
                let mut best = (f64::INFINITY, u64::MAX);
                let norms = squared_distances_batch(size, permutations, &larger, &smaller);
                for (offset, norm) in norms.into_iter().enumerate() {
                    if norm < best.0 {
                        best = (norm, base + offset as u64);
                    }
                }
                best
            })
            .reduce(|| (f64::INFINITY, u64::MAX), closer)
    } else {
        // streaming: seeded next-permutation walks over contiguous ranges
        let ranges: Vec<(u64, u64)> = (0..total)
            .step_by(CHUNK_PERMUTATIONS as usize)
            .map(|start| (start, (start + CHUNK_PERMUTATIONS).min(total)))
            .collect();
        ranges
            .into_par_iter()
            .map(|(start, stop)| {
                let mut best = (f64::INFINITY, u64::MAX);
                let mut stream = PermutationStream::new(size, start, stop);
                while let Some((index, permutation)) = stream.next() {
                    let norm = squared_distance(&larger, &smaller, permutation);
                    if norm < best.0 {
                        best = (norm, index);
                    }
                }
                best
            })
            .reduce(|| (f64::INFINITY, u64::MAX), closer)
    };

    Ok(MetricResult {
        distance: lowest.sqrt(),
        permutation: table.row(size, index),
    })
}

/// Single-threaded variant of [`distance_metric`]; ties are broken by the
/// first permutation found.
pub fn distance_metric_single_thread(
    dm1: &DMatrix<f64>,
    dm2: &DMatrix<f64>,
    table: &PermutationTable,
) -> Result<MetricResult, NaborError> {
    let (larger, smaller, size) = canonicalize(dm1, dm2)?;
    if size == 0 {
        return Ok(MetricResult {
            distance: 0.0,
            permutation: Vec::new(),
        });
    }

    let mut best = (f64::INFINITY, u64::MAX);
    let mut stream = PermutationStream::new(size, 0, PermutationTable::count(size));
    while let Some((index, permutation)) = stream.next() {
        let norm = squared_distance(&larger, &smaller, permutation);
        if norm < best.0 {
            best = (norm, index);
        }
    }

    Ok(MetricResult {
        distance: best.0.sqrt(),
        permutation: table.row(size, best.1),
    })
}

/// One squared distance per permutation in `permutations` (a flat buffer of
/// length `n * size`). This is the CPU realization of the batch kernel
/// contract an accelerator back-end has to satisfy.
pub fn squared_distances_batch(
    size: usize,
    permutations: &[u8],
    dm1: &DMatrix<f64>,
    dm2: &DMatrix<f64>,
) -> Vec<f64> {
    if size == 0 {
        return Vec::new();
    }
    permutations
        .chunks_exact(size)
        .map(|permutation| squared_distance(dm1, dm2, permutation))
        .collect()
}

/// Squared Frobenius mismatch under a fixed relabeling of the second matrix.
/// Both matrices are symmetric with zero diagonal, so twice the strict upper
/// triangle recovers the full norm.
fn squared_distance(dm1: &DMatrix<f64>, dm2: &DMatrix<f64>, permutation: &[u8]) -> f64 {
    let mut norm = 0.0;
    for i in 0..permutation.len() {
        for j in (i + 1)..permutation.len() {
            let diff = dm1[(i, j)] - dm2[(permutation[i] as usize, permutation[j] as usize)];
            norm += diff * diff;
        }
    }
    norm * 2.0
}

/// Order the pair so the larger matrix comes first and zero-pad both to the
/// common embedding size.
fn canonicalize(
    dm1: &DMatrix<f64>,
    dm2: &DMatrix<f64>,
) -> Result<(DMatrix<f64>, DMatrix<f64>, usize), NaborError> {
    let (larger, smaller) = if dm1.nrows() < dm2.nrows() {
        (dm2, dm1)
    } else {
        (dm1, dm2)
    };
    let size = larger.nrows();
    if size > MAX_PERMUTATION_SIZE {
        return Err(NaborError::Unsupported(format!(
            "local environments larger than {} atoms cannot be compared (got {})",
            MAX_PERMUTATION_SIZE, size
        )));
    }
    Ok((embed(larger, size), embed(smaller, size), size))
}

fn embed(matrix: &DMatrix<f64>, size: usize) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(size, size);
    out.view_mut((0, 0), (matrix.nrows(), matrix.ncols()))
        .copy_from(matrix);
    out
}

fn closer(a: (f64, u64), b: (f64, u64)) -> (f64, u64) {
    if b.0 < a.0 || (b.0 == a.0 && b.1 < a.1) {
        b
    } else {
        a
    }
}
