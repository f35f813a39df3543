mod analysis;
mod metric;
mod permutation;

pub use analysis::{SimilarityAnalysis, SKIPPED};
pub use metric::{
    distance_metric, distance_metric_single_thread, squared_distances_batch, MetricResult,
};
pub use permutation::{PermutationStream, PermutationTable, MAX_PERMUTATION_SIZE};
