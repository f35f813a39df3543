mod analysis;
mod triplet;

pub use analysis::{fingerprint_from_adjacency, CnaAnalysis};
pub use triplet::CnaTriplet;
