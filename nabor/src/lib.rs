#[allow(unused_imports)]
#[macro_use]
extern crate approx;

pub mod base;
pub mod cna;
pub mod io;
pub mod pattern;
pub mod similarity;
pub mod state;

pub use crate::base::{Cell, Lattice, NaborError, Position};
pub use crate::cna::CnaAnalysis;
pub use crate::pattern::{Pattern, PatternLibrary};
pub use crate::similarity::SimilarityAnalysis;
pub use crate::state::State;
