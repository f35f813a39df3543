mod cell;
mod error;
mod lattice;

pub use cell::{Cell, Position};
pub use error::NaborError;
pub use lattice::Lattice;
