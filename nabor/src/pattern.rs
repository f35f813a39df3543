mod library;

pub use library::{Pattern, PatternLibrary, UNKNOWN_KEY};
