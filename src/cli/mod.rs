//! Command-line interface for ytsift

pub mod args;
pub mod output;

pub use args::*;
pub use output::*;
