//! Core functionality for ytsift

pub mod category;
pub mod classify;
pub mod mux;
pub mod record;
pub mod resolve;
pub mod sifter;

pub use category::*;
pub use classify::*;
pub use mux::*;
pub use record::*;
pub use resolve::*;
pub use sifter::*;
