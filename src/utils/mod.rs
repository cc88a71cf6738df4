//! Utility functions for ytsift

pub mod humanize;
pub mod url;

pub use self::humanize::*;
pub use self::url::*;
