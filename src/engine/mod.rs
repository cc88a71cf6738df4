//! External extraction engine and the JSON document it produces

pub mod document;
pub mod file;
pub mod process;

pub use document::*;
pub use file::*;
pub use process::*;

use crate::utils::url::VideoTarget;
use crate::Result;

/// Produces the raw extraction document for one video
#[async_trait::async_trait]
pub trait ExtractionEngine: Send + Sync {
    /// Name of the engine (for logging)
    fn name(&self) -> &str;

    /// Fetch the engine's JSON output for `target`
    async fn fetch(&self, target: &VideoTarget) -> Result<String>;
}
