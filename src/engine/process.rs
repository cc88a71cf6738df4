//! Engine that runs an external yt-dlp compatible executable

use crate::engine::ExtractionEngine;
use crate::error::SiftError;
use crate::utils::url::VideoTarget;
use crate::Result;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Runs `<program> <extra args> --dump-single-json --no-warnings <watch url>`
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    program: String,
    extra_args: Vec<String>,
    timeout: Duration,
}

impl ProcessEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Arguments placed before the engine's own flags
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, target: &VideoTarget) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.extra_args)
            .arg("--dump-single-json")
            .arg("--no-warnings")
            .arg(target.watch_url())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

impl Default for ProcessEngine {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

#[async_trait::async_trait]
impl ExtractionEngine for ProcessEngine {
    fn name(&self) -> &str {
        &self.program
    }

    async fn fetch(&self, target: &VideoTarget) -> Result<String> {
        info!("Running {} for video {}", self.program, target.id);
        let mut command = self.command(target);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("{} did not finish within {:?}", self.program, self.timeout);
                return Err(SiftError::EngineTimeout(self.timeout));
            }
        };

        if !output.status.success() {
            return Err(SiftError::EngineFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!("{} produced {} bytes", self.program, output.stdout.len());
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
