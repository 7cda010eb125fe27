//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::report::{self, RenderError};

/// Fetch the session's patch fields and open them as an editable HTML form.
#[derive(Debug, Parser)]
#[command(name = "patchform", version, about)]
pub struct Config {
    /// Base URL of the sockpuppet session API.
    #[arg(long, env = "PATCHFORM_BASE_URL", default_value = "http://127.0.0.1")]
    pub base_url: String,

    /// Seconds to wait for the patch listing before giving up.
    #[arg(
        long,
        env = "PATCHFORM_TIMEOUT",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Where to write the report. Defaults to `patch_results.html` beside the executable.
    #[arg(long, env = "PATCHFORM_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Write the report without opening a browser.
    #[arg(long)]
    pub no_open: bool,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn report_path(&self) -> Result<PathBuf, RenderError> {
        match &self.output {
            Some(path) => Ok(path.clone()),
            None => report::default_report_path(),
        }
    }
}
