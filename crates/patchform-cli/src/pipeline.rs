//! Fetch → render → update, run once per invocation.

use std::path::{Path, PathBuf};

use anyhow::Context;
use patchform_core::PatchRecord;
use patchform_sync::PatchClient;
use tracing::info;

use crate::config::Config;
use crate::report;

#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// The session exposed no patches; nothing was rendered.
    Empty,
    Rendered {
        path: PathBuf,
        records: usize,
        opened: bool,
    },
}

/// Run the pipeline. Any fetch failure stops before a report is written, and a
/// failed write stops before the update stage. `open` is handed the written
/// report unless `--no-open` is set; its result never fails the run.
pub async fn run(config: &Config, open: fn(&Path) -> bool) -> anyhow::Result<Outcome> {
    let client =
        PatchClient::new(&config.base_url, config.timeout()).context("building HTTP client")?;
    let records = client
        .fetch_patches()
        .await
        .with_context(|| format!("fetching patches from {}", client.patches_url()))?;

    if records.is_empty() {
        println!("No patches found");
        return Ok(Outcome::Empty);
    }

    let path = config.report_path()?;
    report::write_report(&path, &records).context("rendering patch report")?;
    println!("Wrote {} patches to {}", records.len(), path.display());

    let opened = !config.no_open && open(&path);
    if opened {
        println!("Results opened in web browser");
    } else {
        println!("Results saved to {}", path.display());
    }

    update(&records);

    Ok(Outcome::Rendered {
        path,
        records: records.len(),
        opened,
    })
}

/// Final stage. Nothing is written back to the session from here.
pub fn update(records: &[PatchRecord]) {
    info!(count = records.len(), "update stage: no write-back from the CLI");
}
