//! HTML patch form.
//!
//! Renders patch records as a four-column table with one input widget per
//! row, picked by field kind. The page references `patch_handler.js` by
//! relative name; that script is not produced here.

use std::io;
use std::path::{Path, PathBuf};

use html_escape::{encode_double_quoted_attribute, encode_text};
use patchform_core::{FieldValue, PatchRecord, SliderBounds};
use thiserror::Error;
use tracing::{info, warn};

pub const REPORT_FILE: &str = "patch_results.html";
pub const HANDLER_SCRIPT: &str = "patch_handler.js";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot locate the executable directory: {0}")]
    ExeLocation(#[source] io::Error),

    #[error("failed to write report to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ── Public API ──

/// `patch_results.html` in the directory holding the running executable.
pub fn default_report_path() -> Result<PathBuf, RenderError> {
    let exe = std::env::current_exe().map_err(RenderError::ExeLocation)?;
    let dir = exe.parent().ok_or_else(|| {
        RenderError::ExeLocation(io::Error::new(
            io::ErrorKind::NotFound,
            "executable path has no parent directory",
        ))
    })?;
    Ok(dir.join(REPORT_FILE))
}

/// Render the full HTML document. Same records in, same bytes out.
pub fn render_document(records: &[PatchRecord]) -> String {
    let rows: String = records.iter().map(render_row).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Patch Results</title>
    <style>{css}</style>
</head>
<body>
    <h1>Patch Results</h1>
    <table>
        <tr>
            <th>Address</th>
            <th>Field Name</th>
            <th>Field Type</th>
            <th>Value</th>
        </tr>
{rows}    </table>
    <script src="{script}"></script>
</body>
</html>
"#,
        css = inline_css(),
        rows = rows,
        script = HANDLER_SCRIPT,
    )
}

/// Render `records` and write them to `path`, replacing any previous report.
pub fn write_report(path: &Path, records: &[PatchRecord]) -> Result<(), RenderError> {
    let html = render_document(records);
    std::fs::write(path, html).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), rows = records.len(), "wrote patch report");
    Ok(())
}

/// Open `path` in the system browser. Failure is logged and reported as `false`.
pub fn open_in_browser(path: &Path) -> bool {
    match webbrowser::open(&path.to_string_lossy()) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not open browser");
            false
        }
    }
}

// ── Rows ──

fn render_row(record: &PatchRecord) -> String {
    format!(
        "        <tr>
            <td{uid}>{address}</td>
            <td>{label}</td>
            <td>{kind}</td>
            {cell}
        </tr>
",
        uid = record
            .uid
            .as_deref()
            .map(|uid| format!(r#" data-uid="{}""#, encode_double_quoted_attribute(uid)))
            .unwrap_or_default(),
        address = encode_text(&record.address),
        label = encode_text(record.label()),
        kind = encode_text(record.type_name()),
        cell = render_value_cell(&record.address, &record.field),
    )
}

fn render_value_cell(address: &str, field: &FieldValue) -> String {
    let name = encode_double_quoted_attribute(address);
    match field {
        FieldValue::String { value, options } => {
            // The stored value is always selectable, even when it is not advertised.
            let current = value.iter().map(|v| {
                format!(
                    r#"<option value="{}" selected>{}</option>"#,
                    encode_double_quoted_attribute(v),
                    encode_text(v),
                )
            });
            let advertised = options.iter().map(|o| {
                format!(
                    r#"<option value="{}">{}</option>"#,
                    encode_double_quoted_attribute(o),
                    encode_text(o),
                )
            });
            let choices: String = current.chain(advertised).collect();
            format!(r#"<td><select name="{name}">{choices}</select></td>"#)
        }
        FieldValue::Float { value, bounds } => {
            let SliderBounds { min, max, step } = bounds;
            format!(
                r#"<td><input type="range" name="{name}"{}{}{}{} oninput="this.nextElementSibling.textContent=this.value"><span>{}</span></td>"#,
                number_attr("min", *min),
                number_attr("max", *max),
                number_attr("value", *value),
                number_attr("step", *step),
                value.map(|v| v.to_string()).unwrap_or_default(),
            )
        }
        FieldValue::Resource { uid } => format!(
            r#"<td><input type="text" name="{name}" value="{}"></td>"#,
            encode_double_quoted_attribute(uid.as_deref().unwrap_or_default()),
        ),
        FieldValue::Other { .. } => "<td>null</td>".to_string(),
    }
}

/// ` name="value"`, or nothing when the value is absent so the browser default applies.
fn number_attr(name: &str, value: Option<f64>) -> String {
    value
        .map(|v| format!(r#" {name}="{v}""#))
        .unwrap_or_default()
}

fn inline_css() -> &'static str {
    r#"
        body {
            font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
            margin: 2rem;
        }
        table {
            border-collapse: collapse;
            width: 100%;
            margin: 20px 0;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 8px;
            text-align: left;
        }
        th {
            background-color: #f2f2f2;
        }
        tr:nth-child(even) {
            background-color: #f9f9f9;
        }
    "#
}
