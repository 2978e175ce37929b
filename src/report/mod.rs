use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

pub mod html;

use crate::dashboard::Dashboard;
use crate::model::{Param, Value};
use crate::reactive::PaneContent;

pub const PAGE_FILE: &str = "dashboard.html";
pub const STATE_FILE: &str = "state.json";
pub const SPECS_DIR: &str = "specs";
/// Spec file for the browser-linked tick chart and filtered view.
pub const LINKED_SPEC: &str = "ticks_linked";

/// Page extras that are not part of the dashboard state.
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    /// Copied next to the page and shown in the sidebar.
    pub sidebar_image: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaneSummary {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub recomputations: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateSummary {
    pub tool: String,
    pub version: String,
    pub datasets: Vec<String>,
    pub widgets: BTreeMap<String, Value>,
    /// Panes recomputed when each widget changes.
    pub dependencies: BTreeMap<String, Vec<String>>,
    pub panes: BTreeMap<String, PaneSummary>,
}

pub fn build_summary(dash: &Dashboard) -> StateSummary {
    let widgets = dash
        .state()
        .iter()
        .map(|(param, _, value)| (param.key().to_string(), value.clone()))
        .collect();
    let dependencies = Param::ALL
        .into_iter()
        .map(|param| {
            let panes = dash.dependents(param).into_iter().map(str::to_string).collect();
            (param.key().to_string(), panes)
        })
        .collect();
    let panes = dash
        .panes()
        .map(|(pane, content)| {
            let (kind, spec, text) = match content {
                PaneContent::Chart(_) => ("chart", Some(spec_file_name(pane)), None),
                PaneContent::Markdown(t) => ("markdown", None, Some(t.clone())),
                PaneContent::Placeholder(t) => ("placeholder", None, Some(t.clone())),
                PaneContent::Error(t) => ("error", None, Some(t.clone())),
            };
            (
                pane.to_string(),
                PaneSummary {
                    kind,
                    spec,
                    text,
                    recomputations: dash.recomputations(pane),
                },
            )
        })
        .collect();
    StateSummary {
        tool: "kira-scdash".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        datasets: dash.dataset_names().to_vec(),
        widgets,
        dependencies,
        panes,
    }
}

fn spec_file_name(pane: &str) -> String {
    format!("{SPECS_DIR}/{pane}.json")
}

fn write_spec<T: Serialize>(path: &Path, spec: &T) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut w, spec)?;
    w.flush()
}

/// Copies the sidebar image next to the page. A missing image is logged and
/// left out rather than failing the render.
fn copy_sidebar_image(image: &Path, out_dir: &Path) -> std::io::Result<Option<String>> {
    let Some(file_name) = image.file_name() else {
        tracing::warn!(path = %image.display(), "sidebar image has no file name; skipped");
        return Ok(None);
    };
    if !image.is_file() {
        tracing::warn!(path = %image.display(), "sidebar image not found; skipped");
        return Ok(None);
    }
    let target = out_dir.join(file_name);
    if fs::canonicalize(image)? != fs::canonicalize(out_dir)?.join(file_name) {
        fs::copy(image, &target)?;
    }
    Ok(Some(file_name.to_string_lossy().into_owned()))
}

/// Writes the page, the widget/pane summary and one spec file per chart.
pub fn write_outputs(
    dash: &Dashboard,
    out_dir: &Path,
    options: &PageOptions,
) -> std::io::Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir.join(SPECS_DIR))?;
    let mut written = Vec::new();

    for (pane, content) in dash.panes() {
        match content {
            PaneContent::Chart(spec) => {
                let path = out_dir.join(spec_file_name(pane));
                write_spec(&path, spec)?;
                written.push(path);
            }
            PaneContent::Error(reason) => {
                tracing::warn!(pane, reason = reason.as_str(), "pane written as unavailable");
            }
            PaneContent::Markdown(_) | PaneContent::Placeholder(_) => {}
        }
    }
    if let Some(spec) = dash.linked_ticks() {
        let path = out_dir.join(spec_file_name(LINKED_SPEC));
        write_spec(&path, &spec)?;
        written.push(path);
    }

    let image = match &options.sidebar_image {
        Some(image) => copy_sidebar_image(image, out_dir)?,
        None => None,
    };
    if let Some(name) = &image {
        written.push(out_dir.join(name));
    }

    let state_path = out_dir.join(STATE_FILE);
    let mut w = BufWriter::new(File::create(&state_path)?);
    serde_json::to_writer_pretty(&mut w, &build_summary(dash))?;
    w.flush()?;
    written.push(state_path);

    let page_path = out_dir.join(PAGE_FILE);
    fs::write(&page_path, html::render_page(dash, image.as_deref()))?;
    written.push(page_path);

    tracing::info!(out = %out_dir.display(), files = written.len(), "dashboard written");
    Ok(written)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
