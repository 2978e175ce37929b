mod charts;
mod config;
mod dashboard;
mod input;
mod logging;
mod model;
mod reactive;
mod report;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{DashboardConfig, InitialWidgets};
use crate::dashboard::events::{EventError, parse_events};
use crate::dashboard::{Dashboard, DashboardError, gene_widget};
use crate::input::{DatasetStore, InputError, StoreConfig, load_table};
use crate::model::{Selection, WidgetError};
use crate::report::PageOptions;

#[derive(Debug, Parser)]
#[command(name = "kira-scdash", version, about = "Single-cell TBI dashboard renderer")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List dataset names found in the single-level directory.
    Datasets {
        #[arg(long)]
        single_level: PathBuf,
    },
    /// List genes in the global table matching a query (case-insensitive).
    Genes {
        #[arg(long)]
        global: PathBuf,
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Render the dashboard for one set of widget values.
    Render {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        widgets: WidgetArgs,
        #[command(flatten)]
        page: PageArgs,
        /// JSON object mapping column names to brushed values.
        #[arg(long)]
        brush: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Apply a JSON-lines event script, then render the final state.
    Replay {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        widgets: WidgetArgs,
        #[command(flatten)]
        page: PageArgs,
        #[arg(long)]
        events: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct PageArgs {
    /// Image shown in the sidebar under the instructions.
    #[arg(long)]
    sidebar_image: Option<PathBuf>,
}

impl PageArgs {
    fn options(&self) -> PageOptions {
        PageOptions {
            sidebar_image: self.sidebar_image.clone(),
        }
    }
}

#[derive(Debug, Clone, Args)]
struct DataArgs {
    /// Directory with one table per cell type.
    #[arg(long)]
    single_level: PathBuf,
    /// Directory with heatmap tables keyed by cell type.
    #[arg(long)]
    heatmap: PathBuf,
    /// Table with gene columns plus condition and time.
    #[arg(long)]
    global: PathBuf,
    /// Quiet period before a brush selection propagates.
    #[arg(long, default_value_t = 10)]
    debounce_ms: u64,
    /// Reload tables on every change instead of memoising them.
    #[arg(long)]
    no_cache: bool,
}

#[derive(Debug, Clone, Args)]
struct WidgetArgs {
    #[arg(long)]
    dataset: Option<String>,
    #[arg(long, default_value_t = 20.0)]
    size: f64,
    #[arg(long, default_value_t = 0.8)]
    opacity: f64,
    #[arg(long, default_value_t = 20)]
    genes: i64,
    #[arg(long)]
    gene: Option<String>,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Dashboard(#[from] DashboardError),
    #[error(transparent)]
    Widget(#[from] WidgetError),
    #[error(transparent)]
    Events(#[from] EventError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid brush selection: {0}")]
    Brush(#[from] serde_json::Error),
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    if let Err(err) = run(cli.command) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), AppError> {
    match command {
        Command::Datasets { single_level } => {
            let store = DatasetStore::new(StoreConfig::new(single_level));
            for name in store.names()? {
                println!("{name}");
            }
            Ok(())
        }
        Command::Genes { global, query } => {
            let table = load_table(&global)?;
            for gene in gene_widget(&table).suggest(&query) {
                println!("{gene}");
            }
            Ok(())
        }
        Command::Render {
            data,
            widgets,
            page,
            brush,
            out,
        } => {
            let mut dash = Dashboard::open(&build_config(&data, &widgets))?;
            if let Some(path) = brush {
                let selection: Selection = serde_json::from_reader(BufReader::new(File::open(path)?))?;
                dash.brush(selection, Duration::ZERO);
                dash.settle();
            }
            report::write_outputs(&dash, &out, &page.options())?;
            Ok(())
        }
        Command::Replay {
            data,
            widgets,
            page,
            events,
            out,
        } => {
            let mut dash = Dashboard::open(&build_config(&data, &widgets))?;
            let events = parse_events(BufReader::new(File::open(events)?))?;
            tracing::info!(count = events.len(), "replaying events");
            for (idx, event) in events.into_iter().enumerate() {
                match dash.apply(event) {
                    Ok(panes) if !panes.is_empty() => {
                        tracing::info!(event = idx + 1, panes = ?panes, "panes refreshed")
                    }
                    Ok(_) => {}
                    Err(err) => tracing::warn!(event = idx + 1, error = %err, "event rejected"),
                }
            }
            dash.settle();
            report::write_outputs(&dash, &out, &page.options())?;
            Ok(())
        }
    }
}

fn build_config(data: &DataArgs, widgets: &WidgetArgs) -> DashboardConfig {
    let mut config = DashboardConfig::new(&data.single_level, &data.heatmap, &data.global);
    config.cache = !data.no_cache;
    config.debounce = Duration::from_millis(data.debounce_ms);
    config.initial = InitialWidgets {
        dataset: widgets.dataset.clone(),
        circle_size: widgets.size,
        opacity: widgets.opacity,
        gene_count: widgets.genes,
        gene: widgets.gene.clone(),
    };
    config
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
