use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub mod events;

use crate::charts::ticks::NO_SELECTION;
use crate::charts::{
    ChartError, ChartSpec, FilteredView, build_filtered_view, build_heatmap,
    build_linked_tick_view, build_scatter_pair, build_tick_filter_chart,
};
use crate::config::{DEFAULT_DATASET, DashboardConfig, InitialWidgets};
use crate::input::{Dataset, DatasetStore, InputError, StoreConfig, load_table};
use crate::model::{Param, Selection, Value, Widget, WidgetError, WidgetState};
use crate::reactive::{Binder, PaneContent, PaneError, PaneId, SelectionBridge};
pub use events::Event;

pub const TITLE: &str = "Visualizing Single-Cell Data in Traumatic Brain Injury";
pub const INSTRUCTION: &str = "This dashboard visualizes single-cell data from a traumatic brain injury patient across three different conditions: healthy, mild, and severe. \
Additionally, data is collected at three different time points: day 1, day 3, and day 7 after hospitalization. \
The goal of this visualization is to provide an overview of cellular behavior under different conditions and time points, and to identify potential genes that play crucial roles in disease development.";
pub const EXPLORATION_HEADING: &str = "# Gene expression exploration";
pub const SELECT_GENE: &str = "Select a gene to explore its expression.";

pub const HEADING: PaneId = "heading";
pub const SCATTER: PaneId = "scatter";
pub const HEATMAP: PaneId = "heatmap";
pub const TICKS: PaneId = "ticks";
pub const FILTERED: PaneId = "filtered";

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Widget(#[from] WidgetError),
}

/// Everything the pane builders read besides widget state.
#[derive(Debug)]
pub struct DashboardData {
    pub datasets: DatasetStore,
    pub heatmaps: DatasetStore,
    pub global: Rc<Dataset>,
    /// Brush selection last propagated through the bridge.
    pub brush: RefCell<Selection>,
}

pub struct Dashboard {
    data: DashboardData,
    binder: Binder<DashboardData>,
    bridge: SelectionBridge,
    dataset_names: Vec<String>,
}

impl Dashboard {
    /// Loads the global table and lists datasets; both are mandatory.
    pub fn open(config: &DashboardConfig) -> Result<Dashboard, DashboardError> {
        let global = Rc::new(load_table(&config.global_table)?);
        tracing::info!(
            path = %config.global_table.display(),
            rows = global.n_rows(),
            genes = global.numeric_column_names().len(),
            "global table loaded"
        );

        let datasets = DatasetStore::new(StoreConfig {
            dir: config.single_level_dir.clone(),
            cache: config.cache,
        });
        let heatmaps = DatasetStore::new(StoreConfig {
            dir: config.heatmap_dir.clone(),
            cache: config.cache,
        });
        let dataset_names = datasets.names()?;
        if dataset_names.is_empty() {
            tracing::warn!(dir = %datasets.dir().display(), "no datasets found");
        }

        let state = build_widgets(&config.initial, &dataset_names, &global)?;
        let data = DashboardData {
            datasets,
            heatmaps,
            global,
            brush: RefCell::new(Selection::default()),
        };
        let mut binder = Binder::new(state);
        bind_panes(&mut binder, &data);

        Ok(Dashboard {
            data,
            binder,
            bridge: SelectionBridge::new(config.debounce),
            dataset_names,
        })
    }

    pub fn apply(&mut self, event: Event) -> Result<Vec<PaneId>, WidgetError> {
        match event {
            Event::Widget { param, value } => self.set_widget(param, value),
            Event::Brush { selection, at_ms } => {
                let now = Duration::from_millis(at_ms);
                self.brush(selection, now);
                Ok(self.tick(now))
            }
            Event::Tick { at_ms } => Ok(self.tick(Duration::from_millis(at_ms))),
        }
    }

    pub fn set_widget(&mut self, param: Param, value: Value) -> Result<Vec<PaneId>, WidgetError> {
        let value = self.binder.state().normalize(param, value)?;
        if param == Param::Gene && self.binder.state().get(Param::Gene) != Some(&value) {
            // The tick chart is rebuilt, so its brush no longer exists.
            self.bridge.reset();
            self.data.brush.replace(Selection::default());
        }
        self.binder.set(&self.data, param, value)
    }

    /// Queues a brush selection from the tick chart.
    pub fn brush(&mut self, selection: Selection, now: Duration) {
        if self.binder.content(TICKS).and_then(PaneContent::chart).is_none() {
            tracing::warn!("brush event without a tick chart; ignored");
            return;
        }
        self.bridge.push(selection, now);
    }

    /// Advances the clock; rebuilds the filtered view when a debounced
    /// selection comes through.
    pub fn tick(&mut self, now: Duration) -> Vec<PaneId> {
        let Some(selection) = self.bridge.poll(now) else {
            return Vec::new();
        };
        self.data.brush.replace(selection);
        self.binder.refresh(&self.data, FILTERED);
        vec![FILTERED]
    }

    /// Flushes any pending selection regardless of the debounce window.
    pub fn settle(&mut self) -> Vec<PaneId> {
        self.tick(Duration::MAX)
    }

    pub fn pane(&self, pane: PaneId) -> Option<&PaneContent> {
        self.binder.content(pane)
    }

    pub fn panes(&self) -> impl Iterator<Item = (PaneId, &PaneContent)> {
        self.binder.panes()
    }

    pub fn recomputations(&self, pane: PaneId) -> u64 {
        self.binder.recomputations(pane)
    }

    pub fn dependents(&self, param: Param) -> Vec<PaneId> {
        self.binder.dependents(param)
    }

    pub fn state(&self) -> &WidgetState {
        self.binder.state()
    }

    pub fn dataset_names(&self) -> &[String] {
        &self.dataset_names
    }

    pub fn suggest_genes(&self, query: &str) -> Vec<&str> {
        self.binder
            .state()
            .widget(Param::Gene)
            .map(|w| w.suggest(query))
            .unwrap_or_default()
    }

    /// Tick chart and filtered view as one spec that links the brush in the
    /// browser, seeded with the last propagated selection. `None` while the
    /// ticks pane holds no chart.
    pub fn linked_ticks(&self) -> Option<ChartSpec> {
        self.binder.content(TICKS)?.chart()?;
        let gene = self.binder.state().str(Param::Gene).ok()?;
        match build_linked_tick_view(&self.data.global, gene, &self.data.brush.borrow()) {
            Ok(spec) => Some(spec),
            Err(err) => {
                tracing::warn!(gene, error = %err, "linked tick view unavailable");
                None
            }
        }
    }
}

/// Autocomplete over the global table's plottable (numeric) columns.
pub fn gene_widget(global: &Dataset) -> Widget {
    Widget::Autocomplete {
        label: "Selected Gene".to_string(),
        options: global.numeric_column_names(),
        case_sensitive: false,
    }
}

fn build_widgets(
    initial: &InitialWidgets,
    names: &[String],
    global: &Dataset,
) -> Result<WidgetState, WidgetError> {
    let dataset = pick_initial_dataset(initial.dataset.as_deref(), names);
    let mut state = WidgetState::new();
    state.register(
        Param::Dataset,
        Widget::Select {
            label: "Cell Type".to_string(),
            options: names.to_vec(),
        },
        Value::Str(dataset),
    )?;
    state.register(
        Param::CircleSize,
        Widget::FloatSlider {
            label: "Size".to_string(),
            start: 10.0,
            end: 100.0,
        },
        Value::Float(initial.circle_size),
    )?;
    state.register(
        Param::Opacity,
        Widget::FloatSlider {
            label: "Opacity".to_string(),
            start: 0.1,
            end: 1.0,
        },
        Value::Float(initial.opacity),
    )?;
    state.register(
        Param::GeneCount,
        Widget::IntSlider {
            label: "Number of Genes".to_string(),
            start: 1,
            end: 50,
        },
        Value::Int(initial.gene_count),
    )?;
    state.register(
        Param::Gene,
        gene_widget(global),
        Value::Str(initial.gene.clone().unwrap_or_default()),
    )?;
    Ok(state)
}

fn pick_initial_dataset(requested: Option<&str>, names: &[String]) -> String {
    if let Some(name) = requested {
        if names.iter().any(|n| n == name) {
            return name.to_string();
        }
        tracing::warn!(requested = name, "requested dataset not available");
    }
    names
        .iter()
        .find(|n| n.as_str() == DEFAULT_DATASET)
        .or_else(|| names.first())
        .cloned()
        .unwrap_or_default()
}

fn bind_panes(binder: &mut Binder<DashboardData>, data: &DashboardData) {
    binder.bind(data, HEADING, &[Param::Dataset], |_, s| {
        Ok(PaneContent::Markdown(format!(
            "# General property of {}",
            s.str(Param::Dataset)?
        )))
    });

    binder.bind(
        data,
        SCATTER,
        &[Param::Dataset, Param::CircleSize, Param::Opacity],
        |d, s| {
            let dataset = d.datasets.load(s.str(Param::Dataset)?)?;
            let pair = build_scatter_pair(
                &dataset,
                s.float(Param::CircleSize)?,
                s.float(Param::Opacity)?,
            )?;
            Ok(PaneContent::Chart(pair.combined().clone()))
        },
    );

    binder.bind(
        data,
        HEATMAP,
        &[Param::GeneCount, Param::Dataset],
        |d, s| {
            let table = d.heatmaps.load(s.str(Param::Dataset)?)?;
            let n = s.int(Param::GeneCount)?;
            let n = usize::try_from(n).map_err(|_| ChartError::InvalidParameter {
                name: "gene count",
                reason: format!("{n} is negative"),
            })?;
            Ok(PaneContent::Chart(build_heatmap(&table, n)?))
        },
    );

    binder.bind(data, TICKS, &[Param::Gene], |d, s| {
        let gene = s.str(Param::Gene)?;
        if gene.is_empty() {
            return Ok(PaneContent::Placeholder(SELECT_GENE.to_string()));
        }
        Ok(PaneContent::Chart(build_tick_filter_chart(&d.global, gene)?))
    });

    binder.bind(data, FILTERED, &[Param::Gene], filtered_pane);
}

fn filtered_pane(d: &DashboardData, s: &WidgetState) -> Result<PaneContent, PaneError> {
    let gene = s.str(Param::Gene)?;
    let selection = d.brush.borrow();
    if gene.is_empty() || selection.is_empty() {
        return Ok(PaneContent::Placeholder(NO_SELECTION.to_string()));
    }
    Ok(match build_filtered_view(&d.global, &selection, gene)? {
        FilteredView::Chart(spec) => PaneContent::Chart(spec),
        FilteredView::NoSelection => PaneContent::Placeholder(NO_SELECTION.to_string()),
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/dashboard/tests.rs"]
mod tests;
