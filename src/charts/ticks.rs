use serde_json::{Value, json};

use crate::charts::{ChartError, ChartSpec, Predicate, records_of, require_column, require_numeric};
use crate::input::Dataset;
use crate::model::Selection;

pub const BRUSH: &str = "brush";
pub const CONDITION_COLUMN: &str = "condition";
pub const TIME_COLUMN: &str = "time";

pub const TIME_DOMAIN: [&str; 4] = ["day0", "day1", "day3", "day7"];
pub const TIME_RANGE: [&str; 4] = ["#93c4c1", "#77b472", "#f4d15b", "#c094b5"];

pub const NO_SELECTION: &str = "## No selection";

const WIDTH: u32 = 600;
const HEIGHT: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum FilteredView {
    Chart(ChartSpec),
    NoSelection,
}

/// One tick per row at the gene's expression, grouped by condition, with an
/// interval brush attached.
pub fn build_tick_filter_chart(table: &Dataset, gene: &str) -> Result<ChartSpec, ChartError> {
    require_numeric(table, gene)?;
    require_column(table, CONDITION_COLUMN)?;
    let values = records_of(table, &[gene, CONDITION_COLUMN])?;
    let mut body = condition_ticks(gene, brush_param(None));
    body["data"] = json!({ "values": values });
    Ok(ChartSpec::new(body))
}

/// Rows of `table` inside `selection`, as ticks coloured by time point.
pub fn build_filtered_view(
    table: &Dataset,
    selection: &Selection,
    gene: &str,
) -> Result<FilteredView, ChartError> {
    if selection.is_empty() {
        return Ok(FilteredView::NoSelection);
    }
    require_numeric(table, gene)?;
    let predicate = Predicate::build(selection, table)?;
    let filtered = predicate.apply(table)?;
    tracing::debug!(
        table = table.name(),
        kept = filtered.n_rows(),
        total = table.n_rows(),
        "selection applied"
    );

    let values = records_of(&filtered, &[gene, CONDITION_COLUMN, TIME_COLUMN])?;
    let mut body = time_ticks(gene);
    body["data"] = json!({ "values": values });
    Ok(FilteredView::Chart(ChartSpec::new(body)))
}

/// The tick chart stacked over its filtered view, for the browser. The lower
/// view keeps only rows inside `brush`, so it follows the brush without a
/// round trip. A range on `gene` in `initial` seeds the brush.
pub fn build_linked_tick_view(
    table: &Dataset,
    gene: &str,
    initial: &Selection,
) -> Result<ChartSpec, ChartError> {
    require_numeric(table, gene)?;
    let values = records_of(table, &[gene, CONDITION_COLUMN, TIME_COLUMN])?;

    let mut filtered = time_ticks(gene);
    filtered["transform"] = json!([{ "filter": { "param": BRUSH, "empty": false } }]);
    Ok(ChartSpec::new(json!({
        "data": { "values": values },
        "vconcat": [
            condition_ticks(gene, brush_param(seed_range(initial, gene))),
            filtered
        ]
    })))
}

fn brush_param(seed: Option<(f64, f64)>) -> Value {
    let mut param = json!({
        "name": BRUSH,
        "select": { "type": "interval", "encodings": ["x"] }
    });
    if let Some((lo, hi)) = seed {
        param["value"] = json!({ "x": [lo, hi] });
    }
    param
}

// Only a numeric range on the gene itself maps onto the x brush.
fn seed_range(selection: &Selection, gene: &str) -> Option<(f64, f64)> {
    let values = selection.get(gene)?;
    let a = values.first()?.as_f64()?;
    let b = values.get(1)?.as_f64()?;
    Some((a.min(b), a.max(b)))
}

fn gene_axis(gene: &str) -> Value {
    json!({ "field": gene, "type": "quantitative", "scale": { "zero": false } })
}

fn condition_ticks(gene: &str, brush: Value) -> Value {
    json!({
        "params": [brush],
        "mark": "tick",
        "encoding": {
            "x": gene_axis(gene),
            "y": { "field": CONDITION_COLUMN, "type": "nominal" },
            "color": {
                "condition": { "param": BRUSH, "field": CONDITION_COLUMN, "type": "nominal" },
                "value": "lightgray"
            }
        },
        "width": WIDTH,
        "height": HEIGHT
    })
}

fn time_ticks(gene: &str) -> Value {
    json!({
        "mark": "tick",
        "encoding": {
            "x": gene_axis(gene),
            "y": { "field": TIME_COLUMN, "type": "nominal" },
            "color": {
                "field": TIME_COLUMN,
                "type": "nominal",
                "scale": { "domain": TIME_DOMAIN, "range": TIME_RANGE }
            }
        },
        "width": WIDTH,
        "height": HEIGHT
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/charts/ticks.rs"]
mod tests;
