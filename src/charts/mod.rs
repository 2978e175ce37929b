use serde::Serialize;
use serde_json::{Value, json};

pub mod filter;
pub mod heatmap;
pub mod scatter;
pub mod ticks;

pub use filter::Predicate;
pub use heatmap::build_heatmap;
pub use scatter::build_scatter_pair;
pub use ticks::{
    FilteredView, build_filtered_view, build_linked_tick_view, build_tick_filter_chart,
};

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChartError {
    #[error("unknown column {column} in {table}")]
    UnknownColumn { column: String, table: String },
    #[error("column {column} in {table} is not numeric")]
    NotNumeric { column: String, table: String },
    #[error("invalid constraint on {column}: {reason}")]
    InvalidConstraint { column: String, reason: String },
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Declarative Vega-Lite chart description. Built fresh per recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChartSpec(Value);

impl ChartSpec {
    /// Wraps a view definition with the schema and the dashboard theme.
    pub fn new(mut body: Value) -> ChartSpec {
        if let Value::Object(map) = &mut body {
            map.insert("$schema".to_string(), json!(VEGA_LITE_SCHEMA));
            let config = map.entry("config").or_insert_with(|| json!({}));
            merge(config, theme_config());
        }
        ChartSpec(body)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    /// Looks up a nested node by JSON pointer, e.g. `/encoding/x/field`.
    #[cfg(test)]
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.0.pointer(pointer)
    }
}

fn theme_config() -> Value {
    let title = json!({
        "font": "Arial",
        "fontSize": 20,
        "fontWeight": "bold",
        "color": "black"
    });
    let guide = json!({
        "labelFont": "Arial",
        "labelFontSize": 15,
        "titleFont": "Arial",
        "titleFontSize": 18,
        "titleFontWeight": "bold",
        "titleColor": "black"
    });
    json!({
        "background": "transparent",
        "title": title,
        "axis": guide.clone(),
        "legend": guide
    })
}

// Keys already present in `dst` win.
fn merge(dst: &mut Value, src: Value) {
    if let (Value::Object(dst), Value::Object(src)) = (dst, src) {
        for (key, value) in src {
            dst.entry(key).or_insert(value);
        }
    }
}

pub(crate) fn require_column<'a>(
    table: &'a crate::input::Dataset,
    column: &str,
) -> Result<&'a crate::input::Column, ChartError> {
    table.column(column).ok_or_else(|| ChartError::UnknownColumn {
        column: column.to_string(),
        table: table.name().to_string(),
    })
}

pub(crate) fn require_numeric<'a>(
    table: &'a crate::input::Dataset,
    column: &str,
) -> Result<&'a [f64], ChartError> {
    require_column(table, column)?;
    table.numeric(column).ok_or_else(|| ChartError::NotNumeric {
        column: column.to_string(),
        table: table.name().to_string(),
    })
}

/// Inline records restricted to `columns`.
pub(crate) fn records_of(
    table: &crate::input::Dataset,
    columns: &[&str],
) -> Result<Vec<Value>, ChartError> {
    let mut cols = Vec::with_capacity(columns.len());
    for &name in columns {
        cols.push((name, require_column(table, name)?));
    }
    Ok((0..table.n_rows())
        .map(|row| {
            let mut obj = serde_json::Map::with_capacity(cols.len());
            for (name, col) in &cols {
                obj.insert(name.to_string(), col.value_json(row));
            }
            Value::Object(obj)
        })
        .collect())
}
