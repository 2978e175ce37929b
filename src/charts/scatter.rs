use serde_json::{Map, Value, json};

use crate::charts::{ChartError, ChartSpec, require_column, require_numeric};
use crate::input::Dataset;

pub const X_FIELD: &str = "PC_condition";
pub const Y_FIELD: &str = "PC_Time";
pub const CONDITION_FIELD: &str = "Condition";
pub const TIME_FIELD: &str = "Time";

pub const SELECTOR: &str = "selector";
/// Opacity of points outside the current selection.
pub const DIM_OPACITY: f64 = 0.2;

const CONDITION_VIEW: &str = "condition_view";
const TIME_VIEW: &str = "time_view";
const WIDTH: u32 = 800;
const HEIGHT: u32 = 500;
const CONCAT_SPACING: u32 = 250;

/// Two scatter views of the same cells sharing one point selection on
/// `Condition`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPair {
    pub condition: ChartSpec,
    pub time: ChartSpec,
    combined: ChartSpec,
}

impl ScatterPair {
    /// Side-by-side rendering with the selection declared once for both views.
    pub fn combined(&self) -> &ChartSpec {
        &self.combined
    }
}

pub fn build_scatter_pair(
    dataset: &Dataset,
    size: f64,
    opacity: f64,
) -> Result<ScatterPair, ChartError> {
    if !(size.is_finite() && size > 0.0) {
        return Err(ChartError::InvalidParameter {
            name: "circle size",
            reason: format!("{size} is not a positive number"),
        });
    }
    if !(0.0..=1.0).contains(&opacity) {
        return Err(ChartError::InvalidParameter {
            name: "opacity",
            reason: format!("{opacity} is outside 0..=1"),
        });
    }
    require_numeric(dataset, X_FIELD)?;
    require_numeric(dataset, Y_FIELD)?;
    require_column(dataset, CONDITION_FIELD)?;
    require_column(dataset, TIME_FIELD)?;

    let values = dataset.records();
    let tooltip: Vec<Value> = dataset
        .column_names()
        .iter()
        .map(|name| json!({"field": name, "type": field_type(dataset, name)}))
        .collect();

    let condition_view = view(CONDITION_FIELD, "lightgrey", size, opacity, &tooltip);
    let time_view = view(TIME_FIELD, "transparent", size, opacity, &tooltip);

    let standalone = |view: &Value| {
        let mut body = view.clone();
        if let Value::Object(map) = &mut body {
            map.insert("data".into(), json!({ "values": values }));
            map.insert("params".into(), json!([selector_param(None)]));
        }
        ChartSpec::new(body)
    };
    let condition = standalone(&condition_view);
    let time = standalone(&time_view);

    let combined = ChartSpec::new(json!({
        "data": { "values": values },
        "params": [selector_param(Some(&[CONDITION_VIEW, TIME_VIEW]))],
        "hconcat": [
            named(CONDITION_VIEW, condition_view),
            named(TIME_VIEW, time_view),
        ],
        "config": { "concat": { "spacing": CONCAT_SPACING } }
    }));

    Ok(ScatterPair {
        condition,
        time,
        combined,
    })
}

fn view(color_field: &str, fallback: &str, size: f64, opacity: f64, tooltip: &[Value]) -> Value {
    json!({
        "mark": { "type": "circle", "size": size },
        "encoding": {
            "x": { "field": X_FIELD, "type": "quantitative" },
            "y": { "field": Y_FIELD, "type": "quantitative" },
            "color": {
                "condition": { "param": SELECTOR, "field": color_field, "type": "nominal" },
                "value": fallback
            },
            "opacity": {
                "condition": { "param": SELECTOR, "value": opacity },
                "value": DIM_OPACITY
            },
            "tooltip": tooltip
        },
        "width": WIDTH,
        "height": HEIGHT
    })
}

fn selector_param(views: Option<&[&str]>) -> Value {
    let mut param = Map::new();
    param.insert("name".into(), json!(SELECTOR));
    param.insert(
        "select".into(),
        json!({ "type": "point", "fields": [CONDITION_FIELD] }),
    );
    if let Some(views) = views {
        param.insert("views".into(), json!(views));
    }
    Value::Object(param)
}

fn named(name: &str, mut view: Value) -> Value {
    if let Value::Object(map) = &mut view {
        map.insert("name".into(), json!(name));
    }
    view
}

fn field_type(dataset: &Dataset, name: &str) -> &'static str {
    match dataset.column(name) {
        Some(c) if c.is_numeric() => "quantitative",
        _ => "nominal",
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/charts/scatter.rs"]
mod tests;
