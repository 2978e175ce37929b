use serde_json::{Value, json};

use crate::charts::{ChartError, ChartSpec, require_column, require_numeric};
use crate::input::Dataset;

/// Row label column of a heatmap table; every other column is a gene.
pub const CONDITION_COLUMN: &str = "condition";
pub const TITLE: &str = "Heatmap of Gene Expression";
pub const COLOR_SCHEME: &str = "lightgreyred";

/// The last `n` gene columns, last first. Growing `n` only appends.
pub fn top_genes(table: &Dataset, n: usize) -> Result<Vec<String>, ChartError> {
    if n == 0 {
        return Err(ChartError::InvalidParameter {
            name: "gene count",
            reason: "must be at least 1".to_string(),
        });
    }
    require_column(table, CONDITION_COLUMN)?;
    let genes: Vec<&String> = table
        .column_names()
        .iter()
        .filter(|name| name.as_str() != CONDITION_COLUMN)
        .collect();
    if n > genes.len() {
        tracing::warn!(
            table = table.name(),
            requested = n,
            available = genes.len(),
            "gene count exceeds available genes; clamping"
        );
    }
    Ok(genes.iter().rev().take(n).map(|g| g.to_string()).collect())
}

/// Wide to long: one `{Condition, Gene, Expression}` record per
/// condition x gene, gene-major like a dataframe melt.
pub fn melt(table: &Dataset, genes: &[String]) -> Result<Vec<Value>, ChartError> {
    let conditions = require_column(table, CONDITION_COLUMN)?;
    let mut out = Vec::with_capacity(genes.len() * table.n_rows());
    for gene in genes {
        let values = require_numeric(table, gene)?;
        for (row, &expr) in values.iter().enumerate() {
            out.push(json!({
                "Condition": conditions.value_json(row),
                "Gene": gene,
                "Expression": serde_json::Number::from_f64(expr).map(Value::Number).unwrap_or(Value::Null),
            }));
        }
    }
    Ok(out)
}

pub fn build_heatmap(table: &Dataset, top_n: usize) -> Result<ChartSpec, ChartError> {
    let genes = top_genes(table, top_n)?;
    let values = melt(table, &genes)?;
    Ok(ChartSpec::new(json!({
        "data": { "values": values },
        "mark": "rect",
        "encoding": {
            "x": {
                "field": "Gene",
                "type": "ordinal",
                "sort": { "field": "Gene", "order": "ascending" },
                "scale": { "domain": genes }
            },
            "y": {
                "field": "Condition",
                "type": "ordinal",
                "sort": { "field": "Condition", "order": "ascending" }
            },
            "color": {
                "field": "Expression",
                "type": "quantitative",
                "scale": { "scheme": COLOR_SCHEME }
            },
            "tooltip": [
                { "field": "Condition", "type": "nominal" },
                { "field": "Gene", "type": "nominal" },
                { "field": "Expression", "type": "quantitative" }
            ]
        },
        "width": 600,
        "height": 400,
        "title": TITLE
    })))
}

#[cfg(test)]
#[path = "../../tests/src_inline/charts/heatmap.rs"]
mod tests;
