use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::input::InputError;

/// One typed column. The type is fixed when the table is loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    pub fn value_json(&self, row: usize) -> Value {
        match self {
            Column::Numeric(v) => serde_json::Number::from_f64(v[row])
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Column::Categorical(v) => Value::String(v[row].clone()),
        }
    }

    fn take(&self, rows: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(rows.iter().map(|&r| v[r]).collect()),
            Column::Categorical(v) => {
                Column::Categorical(rows.iter().map(|&r| v[r].clone()).collect())
            }
        }
    }
}

/// Immutable named table of per-cell observations.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    names: Vec<String>,
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    n_rows: usize,
}

impl Dataset {
    pub fn from_columns(
        name: impl Into<String>,
        columns: Vec<(String, Column)>,
    ) -> Result<Dataset, InputError> {
        let name = name.into();
        let n_rows = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        let mut index = HashMap::with_capacity(columns.len());
        let mut names = Vec::with_capacity(columns.len());
        let mut data = Vec::with_capacity(columns.len());
        for (idx, (col_name, column)) in columns.into_iter().enumerate() {
            if col_name.is_empty() {
                return Err(InputError::CorruptData {
                    name,
                    reason: format!("column {} has an empty name", idx + 1),
                });
            }
            if column.len() != n_rows {
                return Err(InputError::CorruptData {
                    name,
                    reason: format!(
                        "column {col_name} has {} rows, expected {n_rows}",
                        column.len()
                    ),
                });
            }
            if index.insert(col_name.clone(), idx).is_some() {
                return Err(InputError::CorruptData {
                    name,
                    reason: format!("duplicate column {col_name}"),
                });
            }
            names.push(col_name);
            data.push(column);
        }
        Ok(Dataset {
            name,
            names,
            columns: data,
            index,
            n_rows,
        })
    }

    /// Types each column from its raw cells: numeric when every non-empty
    /// cell parses as a float or is a missing marker such as `NA`,
    /// categorical otherwise.
    pub fn from_raw(
        name: impl Into<String>,
        header: Vec<String>,
        cells: Vec<Vec<String>>,
    ) -> Result<Dataset, InputError> {
        let mut columns = Vec::with_capacity(header.len());
        for (idx, col_name) in header.into_iter().enumerate() {
            let raw: Vec<&str> = cells
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect();
            columns.push((col_name, infer_column(&raw)));
        }
        Dataset::from_columns(name, columns)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&idx| &self.columns[idx])
    }

    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        match self.column(name)? {
            Column::Numeric(v) => Some(v),
            Column::Categorical(_) => None,
        }
    }

    pub fn categorical(&self, name: &str) -> Option<&[String]> {
        match self.column(name)? {
            Column::Categorical(v) => Some(v),
            Column::Numeric(_) => None,
        }
    }

    pub fn numeric_column_names(&self) -> Vec<String> {
        self.names
            .iter()
            .zip(&self.columns)
            .filter(|(_, c)| c.is_numeric())
            .map(|(n, _)| n.clone())
            .collect()
    }

    /// Rows where `mask` is true, in original order.
    pub fn filter(&self, mask: &[bool]) -> Dataset {
        let rows: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        Dataset {
            name: self.name.clone(),
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(&rows)).collect(),
            index: self.index.clone(),
            n_rows: rows.len(),
        }
    }

    /// Row-oriented JSON records, the shape Vega-Lite takes as inline data.
    pub fn records(&self) -> Vec<Value> {
        (0..self.n_rows)
            .map(|row| {
                let mut obj = Map::with_capacity(self.names.len());
                for (name, column) in self.names.iter().zip(&self.columns) {
                    obj.insert(name.clone(), column.value_json(row));
                }
                Value::Object(obj)
            })
            .collect()
    }
}

/// Cells read as missing values in numeric columns (R and pandas `na_rep`).
const MISSING_MARKERS: &[&str] = &["NA", "N/A", "NaN", "nan", "null"];

fn infer_column(raw: &[&str]) -> Column {
    let mut values = Vec::with_capacity(raw.len());
    let mut seen_value = false;
    for cell in raw {
        let cell = cell.trim();
        if cell.is_empty() || MISSING_MARKERS.contains(&cell) {
            values.push(f64::NAN);
            continue;
        }
        match cell.parse::<f64>() {
            Ok(v) => {
                seen_value = true;
                values.push(v);
            }
            Err(_) => {
                return Column::Categorical(raw.iter().map(|s| s.trim().to_string()).collect());
            }
        }
    }
    if seen_value {
        Column::Numeric(values)
    } else {
        Column::Categorical(raw.iter().map(|s| s.trim().to_string()).collect())
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/table.rs"]
mod tests;
