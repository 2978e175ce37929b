use std::collections::BTreeSet;

use serde_json::Value;

use crate::charts::{ChartError, require_column};
use crate::input::{Column, Dataset};
use crate::model::Selection;

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Inclusive on both ends.
    Range { column: String, lo: f64, hi: f64 },
    Members {
        column: String,
        set: BTreeSet<String>,
    },
}

/// Conjunction of per-column clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// Each column's clause kind follows that column's type in `table`.
    pub fn build(selection: &Selection, table: &Dataset) -> Result<Predicate, ChartError> {
        let mut clauses = Vec::with_capacity(selection.len());
        for (column, values) in selection.entries() {
            let clause = match require_column(table, column)? {
                Column::Numeric(_) => range_clause(column, values)?,
                Column::Categorical(_) => Clause::Members {
                    column: column.to_string(),
                    set: values.iter().map(member_key).collect(),
                },
            };
            clauses.push(clause);
        }
        Ok(Predicate { clauses })
    }

    #[cfg(test)]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn mask(&self, table: &Dataset) -> Result<Vec<bool>, ChartError> {
        let mut mask = vec![true; table.n_rows()];
        for clause in &self.clauses {
            match clause {
                Clause::Range { column, lo, hi } => {
                    let values = table.numeric(column).ok_or_else(|| ChartError::NotNumeric {
                        column: column.clone(),
                        table: table.name().to_string(),
                    })?;
                    for (keep, &v) in mask.iter_mut().zip(values) {
                        *keep &= *lo <= v && v <= *hi;
                    }
                }
                Clause::Members { column, set } => {
                    require_column(table, column)?;
                    let values = table.categorical(column).ok_or_else(|| {
                        ChartError::InvalidConstraint {
                            column: column.clone(),
                            reason: "set constraint on numeric column".to_string(),
                        }
                    })?;
                    for (keep, v) in mask.iter_mut().zip(values) {
                        *keep &= set.contains(v);
                    }
                }
            }
        }
        Ok(mask)
    }

    pub fn apply(&self, table: &Dataset) -> Result<Dataset, ChartError> {
        Ok(table.filter(&self.mask(table)?))
    }
}

fn range_clause(column: &str, values: &[Value]) -> Result<Clause, ChartError> {
    let invalid = |reason: &str| ChartError::InvalidConstraint {
        column: column.to_string(),
        reason: reason.to_string(),
    };
    if values.len() < 2 {
        return Err(invalid("range needs two bounds"));
    }
    let a = values[0].as_f64().ok_or_else(|| invalid("lower bound is not a number"))?;
    let b = values[1].as_f64().ok_or_else(|| invalid("upper bound is not a number"))?;
    Ok(Clause::Range {
        column: column.to_string(),
        lo: a.min(b),
        hi: a.max(b),
    })
}

// Integral floats print without a fraction so `1.0` matches the cell "1".
fn member_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/charts/filter.rs"]
mod tests;
