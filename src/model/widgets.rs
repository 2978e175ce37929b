use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Parameters a widget can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    Dataset,
    CircleSize,
    Opacity,
    GeneCount,
    Gene,
}

impl Param {
    pub const ALL: [Param; 5] = [
        Param::Dataset,
        Param::CircleSize,
        Param::Opacity,
        Param::GeneCount,
        Param::Gene,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Param::Dataset => "dataset",
            Param::CircleSize => "circle_size",
            Param::Opacity => "opacity",
            Param::GeneCount => "gene_count",
            Param::Gene => "gene",
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Param {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Param::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .ok_or_else(|| WidgetError::UnknownParam(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Str(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WidgetError {
    #[error("unknown widget parameter: {0}")]
    UnknownParam(String),
    #[error("{param} expects a {expected} value, got {got}")]
    TypeMismatch {
        param: Param,
        expected: &'static str,
        got: String,
    },
    #[error("{value:?} is not an option of {param}")]
    NotAnOption { param: Param, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Select {
        label: String,
        options: Vec<String>,
    },
    FloatSlider {
        label: String,
        start: f64,
        end: f64,
    },
    IntSlider {
        label: String,
        start: i64,
        end: i64,
    },
    /// Free text restricted to `options`; matching ignores case unless
    /// `case_sensitive` is set.
    Autocomplete {
        label: String,
        options: Vec<String>,
        case_sensitive: bool,
    },
}

impl Widget {
    pub fn label(&self) -> &str {
        match self {
            Widget::Select { label, .. }
            | Widget::FloatSlider { label, .. }
            | Widget::IntSlider { label, .. }
            | Widget::Autocomplete { label, .. } => label,
        }
    }

    /// Validates `value` for this widget. Sliders clamp into range, the
    /// autocomplete box resolves to the canonical option spelling.
    pub fn normalize(&self, param: Param, value: Value) -> Result<Value, WidgetError> {
        match self {
            Widget::Select { options, .. } => {
                let s = expect_str(param, &value)?;
                if options.iter().any(|o| o == s) || (options.is_empty() && s.is_empty()) {
                    Ok(value)
                } else {
                    Err(WidgetError::NotAnOption {
                        param,
                        value: s.to_string(),
                    })
                }
            }
            Widget::FloatSlider { start, end, .. } => {
                let v = value.as_f64().ok_or_else(|| mismatch(param, "float", &value))?;
                let clamped = v.clamp(*start, *end);
                if clamped != v {
                    tracing::warn!(%param, value = v, clamped, "slider value clamped");
                }
                Ok(Value::Float(clamped))
            }
            Widget::IntSlider { start, end, .. } => {
                let v = value.as_i64().ok_or_else(|| mismatch(param, "int", &value))?;
                let clamped = v.clamp(*start, *end);
                if clamped != v {
                    tracing::warn!(%param, value = v, clamped, "slider value clamped");
                }
                Ok(Value::Int(clamped))
            }
            Widget::Autocomplete {
                options,
                case_sensitive,
                ..
            } => {
                let s = expect_str(param, &value)?;
                if s.is_empty() {
                    return Ok(Value::Str(String::new()));
                }
                let found = if *case_sensitive {
                    options.iter().find(|o| o.as_str() == s)
                } else {
                    let lower = s.to_lowercase();
                    options.iter().find(|o| o.to_lowercase() == lower)
                };
                found.map(|o| Value::Str(o.clone())).ok_or_else(|| {
                    WidgetError::NotAnOption {
                        param,
                        value: s.to_string(),
                    }
                })
            }
        }
    }

    /// Options containing `query` ("includes" search strategy).
    pub fn suggest(&self, query: &str) -> Vec<&str> {
        let (options, case_sensitive) = match self {
            Widget::Autocomplete {
                options,
                case_sensitive,
                ..
            } => (options, *case_sensitive),
            Widget::Select { options, .. } => (options, true),
            _ => return Vec::new(),
        };
        if case_sensitive {
            options
                .iter()
                .filter(|o| o.contains(query))
                .map(String::as_str)
                .collect()
        } else {
            let query = query.to_lowercase();
            options
                .iter()
                .filter(|o| o.to_lowercase().contains(&query))
                .map(String::as_str)
                .collect()
        }
    }
}

fn expect_str<'a>(param: Param, value: &'a Value) -> Result<&'a str, WidgetError> {
    value.as_str().ok_or_else(|| mismatch(param, "string", value))
}

fn mismatch(param: Param, expected: &'static str, value: &Value) -> WidgetError {
    WidgetError::TypeMismatch {
        param,
        expected,
        got: value.to_string(),
    }
}

/// Current value of every widget. Last write wins, no history.
#[derive(Debug, Clone, Default)]
pub struct WidgetState {
    widgets: BTreeMap<Param, Widget>,
    values: BTreeMap<Param, Value>,
}

impl WidgetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        param: Param,
        widget: Widget,
        initial: Value,
    ) -> Result<(), WidgetError> {
        let initial = widget.normalize(param, initial)?;
        self.widgets.insert(param, widget);
        self.values.insert(param, initial);
        Ok(())
    }

    pub fn widget(&self, param: Param) -> Option<&Widget> {
        self.widgets.get(&param)
    }

    pub fn get(&self, param: Param) -> Option<&Value> {
        self.values.get(&param)
    }

    pub fn normalize(&self, param: Param, value: Value) -> Result<Value, WidgetError> {
        let widget = self
            .widgets
            .get(&param)
            .ok_or_else(|| WidgetError::UnknownParam(param.key().to_string()))?;
        widget.normalize(param, value)
    }

    /// Applies a change. Returns whether the stored value actually changed.
    pub fn set(&mut self, param: Param, value: Value) -> Result<bool, WidgetError> {
        let value = self.normalize(param, value)?;
        if self.values.get(&param) == Some(&value) {
            return Ok(false);
        }
        self.values.insert(param, value);
        Ok(true)
    }

    pub fn str(&self, param: Param) -> Result<&str, WidgetError> {
        match self.values.get(&param) {
            Some(v) => expect_str(param, v),
            None => Err(WidgetError::UnknownParam(param.key().to_string())),
        }
    }

    pub fn float(&self, param: Param) -> Result<f64, WidgetError> {
        match self.values.get(&param) {
            Some(v) => v.as_f64().ok_or_else(|| mismatch(param, "float", v)),
            None => Err(WidgetError::UnknownParam(param.key().to_string())),
        }
    }

    pub fn int(&self, param: Param) -> Result<i64, WidgetError> {
        match self.values.get(&param) {
            Some(v) => v.as_i64().ok_or_else(|| mismatch(param, "int", v)),
            None => Err(WidgetError::UnknownParam(param.key().to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Param, &Widget, &Value)> {
        self.widgets
            .iter()
            .filter_map(|(p, w)| self.values.get(p).map(|v| (*p, w, v)))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/widgets.rs"]
mod tests;
