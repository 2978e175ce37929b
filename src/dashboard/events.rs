use std::io::BufRead;

use serde::Deserialize;

use crate::model::{Param, Selection, Value};

/// One discrete UI event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Widget {
        param: Param,
        value: Value,
    },
    Brush {
        #[serde(default)]
        selection: Selection,
        at_ms: u64,
    },
    Tick {
        at_ms: u64,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads a JSON-lines event script. Blank lines and `#` comments are skipped.
pub fn parse_events<R: BufRead>(reader: R) -> Result<Vec<Event>, EventError> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event = serde_json::from_str(trimmed).map_err(|source| EventError::Parse {
            line: idx + 1,
            source,
        })?;
        events.push(event);
    }
    Ok(events)
}
