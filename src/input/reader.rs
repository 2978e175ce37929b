use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::input::InputError;
use crate::input::table::Dataset;

pub const TABLE_SUFFIXES: &[&str] = &[".tsv", ".tsv.gz", ".csv", ".csv.gz"];

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn Read>, InputError> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(GzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Splits a file name into (stem, suffix) when the suffix is a known table
/// format.
pub fn table_stem(file_name: &str) -> Option<&str> {
    TABLE_SUFFIXES
        .iter()
        .find_map(|suffix| file_name.strip_suffix(suffix))
        .filter(|stem| !stem.is_empty())
}

fn delimiter_for(path: &Path) -> u8 {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name.ends_with(".csv") || name.ends_with(".csv.gz") {
        b','
    } else {
        b'\t'
    }
}

pub fn read_table(path: &Path, name: &str) -> Result<Dataset, InputError> {
    let reader = open_maybe_gz(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let corrupt = |reason: String| InputError::CorruptData {
        name: name.to_string(),
        reason,
    };

    let header: Vec<String> = rdr
        .headers()
        .map_err(|e| corrupt(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if header.is_empty() || header.iter().all(|h| h.is_empty()) {
        return Err(corrupt("table header is empty".to_string()));
    }

    let mut cells = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| corrupt(e.to_string()))?;
        cells.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let dataset = Dataset::from_raw(name, header, cells)?;
    tracing::debug!(
        name,
        path = %path.display(),
        rows = dataset.n_rows(),
        columns = dataset.column_names().len(),
        "loaded table"
    );
    Ok(dataset)
}
