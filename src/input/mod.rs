use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub mod reader;
pub mod table;

use reader::{TABLE_SUFFIXES, read_table, table_stem};
pub use table::{Column, Dataset};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("dataset not found: {name} (looked in {dir})")]
    NotFound { name: String, dir: String },
    #[error("corrupt data in {name}: {reason}")]
    CorruptData { name: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub dir: PathBuf,
    pub cache: bool,
}

impl StoreConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: true,
        }
    }
}

/// Named tables under one directory, one file per dataset.
#[derive(Debug)]
pub struct DatasetStore {
    config: StoreConfig,
    cache: RefCell<HashMap<String, Rc<Dataset>>>,
}

impl DatasetStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    /// Dataset names (file stems), sorted. Hidden files are skipped.
    pub fn names(&self) -> Result<Vec<String>, InputError> {
        let mut names = BTreeSet::new();
        for entry in std::fs::read_dir(&self.config.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if file_name.starts_with('.') {
                continue;
            }
            if let Some(stem) = table_stem(&file_name) {
                names.insert(stem.to_string());
            }
        }
        Ok(names.into_iter().collect())
    }

    pub fn load(&self, name: &str) -> Result<Rc<Dataset>, InputError> {
        if let Some(hit) = self.cache.borrow().get(name) {
            return Ok(Rc::clone(hit));
        }
        let path = self.resolve(name)?;
        let dataset = Rc::new(read_table(&path, name)?);
        tracing::info!(
            name,
            rows = dataset.n_rows(),
            columns = dataset.column_names().len(),
            "dataset loaded"
        );
        if self.config.cache {
            self.cache
                .borrow_mut()
                .insert(name.to_string(), Rc::clone(&dataset));
        }
        Ok(dataset)
    }

    #[cfg(test)]
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, InputError> {
        if !name.is_empty() && !name.contains(['/', '\\']) && !name.starts_with('.') {
            for suffix in TABLE_SUFFIXES {
                let path = self.config.dir.join(format!("{name}{suffix}"));
                if path.is_file() {
                    return Ok(path);
                }
            }
        }
        Err(InputError::NotFound {
            name: name.to_string(),
            dir: self.config.dir.display().to_string(),
        })
    }
}

/// Loads a single table file by path; the dataset name is the file stem.
pub fn load_table(path: &Path) -> Result<Dataset, InputError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = table_stem(&file_name).unwrap_or(&file_name).to_string();
    if !path.is_file() {
        return Err(InputError::NotFound {
            name,
            dir: path
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        });
    }
    read_table(path, &name)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
