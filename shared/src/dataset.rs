//! Static dataset
//!
//! Farm, slaughterhouse and transport records bundled as JSON arrays in a
//! data directory. Farms are mandatory; the other two files are optional.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorCode;
use crate::models::{FarmRecord, SlaughterhouseRecord, TransportRecord};

/// Accepted file names, first match wins
const FARM_FILES: &[&str] = &["farms.json", "farms 1.json"];
const SLAUGHTERHOUSE_FILES: &[&str] = &["slaughterhouses.json", "slaughterhouses 1.json"];
const TRANSPORT_FILES: &[&str] = &["transports.json", "transports 1.json"];

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("no {kind} file found in {dir}")]
    Missing { kind: &'static str, dir: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl DatasetError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Missing { .. } | Self::Io { .. } => ErrorCode::DatasetUnavailable,
            Self::Parse { .. } => ErrorCode::DatasetMalformed,
        }
    }
}

impl From<DatasetError> for crate::error::AppError {
    fn from(err: DatasetError) -> Self {
        Self::with_message(err.code(), err.to_string())
    }
}

/// All static records, with id indexes built at load time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticDataset {
    pub farms: Vec<FarmRecord>,
    pub slaughterhouses: Vec<SlaughterhouseRecord>,
    pub transports: Vec<TransportRecord>,
    #[serde(skip)]
    farm_index: HashMap<String, usize>,
    #[serde(skip)]
    slaughterhouse_index: HashMap<String, usize>,
}

impl StaticDataset {
    pub fn new(
        farms: Vec<FarmRecord>,
        slaughterhouses: Vec<SlaughterhouseRecord>,
        transports: Vec<TransportRecord>,
    ) -> Self {
        let mut dataset = Self {
            farms,
            slaughterhouses,
            transports,
            farm_index: HashMap::new(),
            slaughterhouse_index: HashMap::new(),
        };
        dataset.reindex();
        dataset
    }

    /// Load the dataset from `dir`
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let dir = dir.as_ref();

        let farms_path = find_file(dir, FARM_FILES).ok_or_else(|| DatasetError::Missing {
            kind: "farms",
            dir: dir.to_path_buf(),
        })?;
        let farms: Vec<FarmRecord> = read_records(&farms_path)?;

        let slaughterhouses = match find_file(dir, SLAUGHTERHOUSE_FILES) {
            Some(path) => read_records(&path)?,
            None => {
                tracing::warn!(dir = %dir.display(), "No slaughterhouse file, continuing without");
                Vec::new()
            }
        };

        let transports = match find_file(dir, TRANSPORT_FILES) {
            Some(path) => read_records(&path)?,
            None => {
                tracing::warn!(dir = %dir.display(), "No transport file, continuing without");
                Vec::new()
            }
        };

        tracing::info!(
            farms = farms.len(),
            slaughterhouses = slaughterhouses.len(),
            transports = transports.len(),
            "Static dataset loaded"
        );

        Ok(Self::new(farms, slaughterhouses, transports))
    }

    /// Rebuild the id indexes (call after deserializing or mutating the vectors)
    pub fn reindex(&mut self) {
        self.farm_index = self
            .farms
            .iter()
            .enumerate()
            .map(|(i, f)| (f.farm_id.clone(), i))
            .collect();
        self.slaughterhouse_index = self
            .slaughterhouses
            .iter()
            .enumerate()
            .map(|(i, s)| (s.slaughterhouse_id.clone(), i))
            .collect();
    }

    pub fn farm(&self, id: &str) -> Option<&FarmRecord> {
        self.farm_index.get(id).and_then(|&i| self.farms.get(i))
    }

    pub fn slaughterhouse(&self, id: &str) -> Option<&SlaughterhouseRecord> {
        self.slaughterhouse_index
            .get(id)
            .and_then(|&i| self.slaughterhouses.get(i))
    }

    /// First slaughterhouse of the file, the one the simulation delivers to
    pub fn primary_slaughterhouse(&self) -> Option<&SlaughterhouseRecord> {
        self.slaughterhouses.first()
    }
}

fn find_file(dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DatasetError> {
    let bytes = std::fs::read(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
