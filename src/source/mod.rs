use crate::models::{RefillRecord, ScanRecord};
use std::path::PathBuf;

pub mod csv_source;

pub use csv_source::{read_refills, read_scans, CsvSource};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed table: {0}")]
    Table(#[from] csv::Error),
}

/// Supplies the raw tables the dashboard works on.
pub trait DataSource {
    fn scans(&self) -> Result<Vec<ScanRecord>, SourceError>;
    fn refills(&self) -> Result<Vec<RefillRecord>, SourceError>;
}

/// Records held in memory, handed over by the caller.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub scans: Vec<ScanRecord>,
    pub refills: Vec<RefillRecord>,
}

impl MemorySource {
    pub fn new(scans: Vec<ScanRecord>, refills: Vec<RefillRecord>) -> Self {
        Self { scans, refills }
    }
}

impl DataSource for MemorySource {
    fn scans(&self) -> Result<Vec<ScanRecord>, SourceError> {
        Ok(self.scans.clone())
    }

    fn refills(&self) -> Result<Vec<RefillRecord>, SourceError> {
        Ok(self.refills.clone())
    }
}
