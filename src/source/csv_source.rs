use crate::models::{RefillRecord, ScanRecord};
use crate::source::{DataSource, SourceError};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads the scans and refills sheets from CSV exports in one directory.
#[derive(Debug, Clone)]
pub struct CsvSource {
    scans_path: PathBuf,
    refills_path: PathBuf,
}

impl CsvSource {
    pub fn new(data_dir: impl AsRef<Path>, scans_file: &str, refills_file: &str) -> Self {
        let dir = data_dir.as_ref();
        Self {
            scans_path: dir.join(scans_file),
            refills_path: dir.join(refills_file),
        }
    }

    fn open(path: &Path) -> Result<File, SourceError> {
        File::open(path).map_err(|e| SourceError::Read {
            path: path.to_path_buf(),
            source: csv::Error::from(e),
        })
    }
}

impl DataSource for CsvSource {
    fn scans(&self) -> Result<Vec<ScanRecord>, SourceError> {
        let file = Self::open(&self.scans_path)?;
        read_scans(file).map_err(|e| with_path(e, &self.scans_path))
    }

    fn refills(&self) -> Result<Vec<RefillRecord>, SourceError> {
        let file = Self::open(&self.refills_path)?;
        read_refills(file).map_err(|e| with_path(e, &self.refills_path))
    }
}

fn with_path(err: SourceError, path: &Path) -> SourceError {
    match err {
        SourceError::Table(source) => SourceError::Read {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    }
}

pub fn read_scans<R: Read>(reader: R) -> Result<Vec<ScanRecord>, SourceError> {
    read_table(reader, "scans")
}

pub fn read_refills<R: Read>(reader: R) -> Result<Vec<RefillRecord>, SourceError> {
    read_table(reader, "refills")
}

/// Deserializes every row it can. Rows that fail are logged and skipped; only
/// a header that cannot be read fails the whole table.
fn read_table<T, R>(reader: R, table: &str) -> Result<Vec<T>, SourceError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    rdr.headers()?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (i, result) in rdr.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                warn!("Skipping {} row {}: {}", table, i + 1, e);
            }
        }
    }

    debug!("Loaded {} {} rows ({} skipped)", rows.len(), table, skipped);
    Ok(rows)
}
