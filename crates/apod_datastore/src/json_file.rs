use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::NaiveDate;

use crate::{ApodRecord, DATE_FORMAT};

/// One pretty-printed JSON file per date, named `YYYY-MM-DD`.
///
/// Files are never removed, so the directory keeps every date any run has
/// written. The directory itself must already exist.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

#[derive(Debug, Default)]
pub struct FileWriteReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<FailedWrite>,
}

#[derive(Debug)]
pub struct FailedWrite {
    pub date: NaiveDate,
    pub reason: String,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(date.format(DATE_FORMAT).to_string())
    }

    /// Writes `record` to its date file, overwriting any previous content
    pub fn write(&self, record: &ApodRecord) -> anyhow::Result<PathBuf> {
        let path = self.path_for(record.date);
        let json = serde_json::to_string_pretty(record).context("Failed to serialize record")?;

        fs::write(&path, json)
            .inspect_err(|e| tracing::error!(error = ?e, path = ?path, "Failed to write record file"))
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(path)
    }

    #[tracing::instrument(skip_all, fields(dir = ?self.dir, count = records.len()))]
    pub fn write_all(&self, records: &[ApodRecord]) -> FileWriteReport {
        let mut report = FileWriteReport::default();

        for record in records {
            match self.write(record) {
                Ok(path) => report.written.push(path),
                Err(e) => report.failed.push(FailedWrite {
                    date: record.date,
                    reason: format!("{e:#}"),
                }),
            }
        }

        report
    }

    /// Reads the record for `date`; `None` when no file exists for it
    pub fn read(&self, date: NaiveDate) -> anyhow::Result<Option<ApodRecord>> {
        let path = self.path_for(date);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let record = serde_json::from_str(&content)
            .inspect_err(|e| tracing::error!(error = ?e, path = ?path, "Invalid record file"))
            .with_context(|| format!("Invalid record file {}", path.display()))?;

        Ok(Some(record))
    }

    /// Dates of every file in the directory named like a date, ascending
    pub fn list_dates(&self) -> anyhow::Result<Vec<NaiveDate>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list {}", self.dir.display()))?;

        let mut dates = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let name = entry.file_name();
                NaiveDate::parse_from_str(name.to_str()?, DATE_FORMAT).ok()
            })
            .collect::<Vec<_>>();
        dates.sort();

        Ok(dates)
    }
}
