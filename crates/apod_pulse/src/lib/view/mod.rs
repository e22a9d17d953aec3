pub mod prompt;

use std::{fmt, str::FromStr};

use apod_datastore::{ApodRecord, DataStore, JsonFileStore};
use chrono::NaiveDate;

/// Where a record is read back from
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// The relational table holding the latest run
    Database,
    /// The per-date JSON files
    Json,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Database => f.write_str("database"),
            Backend::Json => f.write_str("json"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "database" | "db" | "postgres" | "sql" => Ok(Backend::Database),
            "json" | "file" => Ok(Backend::Json),
            other => Err(format!("Unknown data source: {other}")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("The database is not available; choose the json data source instead")]
    StoreUnavailable,
    #[error("No data for {date} in the {backend} data source")]
    NotFound { date: NaiveDate, backend: Backend },
    #[error("Failed to read from the {backend} data source: {reason:#}")]
    Store {
        backend: Backend,
        reason: anyhow::Error,
    },
}

/// A record ready for display as a label/value table
#[derive(Debug, Clone, PartialEq)]
pub struct ApodView {
    rows: [(&'static str, String); 4],
}

impl ApodView {
    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }
}

impl From<&ApodRecord> for ApodView {
    fn from(record: &ApodRecord) -> Self {
        ApodView {
            rows: record.display_rows(),
        }
    }
}

impl fmt::Display for ApodView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self.rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);

        for (label, value) in &self.rows {
            let mut lines = value.lines();
            writeln!(
                f,
                "{label:<label_width$} | {}",
                lines.next().unwrap_or_default()
            )?;
            // continuation lines stay in the value column
            for line in lines {
                writeln!(f, "{:<label_width$} | {line}", "")?;
            }
        }

        Ok(())
    }
}

/// Reads records back from whichever sink the user picks.
///
/// Owns the relational store handle for the rest of the session; [`ViewSurface::close`]
/// releases it, and dropping the surface releases it as well.
pub struct ViewSurface<D: DataStore + Send + Sync + 'static> {
    store: Option<D>,
    files: JsonFileStore,
}

impl<D: DataStore + Send + Sync + 'static> ViewSurface<D> {
    pub fn new(store: Option<D>, files: JsonFileStore) -> Self {
        ViewSurface { store, files }
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Dates offered for selection, read from the relational store only.
    /// Empty when the store is unavailable or cannot be queried.
    #[tracing::instrument(skip(self))]
    pub async fn available_dates(&self) -> Vec<NaiveDate> {
        let Some(store) = &self.store else {
            tracing::warn!("Database unavailable, no dates to offer");
            return Vec::new();
        };

        store
            .list_dates()
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to list available dates"))
            .unwrap_or_default()
    }

    #[tracing::instrument(skip(self))]
    pub async fn lookup(&self, date: NaiveDate, backend: Backend) -> Result<ApodView, ViewError> {
        let record = match backend {
            Backend::Database => {
                let store = self.store.as_ref().ok_or(ViewError::StoreUnavailable)?;
                store.get_record(date).await
            }
            Backend::Json => self.files.read(date),
        }
        .map_err(|reason| ViewError::Store { backend, reason })?;

        record
            .as_ref()
            .map(ApodView::from)
            .ok_or(ViewError::NotFound { date, backend })
    }

    /// Closes the relational store
    pub async fn close(mut self) {
        if let Some(store) = self.store.take() {
            store.close().await;
        }
    }
}
