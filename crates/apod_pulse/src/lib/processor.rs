pub mod builder;

use apod_datastore::{ApodRecord, BulkInsertResult, DataStore, FileWriteReport, JsonFileStore};
use chrono::NaiveDate;

use crate::{
    nasa::ApodFetcher,
    parser::{parse_records, record_dates, SkippedEntry},
    view::ViewSurface,
    window::FetchWindow,
};

// Fetch, extract, then persist to the relational table and the JSON files
pub struct ApodPipeline<D, F>
where
    D: DataStore + Send + Sync + 'static,
    F: ApodFetcher + Send + Sync + 'static,
{
    fetcher: F,
    store: Option<D>,
    files: JsonFileStore,
    window: FetchWindow,
}

#[derive(Debug)]
pub enum DatabaseOutcome {
    /// No connection could be established
    Unavailable,
    /// Nothing was fetched, the table was left as it was
    Untouched,
    Failed(String),
    Replaced(BulkInsertResult),
}

#[derive(Debug)]
pub struct RunReport {
    pub window: FetchWindow,
    pub fetch_error: Option<String>,
    /// Dates of the records handed to the sinks, in response order
    pub dates: Vec<NaiveDate>,
    pub skipped: Vec<SkippedEntry>,
    pub out_of_window: usize,
    pub database: DatabaseOutcome,
    pub files: FileWriteReport,
}

struct Fetched {
    records: Vec<ApodRecord>,
    skipped: Vec<SkippedEntry>,
    out_of_window: usize,
}

impl RunReport {
    fn new(window: FetchWindow, database: DatabaseOutcome) -> Self {
        RunReport {
            window,
            fetch_error: None,
            dates: Vec::new(),
            skipped: Vec::new(),
            out_of_window: 0,
            database,
            files: FileWriteReport::default(),
        }
    }
}

impl<D, F> ApodPipeline<D, F>
where
    D: DataStore + Send + Sync + 'static,
    F: ApodFetcher + Send + Sync + 'static,
{
    /// Fetches the window and parses the records in it.
    ///
    /// Transport failures and non-success statuses come back as `Err` with a
    /// printable reason; they are reported, not propagated.
    #[tracing::instrument(skip(self), fields(window = %self.window))]
    async fn fetch_records(&self) -> Result<Fetched, String> {
        let response = self
            .fetcher
            .fetch(&self.window)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to fetch APOD data"))
            .map_err(|e| e.to_string())?;

        if !response.is_success() {
            tracing::error!(
                status = response.status,
                body = %response.body,
                "Failed to retrieve data"
            );
            return Err(format!(
                "Failed to retrieve data. Status code: {}",
                response.status
            ));
        }

        let extracted = parse_records(&response.body)
            .inspect_err(|e| tracing::error!(error = %e, "Failed to parse APOD response"))
            .map_err(|e| e.to_string())?;

        let total = extracted.records.len();
        let records = extracted
            .records
            .into_iter()
            .filter(|record| {
                let inside = self.window.contains(record.date);
                if !inside {
                    tracing::warn!(date = %record.date, "Dropping record outside the fetch window");
                }
                inside
            })
            .collect::<Vec<_>>();

        Ok(Fetched {
            out_of_window: total - records.len(),
            records,
            skipped: extracted.skipped,
        })
    }

    #[tracing::instrument(skip_all)]
    async fn persist_to_database(&self, records: &[ApodRecord]) -> DatabaseOutcome {
        let Some(store) = &self.store else {
            tracing::warn!("Database unavailable, skipping relational persistence");
            return DatabaseOutcome::Unavailable;
        };

        match store.replace_records(records).await {
            Ok(result) => {
                tracing::info!(
                    inserted = result.successful_inserts,
                    failed = result.failed_inserts.len(),
                    "Replaced apod_data rows"
                );
                DatabaseOutcome::Replaced(result)
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to persist records to database");
                DatabaseOutcome::Failed(format!("{e:#}"))
            }
        }
    }

    #[tracing::instrument(skip_all)]
    fn persist_to_files(&self, records: &[ApodRecord]) -> FileWriteReport {
        let report = self.files.write_all(records);
        tracing::info!(
            written = report.written.len(),
            failed = report.failed.len(),
            dir = ?self.files.dir(),
            "Wrote record files"
        );
        report
    }

    /// Runs one fetch and persists the result to both sinks.
    ///
    /// A failure in one sink never stops the other, and a failed fetch leaves
    /// both sinks untouched.
    #[tracing::instrument(skip(self), fields(window = %self.window))]
    pub async fn run(&self) -> RunReport {
        let untouched = if self.store.is_some() {
            DatabaseOutcome::Untouched
        } else {
            DatabaseOutcome::Unavailable
        };
        let mut report = RunReport::new(self.window, untouched);

        let Fetched {
            records,
            skipped,
            out_of_window,
        } = match self.fetch_records().await {
            Ok(fetched) => fetched,
            Err(reason) => {
                report.fetch_error = Some(reason);
                return report;
            }
        };
        report.dates = record_dates(&records);
        tracing::info!(count = records.len(), dates = ?report.dates, "Processing records");

        if records.is_empty() {
            tracing::warn!("No records in the fetch window, nothing to persist");
        } else {
            report.database = self.persist_to_database(&records).await;
            report.files = self.persist_to_files(&records);
        }

        report.skipped = skipped;
        report.out_of_window = out_of_window;

        report
    }

    /// Hands the store over to the view phase
    pub fn into_view(self) -> ViewSurface<D> {
        ViewSurface::new(self.store, self.files)
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(reason) = &self.fetch_error {
            return writeln!(f, "{}: {reason}; stored data left unchanged", self.window);
        }

        writeln!(f, "{}: fetched {} records", self.window, self.dates.len())?;
        if !self.skipped.is_empty() || self.out_of_window > 0 {
            writeln!(
                f,
                "  skipped {} malformed and {} out-of-window entries",
                self.skipped.len(),
                self.out_of_window
            )?;
        }

        match &self.database {
            DatabaseOutcome::Unavailable => writeln!(f, "  database: unavailable")?,
            DatabaseOutcome::Untouched => writeln!(f, "  database: unchanged")?,
            DatabaseOutcome::Failed(reason) => writeln!(f, "  database: failed ({reason})")?,
            DatabaseOutcome::Replaced(result) => writeln!(
                f,
                "  database: {} rows inserted, {} failed",
                result.successful_inserts,
                result.failed_inserts.len()
            )?,
        }

        writeln!(
            f,
            "  files: {} written, {} failed",
            self.files.written.len(),
            self.files.failed.len()
        )
    }
}
