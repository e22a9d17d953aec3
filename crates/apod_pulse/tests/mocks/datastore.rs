use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use apod_datastore::{ApodRecord, BulkInsertResult, DataStore, FailedInsert, InsertFailReason};
use chrono::NaiveDate;

/// In-memory table with the same replace semantics as `apod_data`
#[derive(Clone)]
pub struct MockDataStore {
    pub rows: Arc<Mutex<Vec<ApodRecord>>>,
    pub failing_dates: HashSet<NaiveDate>,
    pub fail_with: Option<String>,
    pub close_calls: Arc<AtomicUsize>,
}

impl Default for MockDataStore {
    fn default() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            failing_dates: HashSet::new(),
            fail_with: None,
            close_calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MockDataStore {
    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub fn rejecting(dates: &[NaiveDate]) -> Self {
        Self {
            failing_dates: dates.iter().copied().collect(),
            ..Default::default()
        }
    }

    pub fn seeded(records: Vec<ApodRecord>) -> Self {
        Self {
            rows: Arc::new(Mutex::new(records)),
            ..Default::default()
        }
    }

    pub fn stored_dates(&self) -> Vec<NaiveDate> {
        self.rows.lock().unwrap().iter().map(|r| r.date).collect()
    }

    pub fn closed(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

impl DataStore for MockDataStore {
    async fn replace_records(&self, records: &[ApodRecord]) -> anyhow::Result<BulkInsertResult> {
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }

        let mut rows = self.rows.lock().unwrap();
        rows.clear();

        let mut result = BulkInsertResult::default();
        for record in records {
            if self.failing_dates.contains(&record.date) {
                result.failed_inserts.push(FailedInsert {
                    date: record.date,
                    reason: InsertFailReason::Database {
                        message: "value too long for type character varying(255)".into(),
                    },
                });
                continue;
            }
            // the table only keeps the five columns
            let mut row = record.clone();
            row.extra.clear();
            rows.push(row);
            result.successful_inserts += 1;
        }

        Ok(result)
    }

    async fn list_dates(&self) -> anyhow::Result<Vec<NaiveDate>> {
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }

        let mut dates = self.stored_dates();
        dates.sort();
        dates.dedup();
        Ok(dates)
    }

    async fn get_record(&self, date: NaiveDate) -> anyhow::Result<Option<ApodRecord>> {
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }

        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.date == date)
            .cloned())
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }
}
