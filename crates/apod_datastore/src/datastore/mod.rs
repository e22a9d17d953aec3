use std::future::Future;

use chrono::NaiveDate;

use crate::ApodRecord;

pub mod postgres;

pub trait DataStore {
    /// Discards every stored row and inserts `records`.
    ///
    /// Rows are written one transaction at a time; a row that fails is rolled
    /// back and reported in the result while the rest of the batch continues.
    fn replace_records(
        &self,
        records: &[ApodRecord],
    ) -> impl Future<Output = anyhow::Result<BulkInsertResult>> + Send;

    /// Distinct stored dates, ascending
    fn list_dates(&self) -> impl Future<Output = anyhow::Result<Vec<NaiveDate>>> + Send;

    fn get_record(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = anyhow::Result<Option<ApodRecord>>> + Send;

    /// Releases the underlying connection
    fn close(&self) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Default)]
pub struct BulkInsertResult {
    pub successful_inserts: usize,
    pub failed_inserts: Vec<FailedInsert>,
}

#[derive(Debug)]
pub struct FailedInsert {
    pub date: NaiveDate,
    pub reason: InsertFailReason,
}

#[derive(Debug)]
pub enum InsertFailReason {
    Database { message: String },
}
