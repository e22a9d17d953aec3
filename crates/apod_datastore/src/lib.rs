//! # DataStore Module
//!
//! Persistence for NASA Astronomy Picture of the Day records.
//!
//! Two independent sinks are provided: a PostgreSQL table that holds the most
//! recent fetch window (replaced on every run) and a directory of per-date JSON
//! files that accumulates across runs.

mod datastore;
mod domain;
mod json_file;

pub use datastore::postgres::PgDataStore;
pub use datastore::{BulkInsertResult, DataStore, FailedInsert, InsertFailReason};
pub use domain::{ApodRecord, DATE_FORMAT};
pub use json_file::{FailedWrite, FileWriteReport, JsonFileStore};
