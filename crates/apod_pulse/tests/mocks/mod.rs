pub mod datastore;
pub mod fetcher;
