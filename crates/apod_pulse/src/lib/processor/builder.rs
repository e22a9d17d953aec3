use std::path::PathBuf;

use apod_datastore::{DataStore, JsonFileStore};
use chrono_tz::Tz;

use crate::{nasa::ApodFetcher, window::FetchWindow, ApodPipeline};

pub struct ApodPipelineBuilder<D = (), F = ()> {
    files_dir: PathBuf,
    store: Option<D>,
    fetcher: F,
    window: Option<FetchWindow>,
    time_zone: Tz,
    lookback_days: u32,
}

impl ApodPipelineBuilder {
    pub fn new(files_dir: impl Into<PathBuf>) -> Self {
        Self {
            files_dir: files_dir.into(),
            store: None,
            fetcher: (),
            window: None,
            time_zone: FetchWindow::DEFAULT_TIME_ZONE,
            lookback_days: FetchWindow::DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl<D, F> ApodPipelineBuilder<D, F> {
    pub fn store<D2: DataStore + Send + Sync + 'static>(
        self,
        store: D2,
    ) -> ApodPipelineBuilder<D2, F> {
        self.maybe_store(Some(store))
    }

    /// Sets the relational store, `None` when it could not be reached
    pub fn maybe_store<D2: DataStore + Send + Sync + 'static>(
        self,
        store: Option<D2>,
    ) -> ApodPipelineBuilder<D2, F> {
        ApodPipelineBuilder {
            files_dir: self.files_dir,
            store,
            fetcher: self.fetcher,
            window: self.window,
            time_zone: self.time_zone,
            lookback_days: self.lookback_days,
        }
    }

    pub fn fetcher<F2: ApodFetcher + Send + Sync + 'static>(
        self,
        fetcher: F2,
    ) -> ApodPipelineBuilder<D, F2> {
        ApodPipelineBuilder {
            files_dir: self.files_dir,
            store: self.store,
            fetcher,
            window: self.window,
            time_zone: self.time_zone,
            lookback_days: self.lookback_days,
        }
    }

    pub fn time_zone(mut self, time_zone: Tz) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn lookback_days(mut self, lookback_days: u32) -> Self {
        self.lookback_days = lookback_days;
        self
    }

    /// Pins the window instead of computing it from today's date
    pub fn window(mut self, window: FetchWindow) -> Self {
        self.window = Some(window);
        self
    }
}

impl<D, F> ApodPipelineBuilder<D, F>
where
    D: DataStore + Send + Sync + 'static,
    F: ApodFetcher + Send + Sync + 'static,
{
    pub fn build(self) -> ApodPipeline<D, F> {
        let window = self
            .window
            .unwrap_or_else(|| FetchWindow::ending_today(self.time_zone, self.lookback_days));

        ApodPipeline {
            fetcher: self.fetcher,
            store: self.store,
            files: JsonFileStore::new(self.files_dir),
            window,
        }
    }
}
