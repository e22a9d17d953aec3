use std::time::Duration;

use apod_datastore::DATE_FORMAT;
use reqwest::Client;

use crate::{
    nasa::{ApodFetcher, ApodResponse},
    window::FetchWindow,
};

pub struct ApodClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApodClientError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
}

impl ApodClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ApodClientError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: <Self as ApodFetcher>::ENDPOINT.into(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl ApodFetcher for ApodClient {
    const ENDPOINT: &'static str = "https://api.nasa.gov/planetary/apod";

    type Error = ApodClientError;

    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch(&self, window: &FetchWindow) -> Result<ApodResponse, Self::Error> {
        let start_date = window.start().format(DATE_FORMAT).to_string();

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("start_date", start_date.as_str()),
            ])
            .send()
            .await
            // the url carries the api key
            .map_err(reqwest::Error::without_url)
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(reqwest::Error::without_url)?;

        Ok(ApodResponse { status, body })
    }
}
