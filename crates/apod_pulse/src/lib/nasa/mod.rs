pub mod client;

use std::{fmt::Debug, future::Future};

use crate::window::FetchWindow;

pub use client::{ApodClient, ApodClientError};

pub trait ApodFetcher {
    const ENDPOINT: &'static str;

    type Error: Debug + std::fmt::Display;

    /// Requests every APOD entry in `window` with a single call.
    ///
    /// Any HTTP status is returned as a response; only transport failures are errors.
    fn fetch(
        &self,
        window: &FetchWindow,
    ) -> impl Future<Output = Result<ApodResponse, Self::Error>> + Send;
}

/// Raw API response
#[derive(Debug, Clone)]
pub struct ApodResponse {
    pub status: u16,
    pub body: String,
}

impl ApodResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
