use std::sync::{Arc, Mutex};

use apod_pulse::{ApodFetcher, ApodResponse, FetchWindow};

#[derive(Clone)]
pub struct MockApodFetcher {
    pub status: u16,
    pub body: String,
    pub fail_with: Option<String>,
    pub calls: Arc<Mutex<Vec<FetchWindow>>>,
}

impl MockApodFetcher {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            fail_with: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Ten days, 2024-01-01 through 2024-01-10
    pub fn from_fixture() -> Self {
        Self::new(200, include_str!("../fixtures/apod_2024_01.json"))
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new(0, "")
        }
    }
}

impl ApodFetcher for MockApodFetcher {
    const ENDPOINT: &'static str = "https://api.nasa.gov/mock";
    type Error = anyhow::Error;

    async fn fetch(&self, window: &FetchWindow) -> anyhow::Result<ApodResponse> {
        self.calls.lock().unwrap().push(*window);
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(ApodResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}
