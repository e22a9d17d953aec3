pub mod config;
mod error;
pub mod nasa;
pub mod parser;
mod processor;
pub mod tracing;
pub mod view;
pub mod window;

pub use config::ApodConfig;
pub use error::Error;
pub use nasa::{ApodClient, ApodFetcher, ApodResponse};
pub use processor::{builder::ApodPipelineBuilder, ApodPipeline, DatabaseOutcome, RunReport};
pub use view::{ApodView, Backend, ViewError, ViewSurface};
pub use window::FetchWindow;
