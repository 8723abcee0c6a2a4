//! Download worker
//!
//! A [`Pipeline`] owns the resolver and fetcher; each accepted job is driven
//! by one detached runner task that reports checkpoints to the job store.

pub mod error;
pub mod fetcher;
pub mod http;
pub mod output;
pub mod resolver;
pub mod runner;
pub mod scrape;

pub use error::DownloadError;
pub use runner::{FetchEvent, JobRequest, Pipeline};
