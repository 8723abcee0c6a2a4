use std::sync::Arc;

use crate::config::Config;
use crate::jobs::JobStore;
use crate::observability::Metrics;
use crate::worker::{DownloadError, Pipeline};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<JobStore>,
    pub pipeline: Arc<Pipeline>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, DownloadError> {
        let metrics = Arc::new(Metrics::new());
        let pipeline = Pipeline::from_config(&config, metrics.clone())?;

        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(JobStore::new()),
            pipeline: Arc::new(pipeline),
            metrics,
        })
    }
}
