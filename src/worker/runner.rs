//! Job runner - drives one download through resolve -> stream URL -> file

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::error::{DownloadError, Result};
use super::fetcher::Fetcher;
use super::http::{HttpConfig, build_client};
use super::output::{output_path, validate_filename};
use super::resolver::Resolver;
use crate::config::Config;
use crate::jobs::{JobPatch, JobStore};
use crate::observability::Metrics;

/// Caller-supplied parameters of one download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobRequest {
    pub source_url: String,
    pub output_directory: Option<String>,
    pub filename: Option<String>,
}

/// Milestones reported by [`Pipeline::fetch_direct`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchEvent<'a> {
    TrackResolved { track_id: &'a str },
    StreamFound,
    Downloading { path: &'a Path },
}

/// Everything a runner needs besides the job itself.
#[derive(Debug, Clone)]
pub struct Pipeline {
    resolver: Resolver,
    fetcher: Fetcher,
    default_output_dir: PathBuf,
    metrics: Arc<Metrics>,
}

impl Pipeline {
    pub fn new(
        resolver: Resolver,
        fetcher: Fetcher,
        default_output_dir: impl Into<PathBuf>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            default_output_dir: default_output_dir.into(),
            metrics,
        }
    }

    pub fn from_config(config: &Config, metrics: Arc<Metrics>) -> Result<Self> {
        let http = build_client(&HttpConfig {
            request_timeout: config.upstream.request_timeout(),
            user_agent: config.upstream.user_agent.clone(),
        })?;

        Ok(Self::new(
            Resolver::new(http.clone(), config.upstream.api_base_url.clone()),
            Fetcher::new(http),
            config.downloads.default_output_dir.clone(),
            metrics,
        ))
    }

    /// Schedule [`Pipeline::run`] as a detached task.
    ///
    /// The task outlives the request that created it and always runs to a
    /// terminal state; the handle is only useful to tests.
    pub fn spawn(
        self: &Arc<Self>,
        job_id: String,
        request: JobRequest,
        store: Arc<JobStore>,
    ) -> JoinHandle<()> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.run(&job_id, &request, &store).await })
    }

    /// Advance `job_id` from pending to completed or failed.
    ///
    /// Errors never escape: they are recorded on the job as `failed` with the
    /// progress of the last checkpoint reached.
    pub async fn run(&self, job_id: &str, request: &JobRequest, store: &JobStore) {
        info!(job_id, url = %request.source_url, "Download job started");

        // Rejected before the job leaves pending
        if let Err(e) = validate_filename(request.filename.as_deref()) {
            return self.fail(job_id, store, e).await;
        }

        match self.execute(job_id, request, store).await {
            Ok((path, bytes)) => {
                let path = path.display().to_string();
                record(store, job_id, JobPatch::complete(path.clone(), bytes)).await;
                self.metrics.job_completed(bytes);
                info!(job_id, path = %path, bytes, "Download job completed");
            }
            Err(e) => self.fail(job_id, store, e).await,
        }
    }

    async fn execute(
        &self,
        job_id: &str,
        request: &JobRequest,
        store: &JobStore,
    ) -> Result<(PathBuf, u64)> {
        record(store, job_id, JobPatch::progress(0, "Resolving track")).await;

        let track = self.resolver.resolve_track(&request.source_url).await?;
        record(store, job_id, JobPatch::progress(25, "Track info extracted")).await;
        info!(job_id, track_id = %track.track_id, progress = 25, "Track info extracted");

        let stream_url = self.resolver.get_stream_url(&track).await?;
        record(store, job_id, JobPatch::progress(50, "Stream URL obtained")).await;
        info!(job_id, progress = 50, "Stream URL obtained");

        let path = self.output_path(request, &track.track_id);
        record(store, job_id, JobPatch::progress(75, "Downloading file")).await;
        info!(job_id, path = %path.display(), progress = 75, "Downloading file");

        let bytes = self.fetcher.download(&stream_url, &path).await?;
        Ok((path, bytes))
    }

    /// Resolve and download `request` in the calling task, without a job
    /// record. Used by the one-shot `fetch` command.
    pub async fn fetch_direct(
        &self,
        request: &JobRequest,
        mut on_event: impl FnMut(FetchEvent<'_>),
    ) -> Result<(PathBuf, u64)> {
        validate_filename(request.filename.as_deref())?;

        let track = self.resolver.resolve_track(&request.source_url).await?;
        on_event(FetchEvent::TrackResolved {
            track_id: &track.track_id,
        });

        let stream_url = self.resolver.get_stream_url(&track).await?;
        on_event(FetchEvent::StreamFound);

        let path = self.output_path(request, &track.track_id);
        on_event(FetchEvent::Downloading { path: &path });

        let bytes = self.fetcher.download(&stream_url, &path).await?;
        info!(path = %path.display(), bytes, "Direct fetch completed");
        Ok((path, bytes))
    }

    fn output_path(&self, request: &JobRequest, track_id: &str) -> PathBuf {
        output_path(
            request.output_directory.as_deref(),
            request.filename.as_deref(),
            track_id,
            &self.default_output_dir,
        )
    }

    async fn fail(&self, job_id: &str, store: &JobStore, err: DownloadError) {
        error!(job_id, code = err.code(), error = %err, "Download job failed");
        record(store, job_id, JobPatch::fail(err.to_string())).await;
        self.metrics.job_failed();
    }
}

/// Apply a checkpoint. A rejected patch (the store already warned about it)
/// does not stop the runner; the record simply keeps its earlier state.
async fn record(store: &JobStore, job_id: &str, patch: JobPatch) {
    if let Err(e) = store.mutate(job_id, patch).await {
        debug!(job_id, error = %e, "Checkpoint not recorded");
    }
}
