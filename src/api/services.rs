use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

use super::{
    error::ApiError,
    models::{
        DownloadRequest, DownloadResponse, HealthResponse, ListRequest, ListResponse,
        STATUS_STARTED, StatusResponse,
    },
    state::AppState,
    validation::{validate_download_id, validate_download_request},
};
use crate::jobs::JobRecord;

/// Accept a download job.
///
/// Validates the URL, records the job as `pending` and schedules its runner.
/// Returns as soon as the job is stored; no network I/O happens here.
pub async fn start_download(
    state: &AppState,
    request: DownloadRequest,
) -> Result<DownloadResponse, ApiError> {
    validate_download_request(&request, &state.config.upstream.page_host)?;

    let download_id = new_download_id();
    state
        .store
        .insert(JobRecord::pending(&download_id, &request.soundcloud_url))
        .await?;
    state.metrics.job_started();

    info!(download_id = %download_id, url = %request.soundcloud_url, "Download accepted");

    let _runner = state.pipeline.spawn(
        download_id.clone(),
        request.into_job_request(),
        state.store.clone(),
    );

    Ok(DownloadResponse {
        download_id,
        status: STATUS_STARTED.to_string(),
        message: "Download started".to_string(),
    })
}

/// Snapshot of one job.
pub async fn download_status(
    state: &AppState,
    download_id: &str,
) -> Result<StatusResponse, ApiError> {
    validate_download_id(download_id)?;
    let record = state.store.get(download_id).await?;
    Ok(record.into())
}

/// Page through jobs in creation order. `total_count` always counts every
/// stored job.
pub async fn list_downloads(state: &AppState, request: ListRequest) -> ListResponse {
    let limit = usize::try_from(request.limit).ok().filter(|limit| *limit > 0);
    let offset = usize::try_from(request.offset).unwrap_or(0);

    let page = state.store.list(limit, offset).await;
    ListResponse {
        downloads: page.records.into_iter().map(Into::into).collect(),
        total_count: i32::try_from(page.total_count).unwrap_or(i32::MAX),
    }
}

/// Time-ordered, process-unique job id.
fn new_download_id() -> String {
    format!("dl_{}", Uuid::now_v7().simple())
}

/// POST /downloads
pub async fn start(
    State(state): State<AppState>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidArgument(e.body_text()))?;
    let response = start_download(&state, request).await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// GET /downloads/{download_id}
pub async fn status(
    State(state): State<AppState>,
    Path(download_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let response = download_status(&state, &download_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// GET /downloads/ (no id in the path)
pub async fn status_without_id(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let response = download_status(&state, "").await?;
    Ok((StatusCode::OK, Json(response)))
}

/// GET /downloads?limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    Query(request): Query<ListRequest>,
) -> impl IntoResponse {
    Json(list_downloads(&state, request).await)
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        counters: state.metrics.snapshot(),
    };

    (StatusCode::OK, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_state() -> AppState {
        AppState::new(Config::default()).unwrap()
    }

    #[test]
    fn test_download_ids_are_unique() {
        let ids: Vec<String> = (0..100).map(|_| new_download_id()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
        assert!(ids.iter().all(|id| id.starts_with("dl_")));
    }

    #[tokio::test]
    async fn test_start_rejects_empty_url_without_creating_job() {
        let state = test_state();
        let err = start_download(&state, DownloadRequest::new(""))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidArgument(_)));
        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_start_rejects_foreign_host() {
        let state = test_state();
        let err = start_download(&state, DownloadRequest::new("https://example.com/a/1"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "invalid SoundCloud URL");
        assert!(state.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_status_validation() {
        let state = test_state();

        let err = download_status(&state, "").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));

        let err = download_status(&state, "dl_unknown").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_counts_all_jobs_regardless_of_limit() {
        let state = test_state();
        for i in 0..3 {
            state
                .store
                .insert(JobRecord::pending(format!("dl_{i}"), "u"))
                .await
                .unwrap();
        }

        let zero = list_downloads(&state, ListRequest { limit: 0, offset: 0 }).await;
        assert_eq!(zero.total_count, 3);
        assert_eq!(zero.downloads.len(), 3);

        let negative = list_downloads(&state, ListRequest { limit: -1, offset: -5 }).await;
        assert_eq!(negative.downloads.len(), 3);

        let limited = list_downloads(&state, ListRequest { limit: 2, offset: 2 }).await;
        assert_eq!(limited.total_count, 3);
        assert_eq!(limited.downloads.len(), 1);
        assert_eq!(limited.downloads[0].download_id, "dl_2");
    }
}
