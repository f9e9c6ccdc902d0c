use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use fv_service::UpdateMode;
use fv_types::{Feature, FeatureId, FeatureInput, VoteDirection};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::params::{self, LimitParams, ListParams};
use crate::state::AppState;

pub const FEATURES_PATH: &str = "/v1/features/";

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Paginated list body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteResponse {
    pub id: FeatureId,
    pub votes: u64,
    pub message: String,
}

impl VoteResponse {
    fn new(feature: &Feature, direction: VoteDirection) -> Self {
        Self {
            id: feature.id,
            votes: feature.votes,
            message: format!("Feature {} successfully", direction.past_tense()),
        }
    }
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

pub async fn list_features(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<ListResponse>> {
    let request = params::query(query)?.parse()?;
    blocking(move || {
        let search = request.search.as_deref().filter(|s| !s.is_empty());
        let page = state.queries.list(search, request.page)?;
        let next = page.has_next().then(|| page_link(page.page + 1, search));
        let previous = page.has_previous().then(|| page_link(page.page - 1, search));
        Ok(Json(ListResponse {
            count: page.count,
            next,
            previous,
            results: page.results,
        }))
    })
    .await
}

/// Relative link to another page of the same listing.
pub fn page_link(page: u64, search: Option<&str>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("page", &page.to_string());
    if let Some(term) = search {
        query.append_pair("search", term);
    }
    format!("{FEATURES_PATH}?{}", query.finish())
}

/// Run store work on the blocking pool; journal writes may fsync.
async fn blocking<T, F>(work: F) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> ApiResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        tracing::error!(error = %e, "store task failed");
        ApiError::Internal(e.to_string())
    })?
}

pub async fn create_feature(
    State(state): State<AppState>,
    body: Result<Json<FeatureInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Feature>)> {
    let input = json_body(body)?;
    let feature = blocking(move || Ok(state.features.create(input)?)).await?;
    Ok((StatusCode::CREATED, Json(feature)))
}

pub async fn get_feature(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Feature>> {
    let id = params::feature_id(&id)?;
    blocking(move || Ok(Json(state.features.get(id)?))).await
}

pub async fn replace_feature(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<FeatureInput>, JsonRejection>,
) -> ApiResult<Json<Feature>> {
    update(state, &id, body, UpdateMode::Full).await
}

pub async fn patch_feature(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<FeatureInput>, JsonRejection>,
) -> ApiResult<Json<Feature>> {
    update(state, &id, body, UpdateMode::Partial).await
}

async fn update(
    state: AppState,
    raw_id: &str,
    body: Result<Json<FeatureInput>, JsonRejection>,
    mode: UpdateMode,
) -> ApiResult<Json<Feature>> {
    let id = params::feature_id(raw_id)?;
    let input = json_body(body)?;
    blocking(move || Ok(Json(state.features.update(id, input, mode)?))).await
}

pub async fn delete_feature(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id = params::feature_id(&id)?;
    blocking(move || {
        state.features.delete(id)?;
        Ok(StatusCode::NO_CONTENT)
    })
    .await
}

pub async fn upvote_feature(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<VoteResponse>> {
    vote(state, &id, VoteDirection::Up).await
}

pub async fn downvote_feature(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<VoteResponse>> {
    vote(state, &id, VoteDirection::Down).await
}

async fn vote(state: AppState, raw_id: &str, direction: VoteDirection) -> ApiResult<Json<VoteResponse>> {
    let id = params::feature_id(raw_id)?;
    blocking(move || {
        let feature = state.features.vote(id, direction)?;
        Ok(Json(VoteResponse::new(&feature, direction)))
    })
    .await
}

pub async fn top_voted(
    State(state): State<AppState>,
    query: Result<Query<LimitParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Feature>>> {
    let limit = params::query(query)?.parse()?;
    blocking(move || Ok(Json(state.queries.top_voted(limit)?))).await
}

pub async fn recent(
    State(state): State<AppState>,
    query: Result<Query<LimitParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Feature>>> {
    let limit = params::query(query)?.parse()?;
    blocking(move || Ok(Json(state.queries.recent(limit)?))).await
}

fn json_body(body: Result<Json<FeatureInput>, JsonRejection>) -> ApiResult<FeatureInput> {
    body.map(|Json(input)| input).map_err(|rejection| {
        tracing::debug!(%rejection, "rejected request body");
        ApiError::Malformed(rejection.body_text())
    })
}
