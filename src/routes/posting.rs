use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{
    dto::posting_dto::{
        PostingCreatedResponse, PostingDeletedResponse, PostingDraft, PostingListQuery,
        PostingListResponse, PostingResponse, StatsResponse,
    },
    error::{Error, Result},
    AppState,
};

type DraftBody = std::result::Result<Json<JsonValue>, JsonRejection>;
type PostingId = std::result::Result<Path<Uuid>, PathRejection>;

/// Mistyped fields become validation messages instead of rejecting the body outright.
fn draft_from(body: DraftBody) -> Result<PostingDraft> {
    let Json(body) = body.map_err(|rejection| Error::BadRequest(rejection.body_text()))?;
    PostingDraft::from_json(body)
}

fn posting_id(path: PostingId) -> Result<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|_| Error::BadRequest("Job posting id must be a UUID".to_string()))
}

#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = PostingDraft,
    responses(
        (status = 201, description = "Job posting created", body = PostingCreatedResponse),
        (status = 400, description = "Validation failed")
    )
)]
#[axum::debug_handler]
pub async fn create_posting(
    State(state): State<AppState>,
    body: DraftBody,
) -> Result<impl IntoResponse> {
    let posting = state.posting_service.create(draft_from(body)?).await?;
    tracing::info!(id = %posting.id, company = %posting.fields.recruiter_company, "job posting created");
    Ok((StatusCode::CREATED, Json(PostingCreatedResponse::from(posting))))
}

#[utoipa::path(
    get,
    path = "/api/jobs",
    params(PostingListQuery),
    responses(
        (status = 200, description = "Active job postings, contact details omitted", body = PostingListResponse),
        (status = 400, description = "Unknown filter value")
    )
)]
#[axum::debug_handler]
pub async fn list_postings(
    State(state): State<AppState>,
    Query(query): Query<PostingListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.posting_service.list(query).await?;
    Ok(Json(PostingListResponse::from(result)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job posting ID")
    ),
    responses(
        (status = 200, description = "Job posting found", body = PostingResponse),
        (status = 400, description = "Malformed job posting ID"),
        (status = 404, description = "Job posting not found")
    )
)]
#[axum::debug_handler]
pub async fn get_posting(
    State(state): State<AppState>,
    id: PostingId,
) -> Result<impl IntoResponse> {
    let posting = state.posting_service.get_by_id(posting_id(id)?).await?;
    Ok(Json(PostingResponse::from(posting)))
}

#[utoipa::path(
    put,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job posting ID")
    ),
    request_body = PostingDraft,
    responses(
        (status = 200, description = "Job posting updated", body = PostingResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Job posting not found")
    )
)]
#[axum::debug_handler]
pub async fn update_posting(
    State(state): State<AppState>,
    id: PostingId,
    body: DraftBody,
) -> Result<impl IntoResponse> {
    let posting = state
        .posting_service
        .update(posting_id(id)?, draft_from(body)?)
        .await?;
    Ok(Json(PostingResponse::from(posting)))
}

#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job posting ID")
    ),
    responses(
        (status = 200, description = "Job posting marked inactive", body = PostingDeletedResponse),
        (status = 400, description = "Malformed job posting ID"),
        (status = 404, description = "Job posting not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_posting(
    State(state): State<AppState>,
    id: PostingId,
) -> Result<impl IntoResponse> {
    let posting = state.posting_service.soft_delete(posting_id(id)?).await?;
    tracing::info!(id = %posting.id, "job posting deactivated");
    Ok(Json(PostingDeletedResponse::new(posting.id)))
}

#[utoipa::path(
    get,
    path = "/api/stats",
    responses(
        (status = 200, description = "Statistics over active postings", body = StatsResponse)
    )
)]
#[axum::debug_handler]
pub async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.posting_service.stats().await?;
    Ok(Json(StatsResponse::from(stats)))
}
