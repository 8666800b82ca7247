pub mod health;
pub mod posting;

use axum::{routing::get, Json, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::dto::posting_dto::{
    PostingCreatedResponse, PostingDeletedResponse, PostingDraft, PostingListResponse,
    PostingResponse, PostingSummary, StatsResponse, WorkLocationDraft,
};
use crate::models::posting::{
    ContractLength, JobType, PostingFields, PostingStatus, RetentionWindow, VisaType,
    WorkLocation,
};
use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        posting::create_posting,
        posting::list_postings,
        posting::get_posting,
        posting::update_posting,
        posting::delete_posting,
        posting::get_stats,
    ),
    components(schemas(
        PostingDraft,
        WorkLocationDraft,
        PostingFields,
        WorkLocation,
        JobType,
        ContractLength,
        VisaType,
        RetentionWindow,
        PostingStatus,
        PostingResponse,
        PostingSummary,
        PostingCreatedResponse,
        PostingDeletedResponse,
        PostingListResponse,
        StatsResponse,
    ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route(
            "/api/jobs",
            get(posting::list_postings).post(posting::create_posting),
        )
        .route(
            "/api/jobs/:id",
            get(posting::get_posting)
                .put(posting::update_posting)
                .patch(posting::update_posting)
                .delete(posting::delete_posting),
        )
        .route("/api/stats", get(posting::get_stats))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
