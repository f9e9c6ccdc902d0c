use axum::routing::{get, post};
use axum::Router;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with every feature-board endpoint under `/v1`.
///
/// Collection and record paths end in a slash.
pub fn build_router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/health", get(handler::health_handler))
        .route(
            "/features/",
            get(handler::list_features).post(handler::create_feature),
        )
        .route("/features/top_voted/", get(handler::top_voted))
        .route("/features/recent/", get(handler::recent))
        .route(
            "/features/:id/",
            get(handler::get_feature)
                .put(handler::replace_feature)
                .patch(handler::patch_feature)
                .delete(handler::delete_feature),
        )
        .route("/features/:id/upvote/", post(handler::upvote_feature))
        .route("/features/:id/downvote/", post(handler::downvote_feature));

    Router::new().nest("/v1", v1).with_state(state)
}
