use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use utoipa::OpenApi;

use crate::api::rest::handlers;
use crate::api::rest::openapi::ApiDoc;
use crate::api::rest::token::TokenDecoder;
use crate::domain::service::Service;

/// All routes of the directory, without the outer HTTP middleware.
pub fn register_routes(router: Router, service: Arc<Service>, tokens: TokenDecoder) -> Router {
    router
        .route(
            "/users",
            post(handlers::create_user).get(handlers::list_users),
        )
        .route("/users/search", get(handlers::search_users))
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route(
            "/block",
            post(handlers::block_user).delete(handlers::unblock_user),
        )
        .route("/health", get(handlers::health))
        .route("/openapi.json", get(openapi_json))
        .layer(Extension(service))
        .layer(Extension(tokens))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
