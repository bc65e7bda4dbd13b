use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use chrono::Utc;
use tracing::{error, info};

use crate::api::rest::dto::{
    BlockReq, BlockResultDto, CreateUserReq, HealthDto, MessageDto, SearchUsersQuery,
    UpdateUserReq, UserDto,
};
use crate::api::rest::error::{json_rejection, map_domain_error, path_rejection, query_rejection};
use crate::api::rest::problem::{Problem, ProblemResponse};
use crate::api::rest::token::RequestingUser;
use crate::domain::service::Service;

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    operation_id = "users_directory.create_user",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "Created user", body = UserDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Conflict", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn create_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<CreateUserReq>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    let Json(req_body) = payload.map_err(|r| json_rejection(r, uri.path()))?;
    info!("Creating user: {}", req_body.username);

    match svc.create_user(req_body.into()).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserDto::from(user)))),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List every user
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    operation_id = "users_directory.list_users",
    responses(
        (status = 200, description = "All users", body = [UserDto]),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn list_users(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
) -> Result<Json<Vec<UserDto>>, ProblemResponse> {
    match svc.list_users().await {
        Ok(users) => Ok(Json(users.into_iter().map(UserDto::from).collect())),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Search users visible to the caller
#[utoipa::path(
    get,
    path = "/users/search",
    tag = "users",
    operation_id = "users_directory.search_users",
    params(SearchUsersQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Matching users", body = [UserDto]),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Requesting user not found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn search_users(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    RequestingUser(requester): RequestingUser,
    query: Result<Query<SearchUsersQuery>, QueryRejection>,
) -> Result<Json<Vec<UserDto>>, ProblemResponse> {
    let Query(query) = query.map_err(|r| query_rejection(r, uri.path()))?;
    info!("Searching users: {:?}", query);

    let result = match query.into_criteria() {
        Ok(criteria) => svc.search_users(criteria, requester).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(users) => Ok(Json(users.into_iter().map(UserDto::from).collect())),
        Err(e) => {
            error!("Failed to search users: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    operation_id = "users_directory.get_user",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn get_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<UserDto>, ProblemResponse> {
    let Path(id) = id.map_err(|r| path_rejection(r, uri.path()))?;
    info!("Getting user with id: {}", id);

    match svc.get_user(id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Update an existing user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    operation_id = "users_directory.update_user",
    params(("id" = i32, Path, description = "User id")),
    request_body = UpdateUserReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 409, description = "Conflict", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn update_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateUserReq>, JsonRejection>,
) -> Result<Json<UserDto>, ProblemResponse> {
    let Path(id) = id.map_err(|r| path_rejection(r, uri.path()))?;
    let Json(req_body) = payload.map_err(|r| json_rejection(r, uri.path()))?;
    info!("Updating user {} with: {:?}", id, req_body);

    match svc.update_user(id, req_body.into()).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to update user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Delete a user by ID
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    operation_id = "users_directory.delete_user",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Internal Server Error", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn delete_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageDto>, ProblemResponse> {
    let Path(id) = id.map_err(|r| path_rejection(r, uri.path()))?;
    info!("Deleting user: {}", id);

    match svc.delete_user(id).await {
        Ok(()) => Ok(Json(MessageDto {
            message: format!("User {id} deleted"),
        })),
        Err(e) => {
            error!("Failed to delete user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Block a user
#[utoipa::path(
    post,
    path = "/block",
    tag = "blocks",
    operation_id = "users_directory.block_user",
    request_body = BlockReq,
    responses(
        (status = 201, description = "Block recorded", body = BlockResultDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn block_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<BlockReq>, JsonRejection>,
) -> Result<(StatusCode, Json<BlockResultDto>), ProblemResponse> {
    let Json(req) = payload.map_err(|r| json_rejection(r, uri.path()))?;
    info!("User {} blocks {}", req.blocker_id, req.blocked_id);

    match svc.block_user(req.blocker_id, req.blocked_id).await {
        Ok(blocks) => Ok((
            StatusCode::CREATED,
            Json(BlockResultDto {
                message: format!("User {} blocked", req.blocked_id),
                result: blocks.into(),
            }),
        )),
        Err(e) => {
            error!("Failed to block user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Remove a block
#[utoipa::path(
    delete,
    path = "/block",
    tag = "blocks",
    operation_id = "users_directory.unblock_user",
    request_body = BlockReq,
    responses(
        (status = 200, description = "Block removed", body = MessageDto),
        (status = 400, description = "Bad Request", body = Problem, content_type = "application/problem+json"),
        (status = 404, description = "Not Found", body = Problem, content_type = "application/problem+json"),
    )
)]
pub async fn unblock_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    payload: Result<Json<BlockReq>, JsonRejection>,
) -> Result<Json<MessageDto>, ProblemResponse> {
    let Json(req) = payload.map_err(|r| json_rejection(r, uri.path()))?;
    info!("User {} unblocks {}", req.blocker_id, req.blocked_id);

    match svc.unblock_user(req.blocker_id, req.blocked_id).await {
        Ok(_) => Ok(Json(MessageDto {
            message: format!("User {} unblocked", req.blocked_id),
        })),
        Err(e) => {
            error!("Failed to unblock user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    operation_id = "users_directory.health",
    responses((status = 200, description = "Service is up", body = HealthDto))
)]
pub async fn health() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
        timestamp: Utc::now(),
    })
}
