use std::sync::Arc;

use axum::{
    http::{StatusCode, Uri},
    response::Response,
    Extension,
};
use modkit::{created_json, no_content, ok_json, ApiResult, Json, Path, Problem, Query};
use tracing::{error, info};

use crate::api::rest::dto::{
    CreateEventReq, CreateUserReq, EventDto, ListEventsQuery, ListUsersQuery, UpdateUserReq,
    UserDto,
};
use crate::api::rest::error::map_domain_error;
use crate::contract::model::UserFilter;
use crate::domain::service::Service;

/// List users, optionally filtered
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Page of users ordered by id", body = [UserDto]),
        (status = 422, description = "Malformed query", body = Problem),
    )
)]
pub async fn list_users(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Response> {
    info!("Listing users with query: {:?}", query);

    let filter = UserFilter::from(&query);
    match svc.list_users(filter, query.skip, query.limit).await {
        Ok(users) => {
            let dto_users: Vec<UserDto> = users.into_iter().map(UserDto::from).collect();
            Ok(ok_json(dto_users))
        }
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserDto),
        (status = 404, description = "No such user", body = Problem),
    )
)]
pub async fn get_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
) -> ApiResult<Response> {
    info!("Getting user with id: {}", id);

    match svc.get_user(id).await {
        Ok(user) => Ok(ok_json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserReq,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 400, description = "Email already registered", body = Problem),
        (status = 422, description = "Validation failed", body = Problem),
    )
)]
pub async fn create_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Json(req_body): Json<CreateUserReq>,
) -> ApiResult<Response> {
    info!("Creating user: {:?}", req_body);

    match svc.create_user(req_body.into()).await {
        Ok(user) => Ok(created_json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Partially update an existing user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    request_body = UpdateUserReq,
    responses(
        (status = 200, description = "Updated user", body = UserDto),
        (status = 400, description = "Email already registered", body = Problem),
        (status = 404, description = "No such user", body = Problem),
        (status = 422, description = "Validation failed", body = Problem),
    )
)]
pub async fn update_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
    Json(req_body): Json<UpdateUserReq>,
) -> ApiResult<Response> {
    info!("Updating user {} with: {:?}", id, req_body);

    match svc.update_user(id, req_body.into()).await {
        Ok(user) => Ok(ok_json(UserDto::from(user))),
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
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "No such user", body = Problem),
    )
)]
pub async fn delete_user(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
) -> ApiResult<Response> {
    info!("Deleting user: {}", id);

    match svc.delete_user(id).await {
        Ok(true) => Ok(no_content()),
        Ok(false) => Err(Problem::coded(
            StatusCode::NOT_FOUND,
            "USERS_NOT_FOUND",
            "User not found",
            format!("User with id {id} was not found"),
            uri.path(),
        )
        .into()),
        Err(e) => {
            error!("Failed to delete user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List events in creation order
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    params(ListEventsQuery),
    responses(
        (status = 200, description = "Page of events ordered by id", body = [EventDto]),
        (status = 422, description = "Malformed query", body = Problem),
    )
)]
pub async fn list_events(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Query(query): Query<ListEventsQuery>,
) -> ApiResult<Response> {
    info!("Listing events with query: {:?}", query);

    match svc.list_events(query.skip, query.limit).await {
        Ok(events) => {
            let dto_events: Vec<EventDto> = events.into_iter().map(EventDto::from).collect();
            Ok(ok_json(dto_events))
        }
        Err(e) => {
            error!("Failed to list events: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Get a specific event by ID
#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = "events",
    params(("id" = i32, Path, description = "Event id")),
    responses(
        (status = 200, description = "The event", body = EventDto),
        (status = 404, description = "No such event", body = Problem),
    )
)]
pub async fn get_event(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<i32>,
) -> ApiResult<Response> {
    info!("Getting event with id: {}", id);

    match svc.get_event(id).await {
        Ok(event) => Ok(ok_json(EventDto::from(event))),
        Err(e) => {
            error!("Failed to get event {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Create a new event
#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    request_body = CreateEventReq,
    responses(
        (status = 201, description = "Event created", body = EventDto),
        (status = 422, description = "Validation failed", body = Problem),
    )
)]
pub async fn create_event(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    Json(req_body): Json<CreateEventReq>,
) -> ApiResult<Response> {
    info!("Creating event: {:?}", req_body);

    match svc.create_event(req_body.into()).await {
        Ok(event) => Ok(created_json(EventDto::from(event))),
        Err(e) => {
            error!("Failed to create event: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
