use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Mount the user and event routes on `router`.
///
/// Collection routes answer with and without a trailing slash.
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    let api = Router::new()
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/users/",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route(
            "/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route(
            "/events/",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route("/events/{id}", get(handlers::get_event))
        .layer(Extension(service));

    router.merge(api)
}

