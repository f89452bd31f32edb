use modkit::{Problem, ValidationError};
use utoipa::OpenApi;

use crate::api::rest::dto::{
    CreateEventReq, CreateUserReq, EventDto, UpdateUserReq, UserDto, UserRoleDto,
};
use crate::api::rest::handlers;

#[derive(OpenApi)]
#[openapi(
    info(title = "Church App API", description = "Members and events of the congregation"),
    paths(
        handlers::list_users,
        handlers::get_user,
        handlers::create_user,
        handlers::update_user,
        handlers::delete_user,
        handlers::list_events,
        handlers::get_event,
        handlers::create_event,
    ),
    components(schemas(
        UserDto,
        UserRoleDto,
        CreateUserReq,
        UpdateUserReq,
        EventDto,
        CreateEventReq,
        Problem,
        ValidationError,
    )),
    tags(
        (name = "users", description = "Church members"),
        (name = "events", description = "Services and gatherings"),
    )
)]
pub struct CongregationApiDoc;
