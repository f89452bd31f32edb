use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::contract::model::{Event, NewEvent, NewUser, User, UserFilter, UserPatch, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRoleDto {
    Admin,
    #[default]
    Member,
    Guest,
}

/// REST DTO for user representation with serde/utoipa
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub role: UserRoleDto,
    pub is_active: bool,
    pub date_of_birth: Option<NaiveDate>,
    pub join_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for creating a new user
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserReq {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub role: UserRoleDto,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    pub password: String,
}

// Handlers log requests with `{:?}`; keep the password out of the logs.
impl std::fmt::Debug for CreateUserReq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserReq")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("role", &self.role)
            .field("password", &"***")
            .finish_non_exhaustive()
    }
}

/// REST DTO for updating a user (partial).
///
/// For nullable fields a missing key leaves the value alone while an explicit
/// `null` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserReq {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub phone_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub address2: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub state: Option<Option<String>>,
    #[serde(default)]
    pub role: Option<UserRoleDto>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_birth: Option<Option<NaiveDate>>,
}

/// Present key (even `null`) becomes `Some`, absent key stays `None` via `default`.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Query parameters for `GET /users`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Number of rows to skip.
    #[serde(default)]
    pub skip: u64,
    /// Page size; defaults to 100 and is capped by the server.
    pub limit: Option<u64>,
    pub role: Option<UserRoleDto>,
    pub is_active: Option<bool>,
    /// Case-insensitive substring of the city.
    pub city: Option<String>,
    /// Case-insensitive substring of the state.
    pub state: Option<String>,
}

/// REST DTO for event representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventDto {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for creating an event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEventReq {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// RFC 3339 timestamp; a timestamp without offset is taken as UTC.
    #[serde(deserialize_with = "deserialize_event_date")]
    pub event_date: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
}

fn deserialize_event_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(|_| {
            serde::de::Error::custom(format!("invalid event_date '{raw}': expected an ISO 8601 timestamp"))
        })
}

/// Query parameters for `GET /events`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListEventsQuery {
    #[serde(default)]
    pub skip: u64,
    pub limit: Option<u64>,
}

// Conversion implementations between REST DTOs and contract models

impl From<UserRole> for UserRoleDto {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Self::Admin,
            UserRole::Member => Self::Member,
            UserRole::Guest => Self::Guest,
        }
    }
}

impl From<UserRoleDto> for UserRole {
    fn from(role: UserRoleDto) -> Self {
        match role {
            UserRoleDto::Admin => Self::Admin,
            UserRoleDto::Member => Self::Member,
            UserRoleDto::Guest => Self::Guest,
        }
    }
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            address: user.address,
            address2: user.address2,
            city: user.city,
            state: user.state,
            role: user.role.into(),
            is_active: user.is_active,
            date_of_birth: user.date_of_birth,
            join_date: user.join_date,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<CreateUserReq> for NewUser {
    fn from(req: CreateUserReq) -> Self {
        Self {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
            address: req.address,
            address2: req.address2,
            city: req.city,
            state: req.state,
            role: req.role.into(),
            date_of_birth: req.date_of_birth,
            password: req.password,
        }
    }
}

impl From<UpdateUserReq> for UserPatch {
    fn from(req: UpdateUserReq) -> Self {
        Self {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
            address: req.address,
            address2: req.address2,
            city: req.city,
            state: req.state,
            role: req.role.map(Into::into),
            is_active: req.is_active,
            date_of_birth: req.date_of_birth,
        }
    }
}

impl From<&ListUsersQuery> for UserFilter {
    fn from(q: &ListUsersQuery) -> Self {
        Self {
            role: q.role.map(Into::into),
            is_active: q.is_active,
            city: q.city.clone(),
            state: q.state.clone(),
        }
    }
}

impl From<Event> for EventDto {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            event_date: event.event_date,
            location: event.location,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

impl From<CreateEventReq> for NewEvent {
    fn from(req: CreateEventReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
            event_date: req.event_date,
            location: req.location,
        }
    }
}
