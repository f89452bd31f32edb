use async_trait::async_trait;

use crate::contract::{
    error::CongregationError,
    model::{Event, NewEvent, NewUser, User, UserFilter, UserPatch},
};

/// Public API of the congregation module for in-process consumers.
#[async_trait]
pub trait CongregationApi: Send + Sync {
    async fn get_user(&self, id: i32) -> Result<User, CongregationError>;

    /// Exact, case-sensitive email lookup.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, CongregationError>;

    /// `limit` falls back to the configured page size and is capped by the maximum.
    async fn list_users(
        &self,
        filter: UserFilter,
        skip: u64,
        limit: Option<u64>,
    ) -> Result<Vec<User>, CongregationError>;

    async fn create_user(&self, new_user: NewUser) -> Result<User, CongregationError>;

    async fn update_user(&self, id: i32, patch: UserPatch) -> Result<User, CongregationError>;

    /// Returns `false` when no user had this id.
    async fn delete_user(&self, id: i32) -> Result<bool, CongregationError>;

    async fn create_event(&self, new_event: NewEvent) -> Result<Event, CongregationError>;

    async fn get_event(&self, id: i32) -> Result<Event, CongregationError>;

    async fn list_events(&self, skip: u64, limit: Option<u64>)
        -> Result<Vec<Event>, CongregationError>;
}
