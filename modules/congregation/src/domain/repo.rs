use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::contract::model::{Event, User, UserFilter, UserRole};

/// Failure of a user write.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// The store rejected the write on a unique constraint.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    /// The row to update no longer exists.
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A validated user ready to be persisted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub date_of_birth: Option<NaiveDate>,
    pub join_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub event_date: DateTime<Utc>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Port for the domain layer: user persistence.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>>;
    /// Exact, case-sensitive match.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    /// Filtered page ordered by id.
    async fn list(&self, filter: &UserFilter, skip: u64, limit: u64) -> anyhow::Result<Vec<User>>;
    async fn insert(&self, draft: UserDraft) -> Result<User, RepoError>;
    /// Overwrite every profile column of `user.id`; the stored password is kept.
    async fn update(&self, user: User) -> Result<User, RepoError>;
    /// Returns true if a row was deleted.
    async fn delete(&self, id: i32) -> anyhow::Result<bool>;
}

/// Port for the domain layer: event persistence.
#[async_trait]
pub trait EventsRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Event>>;
    /// Page ordered by id.
    async fn list(&self, skip: u64, limit: u64) -> anyhow::Result<Vec<Event>>;
    async fn insert(&self, draft: EventDraft) -> anyhow::Result<Event>;
}
