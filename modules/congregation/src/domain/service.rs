use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::contract::model::{Event, NewEvent, NewUser, User, UserFilter, UserPatch};
use crate::domain::error::DomainError;
use crate::domain::repo::{EventDraft, EventsRepository, RepoError, UserDraft, UsersRepository};
use crate::domain::validation;

/// Domain service with business rules for users and events.
/// Depends only on the repository ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    users: Arc<dyn UsersRepository>,
    events: Arc<dyn EventsRepository>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: 100,
            max_page_size: 1000,
        }
    }
}

fn db_err(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        users: Arc<dyn UsersRepository>,
        events: Arc<dyn EventsRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users,
            events,
            config,
        }
    }

    /// Requested page size, defaulted and capped.
    fn page_size(&self, limit: Option<u64>) -> u64 {
        limit
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size)
    }

    /// Offsets past `i64::MAX` cannot be bound as SQL integers and would
    /// return nothing anyway.
    fn offset(skip: u64) -> u64 {
        skip.min(i64::MAX as u64)
    }

    #[instrument(name = "congregation.service.get_user_by_email", skip(self))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        debug!("Looking up user by email");
        self.users.find_by_email(email).await.map_err(db_err)
    }

    #[instrument(name = "congregation.service.get_user", skip(self), fields(user_id = id))]
    pub async fn get_user(&self, id: i32) -> Result<User, DomainError> {
        debug!("Getting user by id");

        let user = self
            .users
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::user_not_found(id))?;
        debug!("Successfully retrieved user");
        Ok(user)
    }

    #[instrument(name = "congregation.service.list_users", skip(self, filter))]
    pub async fn list_users(
        &self,
        filter: UserFilter,
        skip: u64,
        limit: Option<u64>,
    ) -> Result<Vec<User>, DomainError> {
        let limit = self.page_size(limit);
        let skip = Self::offset(skip);
        debug!(?filter, skip, limit, "Listing users");

        let users = self
            .users
            .list(&filter, skip, limit)
            .await
            .map_err(db_err)?;
        debug!("Successfully listed {} users", users.len());
        Ok(users)
    }

    #[instrument(
        name = "congregation.service.create_user",
        skip(self, new_user),
        fields(email = %new_user.email, role = %new_user.role)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        let new_user = validation::validate_new_user(new_user)?;

        if self
            .users
            .email_exists(&new_user.email)
            .await
            .map_err(db_err)?
        {
            return Err(DomainError::email_already_exists(new_user.email));
        }

        let now = Utc::now();
        let email = new_user.email.clone();
        let draft = UserDraft {
            email: new_user.email,
            password: new_user.password,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            phone_number: new_user.phone_number,
            address: new_user.address,
            address2: new_user.address2,
            city: new_user.city,
            state: new_user.state,
            role: new_user.role,
            is_active: true,
            date_of_birth: new_user.date_of_birth,
            join_date: now,
            created_at: now,
            updated_at: now,
        };

        let user = self.users.insert(draft).await.map_err(|e| match e {
            RepoError::UniqueViolation(_) => DomainError::email_already_exists(email),
            RepoError::NotFound => DomainError::database("insert reported no row"),
            RepoError::Other(e) => db_err(e),
        })?;

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(
        name = "congregation.service.update_user",
        skip(self, patch),
        fields(user_id = id)
    )]
    pub async fn update_user(&self, id: i32, patch: UserPatch) -> Result<User, DomainError> {
        info!("Updating user");

        let patch = validation::validate_user_patch(patch)?;

        let mut current = self
            .users
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        if let Some(ref new_email) = patch.email {
            if new_email != &current.email
                && self.users.email_exists(new_email).await.map_err(db_err)?
            {
                return Err(DomainError::email_already_exists(new_email.clone()));
            }
        }

        apply_patch(&mut current, patch);
        current.updated_at = Utc::now();

        let email = current.email.clone();
        // The row can disappear between the load and the write.
        let updated = self.users.update(current).await.map_err(|e| match e {
            RepoError::UniqueViolation(_) => DomainError::email_already_exists(email),
            RepoError::NotFound => DomainError::user_not_found(id),
            RepoError::Other(e) => db_err(e),
        })?;

        info!("Successfully updated user");
        Ok(updated)
    }

    /// Returns `false` when no user had this id.
    #[instrument(
        name = "congregation.service.delete_user",
        skip(self),
        fields(user_id = id)
    )]
    pub async fn delete_user(&self, id: i32) -> Result<bool, DomainError> {
        info!("Deleting user");

        let deleted = self.users.delete(id).await.map_err(db_err)?;
        if deleted {
            info!("Successfully deleted user");
        } else {
            debug!("No user to delete");
        }
        Ok(deleted)
    }

    #[instrument(
        name = "congregation.service.create_event",
        skip(self, new_event),
        fields(title = %new_event.title)
    )]
    pub async fn create_event(&self, new_event: NewEvent) -> Result<Event, DomainError> {
        info!("Creating new event");

        validation::validate_new_event(&new_event)?;

        let now = Utc::now();
        let event = self
            .events
            .insert(EventDraft {
                title: new_event.title,
                description: new_event.description,
                event_date: new_event.event_date,
                location: new_event.location,
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(db_err)?;

        info!("Successfully created event with id={}", event.id);
        Ok(event)
    }

    #[instrument(name = "congregation.service.get_event", skip(self), fields(event_id = id))]
    pub async fn get_event(&self, id: i32) -> Result<Event, DomainError> {
        debug!("Getting event by id");
        self.events
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::event_not_found(id))
    }

    #[instrument(name = "congregation.service.list_events", skip(self))]
    pub async fn list_events(&self, skip: u64, limit: Option<u64>) -> Result<Vec<Event>, DomainError> {
        let limit = self.page_size(limit);
        let skip = Self::offset(skip);
        debug!(skip, limit, "Listing events");

        let events = self.events.list(skip, limit).await.map_err(db_err)?;
        debug!("Successfully listed {} events", events.len());
        Ok(events)
    }
}

fn apply_patch(user: &mut User, patch: UserPatch) {
    if let Some(email) = patch.email {
        user.email = email;
    }
    if let Some(first_name) = patch.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = patch.last_name {
        user.last_name = last_name;
    }
    if let Some(phone_number) = patch.phone_number {
        user.phone_number = phone_number;
    }
    if let Some(address) = patch.address {
        user.address = address;
    }
    if let Some(address2) = patch.address2 {
        user.address2 = address2;
    }
    if let Some(city) = patch.city {
        user.city = city;
    }
    if let Some(state) = patch.state {
        user.state = state;
    }
    if let Some(role) = patch.role {
        user.role = role;
    }
    if let Some(is_active) = patch.is_active {
        user.is_active = is_active;
    }
    if let Some(date_of_birth) = patch.date_of_birth {
        user.date_of_birth = date_of_birth;
    }
}
