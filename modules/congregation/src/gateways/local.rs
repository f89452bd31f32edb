use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::CongregationApi,
    error::CongregationError,
    model::{Event, NewEvent, NewUser, User, UserFilter, UserPatch},
};
use crate::domain::service::Service;

/// Local implementation of the CongregationApi trait that delegates to the domain service
pub struct CongregationLocalClient {
    service: Arc<Service>,
}

impl CongregationLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl CongregationApi for CongregationLocalClient {
    async fn get_user(&self, id: i32) -> Result<User, CongregationError> {
        self.service.get_user(id).await.map_err(Into::into)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, CongregationError> {
        self.service
            .get_user_by_email(email)
            .await
            .map_err(Into::into)
    }

    async fn list_users(
        &self,
        filter: UserFilter,
        skip: u64,
        limit: Option<u64>,
    ) -> Result<Vec<User>, CongregationError> {
        self.service
            .list_users(filter, skip, limit)
            .await
            .map_err(Into::into)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, CongregationError> {
        self.service.create_user(new_user).await.map_err(Into::into)
    }

    async fn update_user(&self, id: i32, patch: UserPatch) -> Result<User, CongregationError> {
        self.service
            .update_user(id, patch)
            .await
            .map_err(Into::into)
    }

    async fn delete_user(&self, id: i32) -> Result<bool, CongregationError> {
        self.service.delete_user(id).await.map_err(Into::into)
    }

    async fn create_event(&self, new_event: NewEvent) -> Result<Event, CongregationError> {
        self.service
            .create_event(new_event)
            .await
            .map_err(Into::into)
    }

    async fn get_event(&self, id: i32) -> Result<Event, CongregationError> {
        self.service.get_event(id).await.map_err(Into::into)
    }

    async fn list_events(
        &self,
        skip: u64,
        limit: Option<u64>,
    ) -> Result<Vec<Event>, CongregationError> {
        self.service
            .list_events(skip, limit)
            .await
            .map_err(Into::into)
    }
}
