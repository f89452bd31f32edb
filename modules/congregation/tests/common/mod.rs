#![allow(dead_code)]

use std::sync::Arc;

use congregation::config::CongregationConfig;
use congregation::contract::model::{NewEvent, NewUser, UserRole};
use congregation::domain::service::Service;
use congregation::Congregation;
use modkit_db::{ConnectOpts, DbHandle};

/// Fresh in-memory database with the schema applied.
pub async fn test_db() -> DbHandle {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("Failed to connect to test database");
    Congregation::migrate(&db)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn test_module_with(cfg: CongregationConfig) -> (DbHandle, Congregation) {
    let db = test_db().await;
    let module = Congregation::init(&db, cfg).expect("module init");
    (db, module)
}

pub async fn test_module() -> (DbHandle, Congregation) {
    test_module_with(CongregationConfig::default()).await
}

/// The handle owns the pool, so it is returned alongside the service.
pub async fn test_service() -> (DbHandle, Arc<Service>) {
    let (db, module) = test_module().await;
    (db, module.service())
}

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        first_name: "john".to_string(),
        last_name: "doe".to_string(),
        phone_number: Some("+1234567890".to_string()),
        address: Some("123 Main Street".to_string()),
        address2: None,
        city: Some("New York".to_string()),
        state: Some("NY".to_string()),
        role: UserRole::Member,
        date_of_birth: None,
        password: "securepassword123".to_string(),
    }
}

pub fn new_event(title: &str) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        description: Some("Weekly worship".to_string()),
        event_date: "2025-06-01T10:00:00Z".parse().expect("valid timestamp"),
        location: Some("Main Sanctuary".to_string()),
    }
}
