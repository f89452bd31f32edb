//! SeaORM entities for the `users` and `events` tables.
//!
//! Entities are storage shapes only; conversion to the contract models lives
//! next to each entity.

pub mod events;
pub mod users;
