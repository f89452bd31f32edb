pub mod client;
pub mod error;
pub mod model;

pub use client::CongregationApi;
pub use error::CongregationError;
pub use model::{Event, NewEvent, NewUser, User, UserFilter, UserPatch, UserRole};
