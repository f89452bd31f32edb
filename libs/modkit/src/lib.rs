//! # ModKit - HTTP plumbing shared by modules
//!
//! Modules expose REST handlers built on axum. This crate gives them one
//! error body format (RFC 9457 Problem Details) and extractors whose
//! rejections render in that format too, so every non-2xx answer from the
//! server looks the same to clients.

pub mod api;

pub use api::extract::{Json, Path, Query};
pub use api::problem::{
    bad_request, internal_error, not_found, unprocessable, Problem, ProblemResponse,
    ValidationError,
};
pub use api::response::{created_json, no_content, ok_json, ApiResult};
