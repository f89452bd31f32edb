//! REST building blocks: problem responses, response helpers and
//! problem-aware extractors.

pub mod extract;
pub mod problem;
pub mod response;

pub use problem::{Problem, ProblemResponse, APPLICATION_PROBLEM_JSON};
pub use response::{created_json, no_content, ok_json, ApiResult};
