//! Request extractors.

pub mod json;
pub mod query;
pub use json::{check_content_type, JsonPayload, JSON_CONTENT_TYPE};
pub use query::QueryParams;
