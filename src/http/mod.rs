//! HTTP layer: authenticated client and anti-forgery handling

pub mod client;
pub mod xsrf;
pub use client::{parse_method, ApiClient, RequestBody, RequestOptions, SESSION_EXPIRED_REDIRECT};
