//! Pemilu Client - API client for the Pemilu online voting backend
//!
//! Wraps the backend's HTTP API with a single authenticated client that
//! attaches the session bearer token and the Sanctum XSRF token, decodes
//! JSON responses, and clears the session when the server answers 401.
//! Service structs shape each endpoint call; `stats` aggregates results for
//! the admin dashboard.

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod services;
pub mod session;
pub mod stats;

pub use error::{ClientError, Result};
pub use http::ApiClient;
pub use services::Services;
