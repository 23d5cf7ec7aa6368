//! # API Shared
//!
//! Shared request/response types for the patient management APIs.
//!
//! Contains:
//! - Serde + OpenAPI schema types for the REST surface (`dto` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `pms-run` binary.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
