//! # PMS Core
//!
//! Core business logic for the patient management system.
//!
//! This crate contains pure data operations and file storage:
//! - Patient record types with derived BMI and health verdict
//! - The [`PatientRepository`] single-file store with atomic writes,
//!   single-generation backup, and corruption recovery
//! - Startup-resolved [`CoreConfig`]
//!
//! **No API concerns**: HTTP servers, request validation envelopes, and
//! OpenAPI documentation belong in `api-rest` and `api-shared`.

pub mod config;
pub mod error;
pub mod patient;
pub mod store;

pub use config::{recovery_policy_from_env_value, CoreConfig, RecoveryPolicy, DEFAULT_STORE_FILE};
pub use error::{PatientError, PatientResult};
pub use patient::{Gender, PatientRecord, PatientUpdate, Verdict};
pub use store::{PatientRepository, Store, TxFailure};
