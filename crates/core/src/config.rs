//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::{PatientError, PatientResult};
use std::path::{Path, PathBuf};

/// Default store filename, relative to the process working directory.
pub const DEFAULT_STORE_FILE: &str = "patients.json";

const BACKUP_SUFFIX: &str = ".backup";
const TEMP_SUFFIX: &str = ".tmp";

/// What `load` should do when both the primary store file and its backup are
/// unreadable.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RecoveryPolicy {
    /// Serve an empty store and keep the service available.
    #[default]
    FallbackEmpty,
    /// Surface a [`PatientError::StorageCorrupt`] instead of masking data loss.
    RaiseError,
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    store_path: PathBuf,
    backup_path: PathBuf,
    temp_path: PathBuf,
    recovery_policy: RecoveryPolicy,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The backup and temporary file paths are derived from `store_path` by
    /// appending `.backup` and `.tmp`, keeping all three files in the same
    /// directory so the final rename stays on one filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::InvalidInput`] if `store_path` has no file name
    /// component.
    pub fn new(store_path: PathBuf, recovery_policy: RecoveryPolicy) -> PatientResult<Self> {
        let file_name = store_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                PatientError::InvalidInput("store path must name a file".into())
            })?;

        let backup_path = store_path.with_file_name(format!("{file_name}{BACKUP_SUFFIX}"));
        let temp_path = store_path.with_file_name(format!("{file_name}{TEMP_SUFFIX}"));

        Ok(Self {
            store_path,
            backup_path,
            temp_path,
            recovery_policy,
        })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    pub fn recovery_policy(&self) -> RecoveryPolicy {
        self.recovery_policy
    }
}

/// Parse the recovery policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default
/// availability-first policy ([`RecoveryPolicy::FallbackEmpty`]).
pub fn recovery_policy_from_env_value(value: Option<String>) -> PatientResult<RecoveryPolicy> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None | Some("fallback-empty") => Ok(RecoveryPolicy::FallbackEmpty),
        Some("strict") => Ok(RecoveryPolicy::RaiseError),
        Some(other) => Err(PatientError::InvalidInput(format!(
            "unknown recovery policy {other:?} (expected \"fallback-empty\" or \"strict\")"
        ))),
    }
}
