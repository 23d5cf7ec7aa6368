//! Single-file patient store with backup and rollback.
//!
//! The [`PatientRepository`] owns durable access to one JSON store file plus a
//! single-generation backup next to it. Every operation serialises on one
//! mutex, so readers never observe a half-finished write; durability of the
//! write itself comes from the temp-file-then-rename pattern (the rename is
//! the sole visible transition point).
//!
//! ## Storage Layout
//!
//! ```text
//! patients.json          # primary: JSON object, id -> record
//! patients.json.backup   # byte-for-byte pre-save copy, one generation
//! patients.json.tmp      # staging file, removed on failure
//! ```
//!
//! ## Failure policy
//!
//! Expected operational failures (missing file, corrupt file, disk error)
//! come back as `Err` values and never leave visible partial state. A corrupt
//! primary is recovered from the backup transparently; if the backup is also
//! unusable, the configured [`RecoveryPolicy`] decides between serving an
//! empty store and surfacing [`PatientError::StorageCorrupt`].

use crate::config::{CoreConfig, RecoveryPolicy};
use crate::error::{PatientError, PatientResult};
use crate::patient::PatientRecord;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// The complete in-memory mapping of patient identifier to record.
pub type Store = BTreeMap<String, PatientRecord>;

/// Structured failure returned by [`PatientRepository::transactional_apply`].
///
/// Carries the command label and a human-readable message instead of leaking
/// the raw error to callers that only need a failure envelope; the typed
/// source error stays available for status mapping.
#[derive(Debug, thiserror::Error)]
#[error("{command} failed: {message}")]
pub struct TxFailure {
    pub command: String,
    pub message: String,
    #[source]
    pub source: PatientError,
}

impl TxFailure {
    fn new(command: &str, source: PatientError) -> Self {
        Self {
            command: command.to_string(),
            message: source.to_string(),
            source,
        }
    }
}

/// Durable, guard-serialised access to the patient store file.
///
/// All access to the primary and backup files goes through this type; no
/// other component touches them directly. The guard imposes a total order on
/// `load`, `save`, and `transactional_apply`, which is coarse (whole store
/// per operation) but sufficient for the expected data volume.
pub struct PatientRepository {
    cfg: Arc<CoreConfig>,
    guard: Mutex<()>,
}

impl PatientRepository {
    /// Create a repository over the configured store paths.
    ///
    /// Performs no I/O; the store file is created lazily by the first save.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            cfg,
            guard: Mutex::new(()),
        }
    }

    /// Load the current store snapshot.
    ///
    /// A missing primary file yields an empty store. A corrupt primary is
    /// recovered by copying the backup over it and re-parsing; if that also
    /// fails, the recovery policy decides the outcome.
    ///
    /// # Errors
    ///
    /// Under [`RecoveryPolicy::FallbackEmpty`] (the default) this never fails.
    /// Under [`RecoveryPolicy::RaiseError`] an unrecoverable primary yields
    /// [`PatientError::StorageCorrupt`].
    pub fn load(&self) -> PatientResult<Store> {
        let _guard = self.guard.lock();
        self.load_locked()
    }

    /// Replace the entire store content (full overwrite, no partial merge).
    ///
    /// The current primary is first copied to the backup location
    /// (best-effort, only when a primary exists), then the new content is
    /// staged in a temp file and renamed over the primary.
    ///
    /// # Errors
    ///
    /// Returns a `PatientError` on serialisation or I/O failure; the previous
    /// primary file is left untouched and the temp file is removed.
    pub fn save(&self, data: &Store) -> PatientResult<()> {
        let _guard = self.guard.lock();
        self.save_locked(data)
    }

    /// Apply a mutation transactionally: snapshot, mutate a working copy,
    /// persist on success, restore the snapshot on failure.
    ///
    /// External readers see either the pre-mutation or the post-mutation
    /// store, never an intermediate state. The mutator signals business-rule
    /// failure by returning an error; that error is wrapped into a
    /// [`TxFailure`] labelled with `command` rather than propagated raw.
    ///
    /// # Errors
    ///
    /// Returns [`TxFailure`] if the snapshot load, the mutator, or the final
    /// persist fails.
    pub fn transactional_apply<T, F>(&self, command: &str, mutator: F) -> Result<T, TxFailure>
    where
        F: FnOnce(&mut Store) -> PatientResult<T>,
    {
        let _guard = self.guard.lock();

        let snapshot = self
            .load_locked()
            .map_err(|e| TxFailure::new(command, e))?;

        let mut working = snapshot.clone();
        match mutator(&mut working) {
            Ok(value) => {
                self.save_locked(&working)
                    .map_err(|e| TxFailure::new(command, e))?;
                Ok(value)
            }
            Err(mutation_err) => {
                // Write the pre-mutation snapshot back verbatim.
                if let Err(restore_err) = self.save_locked(&snapshot) {
                    tracing::error!(
                        command,
                        "failed to restore snapshot after mutation failure: {restore_err}"
                    );
                }
                Err(TxFailure::new(command, mutation_err))
            }
        }
    }

    fn load_locked(&self) -> PatientResult<Store> {
        match Self::read_store(self.cfg.store_path()) {
            Ok(Some(store)) => Ok(store),
            Ok(None) => Ok(Store::new()),
            Err(primary_err) => {
                tracing::warn!(
                    "primary store unreadable ({primary_err}), attempting backup recovery"
                );
                match self.recover_from_backup() {
                    Ok(store) => Ok(store),
                    Err(recovery_err) => match self.cfg.recovery_policy() {
                        RecoveryPolicy::FallbackEmpty => {
                            tracing::warn!(
                                "backup recovery failed ({recovery_err}), serving empty store"
                            );
                            Ok(Store::new())
                        }
                        RecoveryPolicy::RaiseError => Err(PatientError::StorageCorrupt(format!(
                            "{primary_err}; backup recovery failed: {recovery_err}"
                        ))),
                    },
                }
            }
        }
    }

    fn save_locked(&self, data: &Store) -> PatientResult<()> {
        let primary = self.cfg.store_path();

        // Best-effort pre-save backup; only meaningful when a primary exists.
        if primary.exists() {
            if let Err(e) = fs::copy(primary, self.cfg.backup_path()) {
                tracing::warn!("backup copy failed before save: {e}");
            }
        }

        let payload = serde_json::to_vec(data).map_err(PatientError::Serialization)?;

        let temp = self.cfg.temp_path();
        if let Err(e) = fs::write(temp, &payload) {
            let _ = fs::remove_file(temp);
            return Err(PatientError::FileWrite(e));
        }

        // The rename is the sole visible transition point.
        fs::rename(temp, primary).map_err(|e| {
            let _ = fs::remove_file(temp);
            PatientError::FileRename(e)
        })
    }

    /// Copy the backup over the primary and re-parse.
    fn recover_from_backup(&self) -> PatientResult<Store> {
        let backup = self.cfg.backup_path();
        if !backup.exists() {
            return Err(PatientError::FileRead(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no backup file at {}", backup.display()),
            )));
        }

        fs::copy(backup, self.cfg.store_path()).map_err(PatientError::FileWrite)?;

        match Self::read_store(self.cfg.store_path())? {
            Some(store) => Ok(store),
            None => Err(PatientError::StorageCorrupt(
                "primary file vanished during recovery".into(),
            )),
        }
    }

    /// Read and parse a store file. `Ok(None)` means the file does not exist.
    ///
    /// Parsing into the mapping type also enforces the shape invariant: a
    /// top-level list or scalar fails deserialisation.
    fn read_store(path: &Path) -> PatientResult<Option<Store>> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PatientError::FileRead(e)),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(PatientError::Deserialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::Gender;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn repo_in(dir: &TempDir, policy: RecoveryPolicy) -> PatientRepository {
        let cfg = CoreConfig::new(dir.path().join("patients.json"), policy).unwrap();
        PatientRepository::new(Arc::new(cfg))
    }

    fn sample_record(name: &str, weight: f64) -> PatientRecord {
        PatientRecord::new(name.into(), "New York".into(), 30, Gender::Male, 1.8, weight).unwrap()
    }

    fn sample_store(name: &str, weight: f64) -> Store {
        let mut store = Store::new();
        store.insert("P001".into(), sample_record(name, weight));
        store
    }

    #[test]
    fn load_on_missing_file_returns_empty_store() {
        let temp = TempDir::new().unwrap();
        let repo = repo_in(&temp, RecoveryPolicy::FallbackEmpty);

        assert_eq!(repo.load().unwrap(), Store::new());
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = TempDir::new().unwrap();
        let repo = repo_in(&temp, RecoveryPolicy::FallbackEmpty);

        let store = sample_store("A", 80.0);
        repo.save(&store).unwrap();

        assert_eq!(repo.load().unwrap(), store);
    }

    #[test]
    fn first_save_backs_up_nothing_second_save_backs_up_previous_state() {
        let temp = TempDir::new().unwrap();
        let repo = repo_in(&temp, RecoveryPolicy::FallbackEmpty);

        let s1 = sample_store("A", 80.0);
        repo.save(&s1).unwrap();
        assert!(!temp.path().join("patients.json.backup").exists());

        let s2 = sample_store("B", 90.0);
        repo.save(&s2).unwrap();

        let backup: Store = serde_json::from_slice(
            &fs::read(temp.path().join("patients.json.backup")).unwrap(),
        )
        .unwrap();
        assert_eq!(backup, s1);
        assert_eq!(repo.load().unwrap(), s2);
    }

    #[test]
    fn save_after_empty_store_save_leaves_empty_backup() {
        let temp = TempDir::new().unwrap();
        let repo = repo_in(&temp, RecoveryPolicy::FallbackEmpty);

        repo.save(&Store::new()).unwrap();
        repo.save(&sample_store("A", 80.0)).unwrap();

        let backup: Store = serde_json::from_slice(
            &fs::read(temp.path().join("patients.json.backup")).unwrap(),
        )
        .unwrap();
        assert_eq!(backup, Store::new());
    }

    #[test]
    fn corrupt_primary_recovers_from_backup_and_rewrites_primary() {
        let temp = TempDir::new().unwrap();
        let repo = repo_in(&temp, RecoveryPolicy::FallbackEmpty);

        let good = sample_store("A", 80.0);
        fs::write(
            temp.path().join("patients.json.backup"),
            serde_json::to_vec(&good).unwrap(),
        )
        .unwrap();
        fs::write(temp.path().join("patients.json"), b"{ not json").unwrap();

        assert_eq!(repo.load().unwrap(), good);

        // Recovery overwrites the primary with the backup's content.
        let primary: Store =
            serde_json::from_slice(&fs::read(temp.path().join("patients.json")).unwrap()).unwrap();
        assert_eq!(primary, good);
    }

    #[test]
    fn wrong_shape_primary_counts_as_corrupt() {
        let temp = TempDir::new().unwrap();
        let repo = repo_in(&temp, RecoveryPolicy::FallbackEmpty);

        let good = sample_store("A", 80.0);
        fs::write(
            temp.path().join("patients.json.backup"),
            serde_json::to_vec(&good).unwrap(),
        )
        .unwrap();
        // Valid JSON, but a list rather than a mapping.
        fs::write(temp.path().join("patients.json"), b"[1, 2, 3]").unwrap();

        assert_eq!(repo.load().unwrap(), good);
    }

    #[test]
    fn unrecoverable_corruption_falls_back_to_empty_by_default() {
        let temp = TempDir::new().unwrap();
        let repo = repo_in(&temp, RecoveryPolicy::FallbackEmpty);

        fs::write(temp.path().join("patients.json"), b"garbage").unwrap();

        assert_eq!(repo.load().unwrap(), Store::new());
    }

    #[test]
    fn unrecoverable_corruption_errors_under_strict_policy() {
        let temp = TempDir::new().unwrap();
        let repo = repo_in(&temp, RecoveryPolicy::RaiseError);

        fs::write(temp.path().join("patients.json"), b"garbage").unwrap();

        let err = repo.load().unwrap_err();
        assert!(matches!(err, PatientError::StorageCorrupt(_)));
    }

    #[test]
    fn failed_write_before_rename_leaves_primary_untouched() {
        let temp = TempDir::new().unwrap();
        let repo = repo_in(&temp, RecoveryPolicy::FallbackEmpty);

        let s1 = sample_store("A", 80.0);
        repo.save(&s1).unwrap();
        let before = fs::read(temp.path().join("patients.json")).unwrap();

        // Occupy the staging path with a directory so the temp write fails.
        fs::create_dir(temp.path().join("patients.json.tmp")).unwrap();

        let err = repo.save(&sample_store("B", 90.0)).unwrap_err();
        assert!(matches!(err, PatientError::FileWrite(_)));

        let after = fs::read(temp.path().join("patients.json")).unwrap();
        assert_eq!(before, after);
        assert_eq!(repo.load().unwrap(), s1);
    }

    #[test]
    fn successful_save_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let repo = repo_in(&temp, RecoveryPolicy::FallbackEmpty);

        repo.save(&sample_store("A", 80.0)).unwrap();
        assert!(!temp.path().join("patients.json.tmp").exists());
    }

    #[test]
    fn transactional_apply_persists_on_success() {
        let temp = TempDir::new().unwrap();
        let repo = repo_in(&temp, RecoveryPolicy::FallbackEmpty);

        let created = repo
            .transactional_apply("create_patient", |store| {
                let record = sample_record("A", 80.0);
                store.insert("P001".into(), record.clone());
                Ok(record)
            })
            .unwrap();

        assert_eq!(created.name, "A");
        assert_eq!(repo.load().unwrap().len(), 1);
    }

    #[test]
    fn transactional_apply_rolls_back_on_mutation_failure() {
        let temp = TempDir::new().unwrap();
        let repo = repo_in(&temp, RecoveryPolicy::FallbackEmpty);

        let before = sample_store("A", 80.0);
        repo.save(&before).unwrap();

        let failure = repo
            .transactional_apply::<(), _>("delete_patient", |store| {
                store.clear();
                Err(PatientError::NotFound("P999".into()))
            })
            .unwrap_err();

        assert_eq!(failure.command, "delete_patient");
        assert!(matches!(failure.source, PatientError::NotFound(_)));
        assert_eq!(repo.load().unwrap(), before);
    }

    #[test]
    fn transactional_failure_message_wraps_source() {
        let temp = TempDir::new().unwrap();
        let repo = repo_in(&temp, RecoveryPolicy::FallbackEmpty);

        let failure = repo
            .transactional_apply::<(), _>("update_patient", |_| {
                Err(PatientError::InvalidInput("age must be between 1 and 119".into()))
            })
            .unwrap_err();

        assert_eq!(failure.command, "update_patient");
        assert!(failure.message.contains("age must be between 1 and 119"));
    }

    #[test]
    fn concurrent_saves_serialise_with_last_writer_wins() {
        let temp = TempDir::new().unwrap();
        let repo = Arc::new(repo_in(&temp, RecoveryPolicy::FallbackEmpty));

        let payloads: Vec<Store> = (0..8)
            .map(|i| sample_store(&format!("patient-{i}"), 60.0 + i as f64))
            .collect();

        let handles: Vec<_> = payloads
            .iter()
            .cloned()
            .map(|store| {
                let repo = Arc::clone(&repo);
                std::thread::spawn(move || repo.save(&store).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Final content parses and equals exactly one of the payloads.
        let final_store = repo.load().unwrap();
        assert!(payloads.contains(&final_store));
    }
}
