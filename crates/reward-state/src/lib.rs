//! A generic atomic JSON-on-disk state store, shared by the signer's
//! `Vec<VoteRecord>` and the uploader's `UploaderState`.
//!
//! Every mutation follows the same discipline the Go source's two
//! near-identical `_sync` functions used: serialize → write to
//! `<path>.tmp` → `fsync` → atomic rename onto `<path>`. Collapsing both
//! into one generic implementation is a deliberate simplification, not
//! a behavior change.

mod error;

pub use error::StateError;

use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A mutex-guarded in-memory value that is durably persisted to `path`
/// after every mutation. `path` is `None` for purely in-memory stores
/// (tests, or a signer run with no `stateFile` configured).
pub struct JsonFileStore<T> {
    path: Option<PathBuf>,
    inner: Mutex<T>,
}

impl<T> JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Open a state file at `path`. If it doesn't exist: returns a
    /// zero-value state when `missing_is_error` is `false` (the signer's
    /// behavior), or a hard error when `true` (the uploader's behavior).
    pub fn open(path: impl AsRef<Path>, missing_is_error: bool) -> Result<Self, StateError> {
        let path = path.as_ref().to_path_buf();
        let path_str = || path.display().to_string();

        let tmp_path = tmp_path_for(&path);
        if tmp_path.exists() {
            // A crash between write-tmp and rename leaves this behind;
            // the last-known-good file is still `path` itself.
            let _ = fs::remove_file(&tmp_path);
        }

        let value = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => {
                if missing_is_error {
                    return Err(StateError::EmptyRequired { path: path_str() });
                }
                T::default()
            }
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|source| StateError::Parse { path: path_str(), source })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if missing_is_error {
                    return Err(StateError::MissingRequired { path: path_str() });
                }
                T::default()
            }
            Err(source) => return Err(StateError::Read { path: path_str(), source }),
        };

        Ok(Self { path: Some(path), inner: Mutex::new(value) })
    }

    /// An in-memory-only store, used in tests and for a daemon run with
    /// no `stateFile` configured.
    pub fn in_memory(value: T) -> Self {
        Self { path: None, inner: Mutex::new(value) }
    }

    /// Mutate the in-memory value with `f`, then persist if a path is
    /// configured. The mutation is applied even if persistence fails —
    /// the caller is responsible for not proceeding further on the
    /// affected unit of work until a later sync succeeds.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, StateError> {
        let mut guard = self.inner.lock().expect("state mutex poisoned");
        let result = f(&mut guard);
        self.persist(&guard)?;
        Ok(result)
    }

    /// Read-only access to the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.inner.lock().expect("state mutex poisoned");
        f(&guard)
    }

    fn persist(&self, value: &T) -> Result<(), StateError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let path_str = path.display().to_string();
        let tmp_path = tmp_path_for(path);

        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|source| StateError::Parse { path: path_str.clone(), source })?;

        let mut file = File::create(&tmp_path)
            .map_err(|source| StateError::Write { path: path_str.clone(), source })?;
        file.write_all(&bytes).map_err(|source| StateError::Write { path: path_str.clone(), source })?;
        file.sync_all().map_err(|source| StateError::Write { path: path_str.clone(), source })?;
        drop(file);

        fs::rename(&tmp_path, path).map_err(|source| StateError::Rename { path: path_str, source })?;
        Ok(())
    }
}

impl<T> std::fmt::Debug for JsonFileStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
    struct Counter {
        n: u64,
    }

    #[test]
    fn missing_file_yields_default_when_not_required() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store: JsonFileStore<Counter> = JsonFileStore::open(&path, false).unwrap();
        store.with(|c| assert_eq!(c, &Counter::default()));
    }

    #[test]
    fn missing_file_is_hard_error_when_required() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let err = JsonFileStore::<Counter>::open(&path, true).unwrap_err();
        assert!(matches!(err, StateError::MissingRequired { .. }));
    }

    #[test]
    fn mutation_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store: JsonFileStore<Counter> = JsonFileStore::open(&path, false).unwrap();
        store.with_mut(|c| c.n += 1).unwrap();
        store.with_mut(|c| c.n += 1).unwrap();

        let reloaded: JsonFileStore<Counter> = JsonFileStore::open(&path, false).unwrap();
        reloaded.with(|c| assert_eq!(c.n, 2));
    }

    #[test]
    fn leftover_tmp_file_is_cleaned_up_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, serde_json::to_vec(&Counter { n: 5 }).unwrap()).unwrap();
        fs::write(tmp_path_for(&path), b"garbage-from-a-crashed-write").unwrap();

        let store: JsonFileStore<Counter> = JsonFileStore::open(&path, true).unwrap();
        store.with(|c| assert_eq!(c.n, 5));
        assert!(!tmp_path_for(&path).exists());
    }

    #[test]
    fn empty_file_yields_default_when_not_required() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"").unwrap();
        let store: JsonFileStore<Counter> = JsonFileStore::open(&path, false).unwrap();
        store.with(|c| assert_eq!(c, &Counter::default()));
    }

    #[test]
    fn empty_file_is_hard_error_when_required() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"").unwrap();
        let err = JsonFileStore::<Counter>::open(&path, true).unwrap_err();
        assert!(matches!(err, StateError::EmptyRequired { .. }));
    }
}
