use rocksdb::{DB, IteratorMode, Options};
use thiserror::Error;
use tracing::info;

use crate::config::StorageConfig;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Failed to open database at '{path}': {source}")]
  Open {
    path: String,
    #[source]
    source: rocksdb::Error,
  },

  #[error("Read failed: {0}")]
  Read(#[source] rocksdb::Error),

  #[error("Write failed: {0}")]
  Write(#[source] rocksdb::Error),
}

/// Persistent ordered key-value store backed by RocksDB
pub struct Store {
  db: DB,
}

impl Store {
  /// Open (or create) the database described by `config`
  pub fn open(config: &StorageConfig) -> Result<Self, StoreError> {
    let mut opts = Options::default();
    opts.create_if_missing(config.create_if_missing);
    opts.set_max_open_files(config.max_open_files);

    let db = DB::open(&opts, &config.data_path).map_err(|source| StoreError::Open {
      path: config.data_path.clone(),
      source,
    })?;
    info!("Opened RocksDB at {}", config.data_path);

    Ok(Self { db })
  }

  /// Get the value for a key
  pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    self.db.get(key.as_bytes()).map_err(StoreError::Read)
  }

  /// Insert or replace the value for a key
  pub fn insert(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
    self.db.put(key.as_bytes(), value).map_err(StoreError::Write)
  }

  /// Remove a key, returning its previous value
  pub fn remove(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
    let previous = self.get(key)?;
    if previous.is_some() {
      self.db.delete(key.as_bytes()).map_err(StoreError::Write)?;
    }
    Ok(previous)
  }

  /// All values in ascending key order
  pub fn values(&self) -> Result<Vec<Vec<u8>>, StoreError> {
    self
      .db
      .iterator(IteratorMode::Start)
      .map(|item| {
        item
          .map(|(_, value)| value.into_vec())
          .map_err(StoreError::Read)
      })
      .collect()
  }

  /// Flush memtables to disk
  pub fn flush(&self) -> Result<(), StoreError> {
    self.db.flush().map_err(StoreError::Write)
  }
}

/// Open a store inside a temporary directory
#[cfg(test)]
pub(crate) fn open_temp(dir: &tempfile::TempDir) -> Store {
  let config = StorageConfig {
    data_path: dir.path().to_string_lossy().to_string(),
    ..StorageConfig::default()
  };
  Store::open(&config).unwrap()
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_insert_and_get() {
    let dir = TempDir::new().unwrap();
    let store = open_temp(&dir);

    store.insert("key", b"value").unwrap();
    assert_eq!(store.get("key").unwrap(), Some(b"value".to_vec()));
    assert_eq!(store.get("missing").unwrap(), None);
  }

  #[test]
  fn test_remove_returns_previous() {
    let dir = TempDir::new().unwrap();
    let store = open_temp(&dir);

    store.insert("key", b"value").unwrap();
    assert_eq!(store.remove("key").unwrap(), Some(b"value".to_vec()));
    assert_eq!(store.remove("key").unwrap(), None);
    assert_eq!(store.get("key").unwrap(), None);
  }

  #[test]
  fn test_values_in_key_order() {
    let dir = TempDir::new().unwrap();
    let store = open_temp(&dir);

    store.insert("b", b"2").unwrap();
    store.insert("c", b"3").unwrap();
    store.insert("a", b"1").unwrap();

    assert_eq!(
      store.values().unwrap(),
      vec![b"1".to_vec(), b"2".to_vec(), b"3".to_vec()]
    );
  }

  #[test]
  fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
      let store = open_temp(&dir);
      store.insert("key", b"value").unwrap();
      store.flush().unwrap();
    }
    let store = open_temp(&dir);
    assert_eq!(store.get("key").unwrap(), Some(b"value".to_vec()));
  }

  #[test]
  fn test_open_without_create_fails() {
    let dir = TempDir::new().unwrap();
    let config = StorageConfig {
      data_path: dir.path().join("absent").to_string_lossy().to_string(),
      create_if_missing: false,
      ..StorageConfig::default()
    };
    assert!(matches!(
      Store::open(&config),
      Err(StoreError::Open { .. })
    ));
  }
}
