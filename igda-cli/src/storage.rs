//! Session snapshot kept in a JSON file on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use igda_core::{Session, SessionStorage, SnapshotError, snapshot};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not a valid session snapshot: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: SnapshotError,
    },
}

/// Whole-record snapshot at a fixed path. Last writer wins.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

impl SessionStorage for JsonFileStore {
    type Error = StoreError;

    fn load_session(&self) -> Result<Option<Session>, Self::Error> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no snapshot at {}; starting empty", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        snapshot::decode(&text)
            .map(Some)
            .map_err(|source| StoreError::Snapshot {
                path: self.path.clone(),
                source,
            })
    }

    fn save_session(&self, session: &Session) -> Result<(), Self::Error> {
        let text = snapshot::encode(session).map_err(|source| StoreError::Snapshot {
            path: self.path.clone(),
            source,
        })?;
        let write_err = |source: io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let staging = self.staging_path();
        fs::write(&staging, text).map_err(write_err)?;
        fs::rename(&staging, &self.path).map_err(write_err)?;
        log::debug!("snapshot written to {}", self.path.display());
        Ok(())
    }
}
