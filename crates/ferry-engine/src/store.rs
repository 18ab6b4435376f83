//! JSON files on disk, one per dataset.
//!
//! Every save writes a sibling temp file and renames it over the target, so
//! a crash mid-write leaves either the old or the new contents.

use crate::error::{StoreError, StoreResult};
use ferry_core::{StoreKind, UserId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Ban list kept by older releases, imported once at startup
pub const LEGACY_BAN_FILE: &str = "manual_ban_list.json";

/// Persistence root
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open (and create if needed) the data directory
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::DataDir {
            path: dir.clone(),
            source,
        })?;
        debug!(dir = %dir.display(), "store opened");
        Ok(Self { dir })
    }

    /// Data directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a dataset
    #[must_use]
    pub fn path(&self, kind: StoreKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Read a dataset, strictly
    pub fn read<T: DeserializeOwned>(&self, kind: StoreKind) -> StoreResult<Option<T>> {
        let bytes = match fs::read(self.path(kind)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { kind, source }),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Decode { kind, source })
    }

    /// Read a dataset, starting empty when it is absent or unreadable
    pub fn load<T: DeserializeOwned + Default>(&self, kind: StoreKind) -> T {
        match self.read(kind) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                warn!(error = %e, "dataset unreadable, starting empty");
                T::default()
            }
        }
    }

    /// Replace a dataset on disk
    pub fn save<T: Serialize + ?Sized>(&self, kind: StoreKind, value: &T) -> StoreResult<()> {
        let bytes =
            serde_json::to_vec_pretty(value).map_err(|source| StoreError::Encode { kind, source })?;
        let target = self.path(kind);
        let staging = target.with_extension("json.tmp");

        let io = |source| StoreError::Io { kind, source };
        let mut file = File::create(&staging).map_err(io)?;
        file.write_all(&bytes).map_err(io)?;
        file.sync_all().map_err(io)?;
        drop(file);
        fs::rename(&staging, &target).map_err(io)?;
        Ok(())
    }

    /// Take over the ban list left by older releases.
    ///
    /// The file is renamed to `*.imported` afterwards so it is read once.
    /// A malformed file is left in place and yields nothing.
    pub fn take_legacy_bans(&self) -> Vec<UserId> {
        let path = self.dir.join(LEGACY_BAN_FILE);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read legacy ban list");
                return Vec::new();
            }
        };

        let ids: Vec<UserId> = match serde_json::from_slice(&bytes) {
            Ok(ids) => ids,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "legacy ban list malformed, skipped");
                return Vec::new();
            }
        };

        let done = path.with_extension("json.imported");
        if let Err(e) = fs::rename(&path, &done) {
            warn!(path = %path.display(), error = %e, "cannot retire legacy ban list");
        }
        info!(count = ids.len(), "imported legacy ban list");
        ids
    }
}
