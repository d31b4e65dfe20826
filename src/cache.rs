// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! File-backed JSON cache with a time-to-live.
//!
//! One file per key lives under the cache directory. Freshness is judged by
//! the file's modification time; an expired entry is deleted the first time
//! it is read. Reads never fail: anything that cannot be loaded is a miss.

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::{Error, cache_io_error};

/// Key under which the collected payload is stored.
pub const STATISTICS_KEY: &str = "statistics";
/// Prefix of the pretty-printed mirror written next to the statistics entry.
pub const READABLE_PREFIX: &str = "READABLE-";
/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 3600,);

/// TTL cache rooted at a directory.
#[derive(Debug, Clone,)]
pub struct Cache
{
    directory: PathBuf,
    ttl:       Duration,
}

impl Cache
{
    /// Opens the cache, creating `directory` when needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CacheIo`] when the directory cannot be created.
    pub fn open(directory: impl Into<PathBuf,>, ttl: Duration,) -> Result<Self, Error,>
    {
        let directory = directory.into();
        fs::create_dir_all(&directory,).map_err(|e| cache_io_error(&directory, e,),)?;
        Ok(Self {
            directory,
            ttl,
        },)
    }

    pub fn directory(&self,) -> &Path
    {
        &self.directory
    }

    pub fn ttl(&self,) -> Duration
    {
        self.ttl
    }

    /// File backing `key`; `/`, `\` and `:` are replaced with `_`.
    pub fn path_for(&self, key: &str,) -> PathBuf
    {
        let safe: String =
            key.chars().map(|ch| if matches!(ch, '/' | '\\' | ':') { '_' } else { ch },).collect();
        self.directory.join(format!("{safe}.json"),)
    }

    /// Reads `key`, deleting it first when it has expired.
    ///
    /// Missing, expired, unreadable and undecodable entries all yield `None`.
    pub fn get<T: DeserializeOwned,>(&self, key: &str,) -> Option<T,>
    {
        let path = self.path_for(key,);
        if !self.is_fresh(key,) {
            if path.exists() {
                debug!("cache expired for {}", key);
                if let Err(e,) = fs::remove_file(&path,) {
                    warn!("could not remove expired cache entry {}: {}", path.display(), e);
                }
            } else {
                debug!("cache miss for {}", key);
            }
            return None;
        }

        let contents = match fs::read_to_string(&path,) {
            Ok(contents,) => contents,
            Err(e,) => {
                warn!("could not read cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&contents,) {
            Ok(value,) => {
                debug!("cache hit for {}", key);
                Some(value,)
            }
            Err(e,) => {
                warn!("ignoring corrupt cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Whether `key` exists and is younger than the TTL.
    pub fn is_fresh(&self, key: &str,) -> bool
    {
        let Ok(metadata,) = fs::metadata(self.path_for(key,),) else {
            return false;
        };
        let Ok(modified,) = metadata.modified() else {
            return false;
        };
        let age = SystemTime::now().duration_since(modified,).unwrap_or(Duration::ZERO,);
        age <= self.ttl
    }

    /// Stores `value` as compact JSON under `key`.
    ///
    /// Storing [`STATISTICS_KEY`] also writes a pretty-printed
    /// `READABLE-statistics.json` carrying generation metadata.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`] when `value` cannot be encoded and
    /// [`Error::CacheIo`] when a file cannot be written.
    pub fn set<T: Serialize + ?Sized,>(&self, key: &str, value: &T,) -> Result<(), Error,>
    {
        let encoded = serde_json::to_string(value,)?;

        if key.eq_ignore_ascii_case(STATISTICS_KEY,) {
            let data = serde_json::to_value(value,)?;
            let readable = json!({
                "metadata": {
                    "generated_at": Utc::now().to_rfc3339(),
                    "version": env!("CARGO_PKG_VERSION"),
                },
                "data": data,
            });
            let readable_path = self.path_for(&format!("{READABLE_PREFIX}{STATISTICS_KEY}"),);
            write(&readable_path, &serde_json::to_string_pretty(&readable,)?,)?;
        }

        let path = self.path_for(key,);
        write(&path, &encoded,)?;
        info!("cached {} at {}", key, path.display());
        Ok((),)
    }

    /// Deletes `key`. Returns whether an entry existed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CacheIo`] when an existing entry cannot be removed.
    pub fn remove(&self, key: &str,) -> Result<bool, Error,>
    {
        let path = self.path_for(key,);
        match fs::remove_file(&path,) {
            Ok((),) => Ok(true,),
            Err(e,) if e.kind() == std::io::ErrorKind::NotFound => Ok(false,),
            Err(e,) => Err(cache_io_error(&path, e,),),
        }
    }

    /// Deletes every `*.json` file in the cache directory and returns how
    /// many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CacheIo`] when the directory cannot be listed or an
    /// entry cannot be removed.
    pub fn clear(&self,) -> Result<usize, Error,>
    {
        let entries = fs::read_dir(&self.directory,).map_err(|e| cache_io_error(&self.directory, e,),)?;
        let mut removed = 0;

        for entry in entries {
            let path = entry.map_err(|e| cache_io_error(&self.directory, e,),)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json",) {
                fs::remove_file(&path,).map_err(|e| cache_io_error(&path, e,),)?;
                removed += 1;
            }
        }

        info!("cache cleared ({} entries)", removed);
        Ok(removed,)
    }
}

fn write(path: &Path, contents: &str,) -> Result<(), Error,>
{
    if let Some(parent,) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent,).map_err(|e| cache_io_error(parent, e,),)?;
    }
    fs::write(path, contents,).map_err(|e| cache_io_error(path, e,),)
}
