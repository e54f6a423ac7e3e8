// Tzwitter Client
// Copyright (C) 2023 Tzwitter contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License version 3 as
// published by the Free Software Foundation.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Manages key pairs stored in the filesystem,
//! providing ways to store and retrieve them.

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use thiserror::Error as ThisError;

use std::io::Error as IOError;
use std::path::{Path, PathBuf};

/// The data that is stored in the filesystem relative
/// to a key pair. The name of the key pair is used as
/// the key to this value, therefore not included here.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct KeyPairData {
    /// Base58 `edsk` secret key in its 32 byte seed form.
    pub secret_key: String,
}

#[derive(Debug, ThisError)]
pub enum Error {
    /// A key pair with the given name already exists
    #[error("A key pair with the given name already exists")]
    AlreadyExists(),

    /// Failed to write to the key-pairs file
    #[error("Failed to write the key-pairs file '{1}'")]
    FailedWrite(#[source] WritingError, PathBuf),

    /// Failed to read the key-pairs file
    #[error("Failed to read the key-pairs file '{1}'")]
    FailedRead(#[source] ReadingError, PathBuf),

    /// Cannot read directory
    #[error("Cannot read directory '{1}'")]
    CannotReadDirectory(#[source] IOError, PathBuf),

    /// Cannot create directory
    #[error("Cannot create directory '{1}'")]
    CannotCreateDirectory(#[source] IOError, PathBuf),

    /// The platform has no data directory for the current user
    #[error("Cannot determine the data directory of the current user")]
    NoDataDirectory(),

    /// Could not find a key pair with the given name
    #[error("Could not find a key pair with the given name")]
    NotFound(),
}

/// Possible errors when writing to the key-pairs file.
#[derive(Debug, ThisError)]
pub enum WritingError {
    #[error(transparent)]
    IO(IOError),

    #[error(transparent)]
    Serialization(serde_json::Error),
}

/// Possible errors when reading the key-pairs file.
#[derive(Debug, ThisError)]
pub enum ReadingError {
    #[error(transparent)]
    IO(IOError),

    #[error(transparent)]
    Deserialization(serde_json::Error),
}

/// Add a key pair to the storage in the user data directory.
///
/// Fails if a key pair with the given `name` already exists.
/// It can also fail from IO and Serde Json errors.
pub fn add(name: String, data: KeyPairData) -> Result<(), Error> {
    Storage::open_default()?.add(name, data)
}

/// List all the key-pairs stored in the user data directory.
pub fn list() -> Result<BTreeMap<String, KeyPairData>, Error> {
    Storage::open_default()?.list()
}

/// Get a key pair stored in the user data directory by name.
pub fn get(name: &str) -> Result<KeyPairData, Error> {
    Storage::open_default()?.get(name)
}

/// The file where the user key-pairs are stored.
const FILE: &str = "key-pairs.json";

/// Key pairs stored in [FILE] under a directory.
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Open the storage in the user data directory.
    pub fn open_default() -> Result<Self, Error> {
        let dir = BaseDirs::new()
            .ok_or(Error::NoDataDirectory())?
            .data_dir()
            .join("tzwitter-cli");
        Storage::open(dir)
    }

    /// Open the storage in `dir`, creating the directory and an empty file if needed.
    pub fn open(dir: PathBuf) -> Result<Self, Error> {
        let dir = init_dir(dir)?;
        let storage = Storage {
            path: dir.join(FILE),
        };
        if !storage.path.exists() {
            storage.update(BTreeMap::new())?;
        }
        Ok(storage)
    }

    /// Add a key pair.
    ///
    /// Fails if a key pair with the given `name` already exists.
    pub fn add(&self, name: String, data: KeyPairData) -> Result<(), Error> {
        let mut key_pairs = self.list()?;
        if key_pairs.contains_key(&name) {
            return Err(Error::AlreadyExists());
        }
        key_pairs.insert(name, data);
        self.update(key_pairs)
    }

    /// List all the stored key-pairs by name.
    pub fn list(&self) -> Result<BTreeMap<String, KeyPairData>, Error> {
        let file = File::open(&self.path).map_err(|err| self.read_error(ReadingError::IO(err)))?;
        let VersionedFile::V1 { key_pairs } = serde_json::from_reader(&file)
            .map_err(|err| self.read_error(ReadingError::Deserialization(err)))?;
        Ok(key_pairs)
    }

    /// Get a key pair by name.
    pub fn get(&self, name: &str) -> Result<KeyPairData, Error> {
        self.list()?.remove(name).ok_or(Error::NotFound())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, key_pairs: BTreeMap<String, KeyPairData>) -> Result<(), Error> {
        let data = VersionedFile::V1 { key_pairs };
        let new_content = serde_json::to_string_pretty(&data)
            .map_err(|err| self.write_error(WritingError::Serialization(err)))?;
        create_private(&self.path)
            .and_then(|mut file| file.write_all(new_content.as_bytes()))
            .map_err(|err| self.write_error(WritingError::IO(err)))
    }

    fn read_error(&self, error: ReadingError) -> Error {
        Error::FailedRead(error, self.path.clone())
    }

    fn write_error(&self, error: WritingError) -> Error {
        Error::FailedWrite(error, self.path.clone())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "version")]
enum VersionedFile {
    #[serde(rename = "1")]
    V1 {
        key_pairs: BTreeMap<String, KeyPairData>,
    },
}

/// Ensure that the given directory path is ready to be used.
/// Fails with
///   * [Error::CannotCreateDirectory] if the directory
///     does not exist and fails to be created.
///   * [Error::CannotReadDirectory] if the directory
///     does exist but can not be read.
fn init_dir(dir: PathBuf) -> Result<PathBuf, Error> {
    std::fs::create_dir_all(&dir).map_err(|err| Error::CannotCreateDirectory(err, dir.clone()))?;
    std::fs::read_dir(&dir).map_err(|err| Error::CannotReadDirectory(err, dir.clone()))?;
    Ok(dir)
}

/// Open `path` for writing, truncated and only accessible by its owner.
///
/// Files that already exist are restricted before any secret is written to them.
#[cfg(unix)]
fn create_private(path: &Path) -> Result<File, IOError> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
    let file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn create_private(path: &Path) -> Result<File, IOError> {
    File::create(path)
}
