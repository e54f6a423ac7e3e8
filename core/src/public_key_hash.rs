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

use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::crypto::{self, ED25519_PUBLIC_KEY_HASH};
use crate::KeyError;

/// Address of an account, the `tz1` hash of an Ed25519 public key.
///
/// On the wire the address is tagged with its curve: `{"Tz1": "tz1..."}`.
///
/// ```rust
/// # use tzwitter_core::PublicKeyHash;
/// assert!("tz1QFD9WqLWZmmAuqnnTPPUjfauitYEWdshv".parse::<PublicKeyHash>().is_ok());
/// assert!("tz1QFD9WqLWZmmAuqnnTPPUjfauitYEWdshw".parse::<PublicKeyHash>().is_err());
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "TaggedHash", into = "TaggedHash")]
pub struct PublicKeyHash(String);

#[derive(Serialize, Deserialize)]
enum TaggedHash {
    Tz1(String),
}

impl PublicKeyHash {
    /// Parse and validate a `tz1` address.
    pub fn from_b58(address: &str) -> Result<Self, KeyError> {
        crypto::b58_decode(ED25519_PUBLIC_KEY_HASH, address)?;
        Ok(PublicKeyHash(address.to_string()))
    }

    /// Address of the given `edpk` public key.
    pub fn from_public_key(public_key: &str) -> Result<Self, KeyError> {
        crypto::public_key_hash(public_key).map(PublicKeyHash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for PublicKeyHash {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PublicKeyHash::from_b58(s)
    }
}

impl std::fmt::Display for PublicKeyHash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<TaggedHash> for PublicKeyHash {
    type Error = KeyError;

    fn try_from(tagged: TaggedHash) -> Result<Self, Self::Error> {
        let TaggedHash::Tz1(address) = tagged;
        PublicKeyHash::from_b58(&address)
    }
}

impl From<PublicKeyHash> for TaggedHash {
    fn from(pkh: PublicKeyHash) -> Self {
        TaggedHash::Tz1(pkh.0)
    }
}
