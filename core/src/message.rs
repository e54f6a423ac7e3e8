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

//! Commands that accounts submit to the rollup and their signed wire envelope.
//!
//! Submitting a command takes three steps:
//!
//! 1. Build an [UnsignedCommand] from the command and the next account [Nonce].
//! 2. Sign [UnsignedCommand::digest].
//! 3. Turn the command into an [Envelope] with [UnsignedCommand::into_envelope] and encode it
//!    with [Envelope::to_payload]. The payload is what goes into the rollup inbox.
use serde::{Deserialize, Serialize};

use crate::{crypto, encoding, DecodeError, Nonce, PublicKeyHash, TweetId};

/// Tag prepended to every inbox message of this rollup.
///
/// The inbox is shared by all rollups. The kernel ignores messages with another first byte.
pub const MAGIC_BYTE: u8 = 0x74;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    PostTweet {
        author: PublicKeyHash,
        content: String,
    },
    LikeTweet(TweetId),
    Transfer {
        destination: PublicKeyHash,
        tweet_id: TweetId,
    },
    Collect(TweetId),
}

/// A command bound to the nonce it will be submitted with.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UnsignedCommand {
    pub nonce: Nonce,
    #[serde(rename = "content")]
    pub command: Command,
}

impl UnsignedCommand {
    pub fn new(nonce: Nonce, command: Command) -> Self {
        UnsignedCommand { nonce, command }
    }

    /// The string whose digest is signed.
    ///
    /// The kernel rebuilds this string to check the signature so the field order of every
    /// variant must not change.
    pub fn hash_input(&self) -> String {
        let nonce = self.nonce;
        match &self.command {
            Command::PostTweet { author, content } => format!("{}{}{}", nonce, author, content),
            Command::LikeTweet(tweet_id) => format!("{}{}", nonce, tweet_id),
            Command::Transfer {
                destination,
                tweet_id,
            } => format!("{}{}{}", nonce, destination, tweet_id),
            Command::Collect(tweet_id) => format!("{}{}", nonce, tweet_id),
        }
    }

    /// BLAKE2b-256 digest of [UnsignedCommand::hash_input].
    pub fn digest(&self) -> [u8; 32] {
        crypto::blake2b_256(self.hash_input().as_bytes())
    }

    /// Wrap the command with the author public key and the signature of [UnsignedCommand::digest].
    pub fn into_envelope(self, public_key: String, signature: String) -> Envelope {
        Envelope {
            pkey: PublicKey::Ed25519(public_key),
            signature: Signature::Ed25519(signature),
            inner: self,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    Ed25519(String),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Signature {
    Ed25519(String),
}

/// Signed command as it is sent to the rollup.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub pkey: PublicKey,
    pub signature: Signature,
    pub inner: UnsignedCommand,
}

impl Envelope {
    /// Encode the envelope as an inbox message: the magic byte followed by the UTF-8 JSON of the
    /// envelope, all hex encoded.
    pub fn to_payload(&self, magic_byte: u8) -> String {
        let json = serde_json::to_string(self).expect("serializing an envelope cannot fail");
        format!("{:02x}{}", magic_byte, encoding::hex_from_utf8(&json))
    }

    /// Decode an inbox message created with [Envelope::to_payload].
    pub fn from_payload(magic_byte: u8, payload: &str) -> Result<Self, DecodeError> {
        let bytes = hex::decode(payload)?;
        match bytes.split_first() {
            Some((first, json)) if *first == magic_byte => {
                serde_json::from_slice(json).map_err(|err| DecodeError::Envelope(err.to_string()))
            }
            _ => Err(DecodeError::MagicByte {
                expected: magic_byte,
            }),
        }
    }

    pub fn public_key(&self) -> &str {
        let PublicKey::Ed25519(key) = &self.pkey;
        key
    }

    pub fn signature(&self) -> &str {
        let Signature::Ed25519(signature) = &self.signature;
        signature
    }
}
