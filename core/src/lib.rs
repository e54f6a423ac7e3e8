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

//! Basic types used by the Tzwitter rollup client.
//!
//! Nothing in this crate performs I/O. It defines the command protocol that is signed and sent
//! to the rollup inbox, the durable state namespace the rollup exposes and the entities that are
//! reconstructed from it.

pub mod crypto;
pub mod encoding;
pub mod message;
pub mod state;

mod error;
pub use error::{DecodeError, KeyError};

mod nonce;
pub use nonce::Nonce;

mod public_key_hash;
pub use public_key_hash::PublicKeyHash;

pub use message::{Command, Envelope, UnsignedCommand, MAGIC_BYTE};
pub use state::{CollectedData, ProtocolTiming, Tweet};

/// Identifier of a tweet. Tweet ids are allocated sequentially by the rollup.
pub type TweetId = u64;

/// Level of a block, either on the base chain or as observed by the rollup node.
pub type Level = u64;
