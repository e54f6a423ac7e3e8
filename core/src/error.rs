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

use thiserror::Error as ThisError;

/// Errors raised when bytes read from the rollup state or received from a node cannot be
/// interpreted.
#[derive(Debug, ThisError, Clone, PartialEq)]
pub enum DecodeError {
    #[error("invalid hex string: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("value is not valid UTF-8")]
    Utf8,

    #[error("integer value has {0} bytes, at most 8 are supported")]
    IntegerTooLong(usize),

    #[error("inbox message does not start with the magic byte {expected:#04x}")]
    MagicByte { expected: u8 },

    #[error("malformed command envelope: {0}")]
    Envelope(String),

    #[error("nonce {0} has no successor")]
    NonceOverflow(u64),
}

/// Errors raised when handling Tezos keys, key hashes and signatures.
#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid base58check encoding: {0}")]
    Base58(String),

    #[error("unexpected prefix for a {kind} value")]
    Prefix { kind: &'static str },

    #[error("a {kind} value must be {expected} bytes long, got {actual}")]
    Length {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("signature verification failed")]
    BadSignature,
}
