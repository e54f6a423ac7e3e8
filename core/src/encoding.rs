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

//! Conversions between the hex strings served by the rollup node and typed values.
use crate::DecodeError;

/// Hex encode the UTF-8 bytes of `value`.
pub fn hex_from_utf8(value: &str) -> String {
    hex::encode(value.as_bytes())
}

/// Decode a hex string into a UTF-8 string.
pub fn utf8_from_hex(value: &str) -> Result<String, DecodeError> {
    utf8_from_bytes(hex::decode(value)?)
}

pub fn utf8_from_bytes(bytes: Vec<u8>) -> Result<String, DecodeError> {
    String::from_utf8(bytes).map_err(|_| DecodeError::Utf8)
}

/// Interpret `bytes` as a big-endian unsigned integer.
///
/// An empty slice is zero. Values longer than 8 bytes are rejected.
pub fn u64_from_be_bytes(bytes: &[u8]) -> Result<u64, DecodeError> {
    if bytes.len() > 8 {
        return Err(DecodeError::IntegerTooLong(bytes.len()));
    }
    Ok(bytes
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
}

/// Interpret a hex string as a big-endian unsigned integer.
///
/// Odd length strings are accepted and read as if they had a leading zero.
pub fn u64_from_be_hex(value: &str) -> Result<u64, DecodeError> {
    if value.len() % 2 == 1 {
        u64_from_be_bytes(&hex::decode(format!("0{}", value))?)
    } else {
        u64_from_be_bytes(&hex::decode(value)?)
    }
}
