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

//! Hashing and Tezos base58check primitives.
//!
//! Tezos encodes keys, key hashes, signatures and operation hashes as base58check strings where
//! a fixed byte prefix determines the human readable start of the string (`edpk`, `tz1`, ...).
use std::convert::TryInto;

use blake2::digest::consts::{U20, U32};
use blake2::{Blake2b, Digest};
use ed25519_dalek::{Signature, Verifier as _, VerifyingKey};

use crate::KeyError;

type Blake2b256 = Blake2b<U32>;
type Blake2b160 = Blake2b<U20>;

/// Base58check prefix of a value together with the length of its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prefix {
    pub kind: &'static str,
    pub bytes: &'static [u8],
    pub payload_len: usize,
}

pub const ED25519_SEED: Prefix = Prefix {
    kind: "edsk",
    bytes: &[13, 15, 58, 7],
    payload_len: 32,
};

pub const ED25519_SECRET_KEY: Prefix = Prefix {
    kind: "edsk",
    bytes: &[43, 246, 78, 7],
    payload_len: 64,
};

pub const ED25519_PUBLIC_KEY: Prefix = Prefix {
    kind: "edpk",
    bytes: &[13, 15, 37, 217],
    payload_len: 32,
};

pub const ED25519_SIGNATURE: Prefix = Prefix {
    kind: "edsig",
    bytes: &[9, 245, 205, 134, 18],
    payload_len: 64,
};

pub const GENERIC_SIGNATURE: Prefix = Prefix {
    kind: "sig",
    bytes: &[4, 130, 43],
    payload_len: 64,
};

pub const ED25519_PUBLIC_KEY_HASH: Prefix = Prefix {
    kind: "tz1",
    bytes: &[6, 161, 159],
    payload_len: 20,
};

pub const OPERATION_HASH: Prefix = Prefix {
    kind: "operation hash",
    bytes: &[5, 116],
    payload_len: 32,
};

pub const BLOCK_HASH: Prefix = Prefix {
    kind: "block hash",
    bytes: &[1, 52],
    payload_len: 32,
};

/// BLAKE2b digest with a 32 byte output and no key.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    Blake2b256::digest(data).into()
}

/// BLAKE2b digest with a 20 byte output. Used to derive public key hashes.
pub fn blake2b_160(data: &[u8]) -> [u8; 20] {
    Blake2b160::digest(data).into()
}

/// Encode `payload` as a base58check string with the given prefix.
pub fn b58_encode(prefix: Prefix, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(prefix.bytes.len() + payload.len());
    data.extend_from_slice(prefix.bytes);
    data.extend_from_slice(payload);
    bs58::encode(data).with_check().into_string()
}

/// Decode a base58check string, check its prefix and payload length and return the payload.
pub fn b58_decode(prefix: Prefix, encoded: &str) -> Result<Vec<u8>, KeyError> {
    let data = bs58::decode(encoded)
        .with_check(None)
        .into_vec()
        .map_err(|err| KeyError::Base58(err.to_string()))?;
    if !data.starts_with(prefix.bytes) {
        return Err(KeyError::Prefix { kind: prefix.kind });
    }
    let payload = data[prefix.bytes.len()..].to_vec();
    if payload.len() != prefix.payload_len {
        return Err(KeyError::Length {
            kind: prefix.kind,
            expected: prefix.payload_len,
            actual: payload.len(),
        });
    }
    Ok(payload)
}

/// Decode a base58check value into a fixed size array.
pub fn b58_decode_array<const N: usize>(
    prefix: Prefix,
    encoded: &str,
) -> Result<[u8; N], KeyError> {
    let payload = b58_decode(prefix, encoded)?;
    let actual = payload.len();
    payload.try_into().map_err(|_| KeyError::Length {
        kind: prefix.kind,
        expected: N,
        actual,
    })
}

/// Return the `tz1` address of an `edpk` public key.
pub fn public_key_hash(public_key: &str) -> Result<String, KeyError> {
    let key = b58_decode(ED25519_PUBLIC_KEY, public_key)?;
    Ok(b58_encode(ED25519_PUBLIC_KEY_HASH, &blake2b_160(&key)))
}

/// Verify an `edsig` signature of `message` made by the `edpk` key.
///
/// Signers sign the BLAKE2b-256 digest of the message, not the message itself.
pub fn verify(public_key: &str, message: &[u8], signature: &str) -> Result<(), KeyError> {
    let key: [u8; 32] = b58_decode_array(ED25519_PUBLIC_KEY, public_key)?;
    let signature: [u8; 64] = b58_decode_array(ED25519_SIGNATURE, signature)?;
    let key = VerifyingKey::from_bytes(&key).map_err(|_| KeyError::BadSignature)?;
    key.verify(&blake2b_256(message), &Signature::from_bytes(&signature))
        .map_err(|_| KeyError::BadSignature)
}

#[cfg(test)]
mod test {
    use super::*;

    const PUBLIC_KEY: &str = "edpkuDMUm7Y53wp4gxeLBXuiAhXZrLn8XB1R83ksvvesH8Lp8bmCfK";
    const ADDRESS: &str = "tz1QFD9WqLWZmmAuqnnTPPUjfauitYEWdshv";
    const SIGNATURE: &str = "edsigu1mRCtZquLvspcxaYXVZdsKKSqHnXevnrmh1T63Dq1Rr8M1giVLvapiDFK6TQCEyY6xytdGnKgZyVSHDVnub7puy54bD1y";

    #[test]
    fn blake2b_256_known_digest() {
        assert_eq!(
            hex::encode(blake2b_256(&[0x1, 0x2, 0x3, 0x4])),
            "28517e4cdf6c90798c1a983b03727ca7743c21a3880672429ccfc5bd15ea5f72"
        );
    }

    #[test]
    fn address_of_public_key() {
        assert_eq!(public_key_hash(PUBLIC_KEY).unwrap(), ADDRESS);
    }

    #[test]
    fn base58_prefix_is_checked() {
        let err = b58_decode(ED25519_PUBLIC_KEY, ADDRESS).unwrap_err();
        assert_eq!(err, KeyError::Prefix { kind: "edpk" });
    }

    #[test]
    fn base58_checksum_is_checked() {
        let mut corrupted = ADDRESS.to_string();
        corrupted.pop();
        corrupted.push('w');
        assert!(b58_decode(ED25519_PUBLIC_KEY_HASH, &corrupted).is_err());
    }

    #[test]
    fn verify_known_signature() {
        verify(PUBLIC_KEY, b"Hello world", SIGNATURE).unwrap();
    }

    #[test]
    fn verify_rejects_other_message() {
        assert_eq!(
            verify(PUBLIC_KEY, b"Hello world!", SIGNATURE),
            Err(KeyError::BadSignature)
        );
    }
}
