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

//! Signing of commands and base chain operations.
use ed25519_dalek::{Signer as _, SigningKey};

use tzwitter_core::crypto::{self, ED25519_SECRET_KEY, ED25519_SEED};

use crate::interface::*;

/// Result of signing a hex string. Field names follow the Tezos toolkits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedBytes {
    /// The signed bytes, hex encoded.
    pub bytes: String,
    /// Signature with the generic `sig` prefix.
    pub sig: String,
    /// Signature with the curve specific prefix, `edsig` for ed25519 keys.
    pub prefix_sig: String,
    /// `bytes` followed by the raw signature, hex encoded.
    pub sbytes: String,
}

/// Holds the secret key of an account.
///
/// [Signer::sign] signs the BLAKE2b-256 digest of the bytes, never the bytes themselves.
#[async_trait::async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, bytes: &str) -> Result<SignedBytes, Error>;

    /// Base58 public key, `edpk...` for ed25519 keys.
    async fn public_key(&self) -> Result<String, Error>;

    async fn public_key_hash(&self) -> Result<PublicKeyHash, Error>;
}

/// [Signer] holding an ed25519 key in memory.
#[derive(Clone)]
pub struct InMemorySigner {
    key: SigningKey,
}

impl InMemorySigner {
    /// Create a signer from an `edsk` secret key. Both the 32 byte seed form and the 64 byte
    /// expanded form are accepted.
    pub fn from_secret_key(secret_key: &str) -> Result<Self, KeyError> {
        let seed: [u8; 32] = match crypto::b58_decode_array(ED25519_SEED, secret_key) {
            Ok(seed) => seed,
            Err(KeyError::Prefix { .. }) | Err(KeyError::Length { .. }) => {
                let expanded: [u8; 64] = crypto::b58_decode_array(ED25519_SECRET_KEY, secret_key)?;
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&expanded[..32]);
                seed
            }
            Err(err) => return Err(err),
        };
        Ok(InMemorySigner::from_seed(seed))
    }

    pub fn from_seed(seed: [u8; 32]) -> Self {
        InMemorySigner {
            key: SigningKey::from_bytes(&seed),
        }
    }

    /// Create a signer with a random key.
    pub fn generate() -> Self {
        InMemorySigner::from_seed(rand::random())
    }

    pub fn seed(&self) -> [u8; 32] {
        self.key.to_bytes()
    }

    /// Secret key in the 32 byte `edsk` form.
    pub fn secret_key(&self) -> String {
        crypto::b58_encode(ED25519_SEED, &self.seed())
    }

    fn edpk(&self) -> String {
        crypto::b58_encode(
            crypto::ED25519_PUBLIC_KEY,
            self.key.verifying_key().as_bytes(),
        )
    }

    pub fn address(&self) -> PublicKeyHash {
        let hash = crypto::blake2b_160(self.key.verifying_key().as_bytes());
        PublicKeyHash::from_b58(&crypto::b58_encode(
            crypto::ED25519_PUBLIC_KEY_HASH,
            &hash,
        ))
        .expect("freshly encoded tz1 address is valid")
    }
}

impl std::fmt::Debug for InMemorySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySigner")
            .field("public_key", &self.edpk())
            .finish()
    }
}

#[async_trait::async_trait]
impl Signer for InMemorySigner {
    async fn sign(&self, bytes: &str) -> Result<SignedBytes, Error> {
        let decoded = hex::decode(bytes).map_err(DecodeError::from)?;
        let signature = self.key.sign(&crypto::blake2b_256(&decoded)).to_bytes();
        Ok(SignedBytes {
            bytes: bytes.to_string(),
            sig: crypto::b58_encode(crypto::GENERIC_SIGNATURE, &signature),
            prefix_sig: crypto::b58_encode(crypto::ED25519_SIGNATURE, &signature),
            sbytes: format!("{}{}", bytes, hex::encode(signature)),
        })
    }

    async fn public_key(&self) -> Result<String, Error> {
        Ok(self.edpk())
    }

    async fn public_key_hash(&self) -> Result<PublicKeyHash, Error> {
        Ok(self.address())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET_KEY: &str = "edsk3a5SDDdMWw3Q5hPiJwDXUosmZMTuKQkriPqY6UqtSfdLifpZbB";
    const PUBLIC_KEY: &str = "edpkuDMUm7Y53wp4gxeLBXuiAhXZrLn8XB1R83ksvvesH8Lp8bmCfK";
    const ADDRESS: &str = "tz1QFD9WqLWZmmAuqnnTPPUjfauitYEWdshv";

    #[tokio::test]
    async fn keys_of_imported_secret() {
        let signer = InMemorySigner::from_secret_key(SECRET_KEY).unwrap();
        assert_eq!(signer.public_key().await.unwrap(), PUBLIC_KEY);
        assert_eq!(signer.public_key_hash().await.unwrap().as_str(), ADDRESS);
        assert_eq!(signer.secret_key(), SECRET_KEY);
    }

    #[tokio::test]
    async fn expanded_secret_key() {
        let signer = InMemorySigner::from_secret_key(SECRET_KEY).unwrap();
        let mut expanded = signer.seed().to_vec();
        expanded.extend_from_slice(signer.key.verifying_key().as_bytes());
        let expanded = crypto::b58_encode(ED25519_SECRET_KEY, &expanded);
        let imported = InMemorySigner::from_secret_key(&expanded).unwrap();
        assert_eq!(imported.address(), signer.address());
    }

    #[test]
    fn invalid_secret_key() {
        assert!(InMemorySigner::from_secret_key(PUBLIC_KEY).is_err());
        assert!(InMemorySigner::from_secret_key("edsk").is_err());
    }

    #[tokio::test]
    async fn signature_matches_known_vector() {
        let signer = InMemorySigner::from_secret_key(SECRET_KEY).unwrap();
        let bytes = hex::encode("Hello world");
        let signed = signer.sign(&bytes).await.unwrap();
        assert_eq!(
            signed.prefix_sig,
            "edsigu1mRCtZquLvspcxaYXVZdsKKSqHnXevnrmh1T63Dq1Rr8M1giVLvapiDFK6TQCEyY6xytdGnKgZyVSHDVnub7puy54bD1y"
        );
        assert!(signed.sig.starts_with("sig"));
        assert_eq!(signed.sbytes.len(), bytes.len() + 128);
        assert!(signed.sbytes.starts_with(&bytes));
        assert!(crypto::verify(PUBLIC_KEY, b"Hello world", &signed.prefix_sig).is_ok());
    }

    #[tokio::test]
    async fn non_hex_input() {
        let signer = InMemorySigner::generate();
        assert!(matches!(
            signer.sign("zz").await,
            Err(Error::Decode(DecodeError::Hex(_)))
        ));
    }
}
