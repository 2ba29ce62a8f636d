/*
[INPUT]:  OS randomness or stored base58 secret key bytes
[OUTPUT]: X25519 box keypairs with base58 encodings
[POS]:    Crypto layer - ephemeral key exchange keypair
[UPDATE]: When changing the box scheme or key encoding
*/

use std::fmt;

use crypto_box::{PublicKey, SecretKey};
use rand::rngs::OsRng;

use super::shared::SharedSecret;
use crate::error::{ConnectError, Result};

/// Secret key length of the box scheme (X25519 scalar)
pub const SECRET_KEY_LENGTH: usize = crypto_box::KEY_SIZE;
/// Public key length of the box scheme (X25519 point)
pub const PUBLIC_KEY_LENGTH: usize = crypto_box::KEY_SIZE;

/// One-shot X25519 keypair used for a single deeplink handshake.
///
/// Distinct from any signing keypair: it is only used for box key agreement.
pub struct EphemeralKeypair {
    secret: SecretKey,
    public: PublicKey,
}

impl EphemeralKeypair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let secret = SecretKey::generate(&mut OsRng);
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Create keypair from existing secret key bytes (32 bytes)
    pub fn from_secret_key(bytes: &[u8; SECRET_KEY_LENGTH]) -> Self {
        let secret = SecretKey::from(*bytes);
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Restore a keypair from a stored base58 secret key.
    ///
    /// Rejects anything that is not exactly [`SECRET_KEY_LENGTH`] bytes.
    pub fn from_secret_key_base58(encoded: &str) -> Result<Self> {
        let bytes = bs58::decode(encoded.trim())
            .into_vec()
            .map_err(|e| ConnectError::base58("secret key", e))?;

        let bytes: [u8; SECRET_KEY_LENGTH] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| ConnectError::InvalidSecretKeyLength {
                    expected: SECRET_KEY_LENGTH,
                    actual: bytes.len(),
                })?;

        Ok(Self::from_secret_key(&bytes))
    }

    /// Get the public key in base58 encoding (for `dapp_encryption_public_key`)
    pub fn public_key_base58(&self) -> String {
        bs58::encode(self.public.as_bytes()).into_string()
    }

    /// Get the raw public key bytes
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        *self.public.as_bytes()
    }

    /// Get the secret key in base58 encoding (for durable storage)
    pub fn secret_key_base58(&self) -> String {
        bs58::encode(self.secret.to_bytes()).into_string()
    }

    /// Get the raw secret key bytes
    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.secret.to_bytes()
    }

    /// Precompute the shared secret with a peer's public key (`box.before`)
    pub fn shared_secret(&self, their_public: &[u8; PUBLIC_KEY_LENGTH]) -> SharedSecret {
        SharedSecret::derive(&PublicKey::from(*their_public), &self.secret)
    }
}

impl fmt::Debug for EphemeralKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKeypair")
            .field("public", &self.public_key_base58())
            .finish_non_exhaustive()
    }
}

/// Decode a base58 value that must be exactly `N` bytes long
pub(crate) fn decode_fixed<const N: usize>(field: &'static str, encoded: &str) -> Result<[u8; N]> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(|e| ConnectError::base58(field, e))?;

    bytes
        .as_slice()
        .try_into()
        .map_err(|_| ConnectError::InvalidLength {
            field,
            expected: N,
            actual: bytes.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation() {
        let keypair = EphemeralKeypair::generate();
        assert_eq!(keypair.public_key_bytes().len(), PUBLIC_KEY_LENGTH);
        assert_ne!(
            keypair.public_key_base58(),
            EphemeralKeypair::generate().public_key_base58()
        );
    }

    #[test]
    fn test_secret_key_base58_restores_same_public_key() {
        let keypair = EphemeralKeypair::generate();
        let restored = EphemeralKeypair::from_secret_key_base58(&keypair.secret_key_base58()).unwrap();
        assert_eq!(restored.public_key_base58(), keypair.public_key_base58());
        assert_eq!(restored.secret_key_bytes(), keypair.secret_key_bytes());
    }

    #[test]
    fn test_secret_key_wrong_length_rejected() {
        let too_long = bs58::encode([7u8; 64]).into_string();
        let err = EphemeralKeypair::from_secret_key_base58(&too_long).unwrap_err();
        assert!(matches!(
            err,
            ConnectError::InvalidSecretKeyLength {
                expected: 32,
                actual: 64
            }
        ));
    }

    #[test]
    fn test_secret_key_invalid_base58_rejected() {
        let err = EphemeralKeypair::from_secret_key_base58("0OIl").unwrap_err();
        assert!(matches!(err, ConnectError::Base58 { .. }));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let keypair = EphemeralKeypair::generate();
        let debug = format!("{keypair:?}");
        assert!(!debug.contains(&keypair.secret_key_base58()));
        assert!(debug.contains(&keypair.public_key_base58()));
    }

    #[test]
    fn test_decode_fixed_length() {
        let encoded = bs58::encode([1u8; 24]).into_string();
        let nonce: [u8; 24] = decode_fixed("nonce", &encoded).unwrap();
        assert_eq!(nonce, [1u8; 24]);

        let err = decode_fixed::<32>("phantom_encryption_public_key", &encoded).unwrap_err();
        assert!(matches!(
            err,
            ConnectError::InvalidLength {
                expected: 32,
                actual: 24,
                ..
            }
        ));
    }
}
