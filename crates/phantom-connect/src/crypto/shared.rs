/*
[INPUT]:  Peer public key, local secret key, nonce, ciphertext or plaintext
[OUTPUT]: Authenticated box encryption/decryption with a precomputed key
[POS]:    Crypto layer - NaCl box (X25519 + XSalsa20-Poly1305)
[UPDATE]: When changing the authenticated encryption scheme
*/

use crypto_box::aead::generic_array::GenericArray;
use crypto_box::aead::Aead;
use crypto_box::{PublicKey, SalsaBox, SecretKey};
use rand::RngCore;
use rand::rngs::OsRng;

use super::keypair::{EphemeralKeypair, PUBLIC_KEY_LENGTH};
use crate::error::{ConnectError, Result};

/// Nonce length of XSalsa20-Poly1305
pub const NONCE_LENGTH: usize = 24;

/// Precomputed box key, equivalent to NaCl `crypto_box_beforenm`
pub struct SharedSecret {
    cipher: SalsaBox,
}

impl SharedSecret {
    /// Derive the shared key from their public key and our secret key
    pub fn derive(their_public: &PublicKey, our_secret: &SecretKey) -> Self {
        Self {
            cipher: SalsaBox::new(their_public, our_secret),
        }
    }

    /// Authenticate and decrypt (`box.open.after`).
    ///
    /// Any tampering yields `None`; partial plaintext is never returned.
    pub fn open(&self, nonce: &[u8; NONCE_LENGTH], ciphertext: &[u8]) -> Option<Vec<u8>> {
        self.cipher
            .decrypt(GenericArray::from_slice(nonce), ciphertext)
            .ok()
    }

    /// Encrypt and authenticate (`box.after`)
    pub fn seal(&self, nonce: &[u8; NONCE_LENGTH], plaintext: &[u8]) -> Result<Vec<u8>> {
        self.cipher
            .encrypt(GenericArray::from_slice(nonce), plaintext)
            .map_err(|_| ConnectError::EncryptionFailed)
    }
}

/// Fresh random nonce
pub fn generate_nonce() -> [u8; NONCE_LENGTH] {
    let mut nonce = [0u8; NONCE_LENGTH];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// The authenticate-and-decrypt step of the handshake, behind a seam so the
/// decoder can be exercised with an instrumented primitive.
pub trait BoxOpener: Send + Sync {
    fn open(
        &self,
        keypair: &EphemeralKeypair,
        their_public: &[u8; PUBLIC_KEY_LENGTH],
        nonce: &[u8; NONCE_LENGTH],
        ciphertext: &[u8],
    ) -> Option<Vec<u8>>;
}

/// NaCl box opener
#[derive(Debug, Clone, Copy, Default)]
pub struct NaclBox;

impl BoxOpener for NaclBox {
    fn open(
        &self,
        keypair: &EphemeralKeypair,
        their_public: &[u8; PUBLIC_KEY_LENGTH],
        nonce: &[u8; NONCE_LENGTH],
        ciphertext: &[u8],
    ) -> Option<Vec<u8>> {
        keypair.shared_secret(their_public).open(nonce, ciphertext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_sides_derive_same_key() {
        let dapp = EphemeralKeypair::generate();
        let wallet = EphemeralKeypair::generate();
        let nonce = generate_nonce();

        let ciphertext = wallet
            .shared_secret(&dapp.public_key_bytes())
            .seal(&nonce, b"hello phantom")
            .unwrap();
        let plaintext = dapp
            .shared_secret(&wallet.public_key_bytes())
            .open(&nonce, &ciphertext)
            .unwrap();

        assert_eq!(plaintext, b"hello phantom");
        // Poly1305 tag
        assert_eq!(ciphertext.len(), b"hello phantom".len() + 16);
    }

    #[test]
    fn test_tampered_ciphertext_yields_nothing() {
        let dapp = EphemeralKeypair::generate();
        let wallet = EphemeralKeypair::generate();
        let nonce = generate_nonce();

        let mut ciphertext = wallet
            .shared_secret(&dapp.public_key_bytes())
            .seal(&nonce, b"payload")
            .unwrap();
        ciphertext[0] ^= 0x01;

        let shared = dapp.shared_secret(&wallet.public_key_bytes());
        assert!(shared.open(&nonce, &ciphertext).is_none());
    }

    #[test]
    fn test_wrong_keypair_yields_nothing() {
        let dapp = EphemeralKeypair::generate();
        let stranger = EphemeralKeypair::generate();
        let wallet = EphemeralKeypair::generate();
        let nonce = generate_nonce();

        let ciphertext = wallet
            .shared_secret(&dapp.public_key_bytes())
            .seal(&nonce, b"payload")
            .unwrap();

        assert!(
            NaclBox
                .open(&stranger, &wallet.public_key_bytes(), &nonce, &ciphertext)
                .is_none()
        );
        assert_eq!(
            NaclBox
                .open(&dapp, &wallet.public_key_bytes(), &nonce, &ciphertext)
                .unwrap(),
            b"payload"
        );
    }

    #[test]
    fn test_nonces_are_random() {
        assert_ne!(generate_nonce(), generate_nonce());
    }
}
