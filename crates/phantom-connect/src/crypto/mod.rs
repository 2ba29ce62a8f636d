/*
[INPUT]:  Random seeds, stored secret keys, peer public keys
[OUTPUT]: Ephemeral keypairs and precomputed box keys
[POS]:    Crypto layer - key agreement and authenticated encryption
[UPDATE]: When the handshake encryption scheme changes
*/

pub mod keypair;
pub mod shared;

pub use keypair::{EphemeralKeypair, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
pub use shared::{BoxOpener, NONCE_LENGTH, NaclBox, SharedSecret, generate_nonce};

pub(crate) use keypair::decode_fixed;
