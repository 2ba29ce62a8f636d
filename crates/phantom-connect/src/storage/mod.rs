/*
[INPUT]:  Key names and string values
[OUTPUT]: Durable key-value persistence across the deeplink round trip
[POS]:    Storage layer - port for the cross-navigation handoff
[UPDATE]: When adding store backends or changing the key naming rules
*/

pub mod file;
pub mod memory;

pub use file::{FileStore, validate_key};
pub use memory::MemoryStore;

use crate::error::Result;

/// Fixed key under which the ephemeral secret key is stored
pub const SECRET_KEY_STORAGE_KEY: &str = "phantom_secret_key";

/// Durable string key-value store.
///
/// The only channel between a connect attempt and the page load that
/// receives the wallet's redirect.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the entry; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}
