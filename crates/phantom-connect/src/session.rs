/*
[INPUT]:  Key-value store, connect results, decoded handshake payloads
[OUTPUT]: Session context shared by connector and decoder, connection view state
[POS]:    Session layer - explicit replacement for page-global state
[UPDATE]: When connection state fields or key persistence rules change
*/

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::crypto::{EphemeralKeypair, decode_fixed};
use crate::error::{ConnectError, Result};
use crate::storage::{KeyValueStore, SECRET_KEY_STORAGE_KEY};

/// Which strategy produced the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectMethod {
    Native,
    Deeplink,
}

/// Connected wallet identity, held in memory only
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedWallet {
    pub public_key: String,
    pub session: Option<String>,
    pub method: ConnectMethod,
    pub connected_at: DateTime<Utc>,
}

impl ConnectedWallet {
    /// `ABCD...WXYZ` form used in status lines
    pub fn short_key(&self) -> String {
        let chars: Vec<char> = self.public_key.chars().collect();
        let head: String = chars.iter().take(4).collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("{head}...{tail}")
    }

    /// Interpret the public key as a Solana (ed25519) account key
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        let bytes: [u8; 32] = decode_fixed("public_key", &self.public_key)?;
        VerifyingKey::from_bytes(&bytes)
            .map_err(|e| ConnectError::InvalidPublicKey(e.to_string()))
    }
}

/// What the page shows about the wallet connection
#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    connecting: bool,
    wallet: Option<ConnectedWallet>,
}

impl ConnectionState {
    pub fn is_connecting(&self) -> bool {
        self.connecting
    }

    pub fn is_connected(&self) -> bool {
        self.wallet.is_some()
    }

    pub fn wallet(&self) -> Option<&ConnectedWallet> {
        self.wallet.as_ref()
    }

    pub fn public_key(&self) -> Option<&str> {
        self.wallet.as_ref().map(|w| w.public_key.as_str())
    }

    pub fn session(&self) -> Option<&str> {
        self.wallet.as_ref().and_then(|w| w.session.as_deref())
    }

    /// Label of the connect button
    pub fn button_label(&self) -> &'static str {
        if self.connecting {
            "Connecting..."
        } else if self.is_connected() {
            "Connected"
        } else {
            "Connect Phantom Wallet"
        }
    }

    /// Status line under the button
    pub fn status_text(&self) -> String {
        match &self.wallet {
            Some(wallet) => format!("Connected: {}", wallet.short_key()),
            None => "Not connected".to_string(),
        }
    }

    pub(crate) fn begin_connecting(&mut self) {
        self.connecting = true;
    }

    pub(crate) fn finish_connecting(&mut self) {
        self.connecting = false;
    }

    pub(crate) fn set_connected(
        &mut self,
        public_key: String,
        session: Option<String>,
        method: ConnectMethod,
    ) {
        self.wallet = Some(ConnectedWallet {
            public_key,
            session,
            method,
            connected_at: Utc::now(),
        });
    }

    pub(crate) fn clear(&mut self) {
        self.wallet = None;
    }
}

/// Per-page session: the ephemeral keypair, the durable store holding its
/// secret, and the connection state. Passed explicitly into the connector
/// and the decoder.
pub struct SessionContext {
    store: Arc<dyn KeyValueStore>,
    storage_key: String,
    keypair: Option<EphemeralKeypair>,
    state: ConnectionState,
}

impl SessionContext {
    /// Create a session backed by `store`, using the default storage key
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            storage_key: SECRET_KEY_STORAGE_KEY.to_string(),
            keypair: None,
            state: ConnectionState::default(),
        }
    }

    /// Override the storage key name
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Keypair generated by the last connect attempt of this page instance
    pub fn keypair(&self) -> Option<&EphemeralKeypair> {
        self.keypair.as_ref()
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut ConnectionState {
        &mut self.state
    }

    /// Generate a fresh keypair and persist its secret, overwriting any
    /// previous one. A handshake still in flight for the old key can no
    /// longer complete.
    pub fn rotate_keypair(&mut self) -> Result<&EphemeralKeypair> {
        let keypair = EphemeralKeypair::generate();
        self.store
            .set(&self.storage_key, &keypair.secret_key_base58())?;
        Ok(self.keypair.insert(keypair))
    }

    /// Base58 secret key left by a previous connect attempt, if any
    pub fn stored_secret(&self) -> Result<Option<String>> {
        self.store.get(&self.storage_key)
    }

    pub fn clear_stored_secret(&self) -> Result<()> {
        self.store.remove(&self.storage_key)
    }

    /// Forget the connected wallet (in-memory only)
    pub fn disconnect(&mut self) {
        self.state.clear();
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("storage_key", &self.storage_key)
            .field("keypair", &self.keypair)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
