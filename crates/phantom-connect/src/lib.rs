/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Phantom connect crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod connector;
pub mod crypto;
pub mod decoder;
pub mod environment;
pub mod error;
pub mod provider;
pub mod responder;
pub mod session;
pub mod storage;
pub mod types;

// Re-export the handshake entry points
pub use connector::{ConnectOutcome, ConnectStrategy, Connector, ConnectorConfig};
pub use decoder::{HandshakeDecoder, HandshakeOutcome, SecretRetention};

pub use crypto::{BoxOpener, EphemeralKeypair, NaclBox, SharedSecret};
pub use environment::{Environment, Navigation, Navigator, RecordingNavigator};
pub use error::{ConnectError, Result};
pub use provider::{MockProvider, NativeProvider, ProviderConnection};
pub use responder::WalletResponder;
pub use session::{ConnectMethod, ConnectedWallet, ConnectionState, SessionContext};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SECRET_KEY_STORAGE_KEY, validate_key};

// Re-export all types
pub use types::*;
