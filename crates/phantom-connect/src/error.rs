/*
[INPUT]:  Error sources (storage, encoding, crypto, payload, provider, navigation)
[OUTPUT]: Structured error type shared by connector and decoder
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use thiserror::Error;

/// Main error type for the Phantom connect flow
#[derive(Error, Debug)]
pub enum ConnectError {
    /// Native provider rejected or failed the connect call
    #[error("Provider connect failed: {0}")]
    ProviderRejected(String),

    /// Wallet redirected back with an error instead of an encrypted payload
    #[error("Wallet rejected connection (code {code}): {message}")]
    WalletRejected { code: String, message: String },

    /// A required connect or response parameter is missing
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Handshake response arrived but no secret key is stored for it
    #[error("Secret key not found in storage under '{0}'")]
    MissingSecretKey(String),

    /// Stored secret key has the wrong length for the box scheme
    #[error("Invalid secret key length: expected {expected} bytes, got {actual}")]
    InvalidSecretKeyLength { expected: usize, actual: usize },

    /// Decoded value has the wrong length (public key, nonce)
    #[error("Invalid {field} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Value is not valid base58
    #[error("Invalid base58 in {field}: {source}")]
    Base58 {
        field: &'static str,
        #[source]
        source: bs58::decode::Error,
    },

    /// Value decodes but is not a usable public key
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Box authentication failed; no plaintext is available
    #[error("Failed to decrypt data")]
    DecryptionFailed,

    /// Box sealing failed
    #[error("Failed to encrypt data")]
    EncryptionFailed,

    /// Decrypted payload is not UTF-8
    #[error("Decrypted payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Key-value store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem failure in a file-backed store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Redirect or new-context navigation failed
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConnectError {
    /// Check if the user has to start over from the connector.
    ///
    /// Every handshake failure is terminal; only configuration and
    /// environment problems are fixed without a new connect attempt.
    pub fn requires_reconnect(&self) -> bool {
        !matches!(
            self,
            ConnectError::Config(_) | ConnectError::UrlParse(_) | ConnectError::Navigation(_)
        )
    }

    /// Check if the error came from data the wallet (or a third party) sent back
    pub fn is_untrusted_input(&self) -> bool {
        matches!(
            self,
            ConnectError::InvalidSecretKeyLength { .. }
                | ConnectError::InvalidLength { .. }
                | ConnectError::Base58 { .. }
                | ConnectError::InvalidPublicKey(_)
                | ConnectError::DecryptionFailed
                | ConnectError::InvalidUtf8(_)
                | ConnectError::Serialization(_)
        )
    }

    pub(crate) fn base58(field: &'static str, source: bs58::decode::Error) -> Self {
        ConnectError::Base58 { field, source }
    }
}

/// Result type alias for connect operations
pub type Result<T> = std::result::Result<T, ConnectError>;
