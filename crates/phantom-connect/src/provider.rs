/*
[INPUT]:  Host-injected wallet provider
[OUTPUT]: Connected wallet public key or provider error
[POS]:    Provider layer - native wallet integration abstraction
[UPDATE]: When adding provider capabilities or changing the connect result
*/

use async_trait::async_trait;

use crate::error::{ConnectError, Result};

/// Result of a native provider connect call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConnection {
    /// Wallet public key, already converted to its string form
    pub public_key: String,
}

/// Wallet provider injected by the host environment (browser extension,
/// embedded wallet).
///
/// The trait is async because the provider prompts the user before answering.
#[async_trait]
pub trait NativeProvider: Send + Sync {
    /// Capability flag; only Phantom providers are used directly
    fn is_phantom(&self) -> bool;

    /// Ask the wallet to connect and return its public key
    async fn connect(&self) -> Result<ProviderConnection>;
}

/// Mock provider for testing
#[derive(Debug, Clone)]
pub struct MockProvider {
    is_phantom: bool,
    outcome: std::result::Result<String, String>,
}

impl MockProvider {
    /// Phantom provider that approves with the given public key
    pub fn approving(public_key: &str) -> Self {
        Self {
            is_phantom: true,
            outcome: Ok(public_key.to_string()),
        }
    }

    /// Phantom provider that rejects with the given reason
    pub fn rejecting(reason: &str) -> Self {
        Self {
            is_phantom: true,
            outcome: Err(reason.to_string()),
        }
    }

    /// Some other injected wallet that does not advertise Phantom support
    pub fn foreign(public_key: &str) -> Self {
        Self {
            is_phantom: false,
            outcome: Ok(public_key.to_string()),
        }
    }
}

#[async_trait]
impl NativeProvider for MockProvider {
    fn is_phantom(&self) -> bool {
        self.is_phantom
    }

    async fn connect(&self) -> Result<ProviderConnection> {
        match &self.outcome {
            Ok(public_key) => Ok(ProviderConnection {
                public_key: public_key.clone(),
            }),
            Err(reason) => Err(ConnectError::ProviderRejected(reason.clone())),
        }
    }
}
