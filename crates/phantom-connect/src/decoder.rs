/*
[INPUT]:  Redirect query string, session context with its stored secret key
[OUTPUT]: Connected wallet identity or a logged, terminal handshake failure
[POS]:    Handshake layer - second half of the wallet handshake
[UPDATE]: When response parameters, payload shape or failure handling change
*/

use tracing::{debug, error, info, warn};
use url::Url;

use crate::crypto::{
    BoxOpener, EphemeralKeypair, NONCE_LENGTH, NaclBox, PUBLIC_KEY_LENGTH, decode_fixed,
};
use crate::error::{ConnectError, Result};
use crate::session::{ConnectMethod, SessionContext};
use crate::types::{
    ConnectPayload, DATA_PARAM, NONCE_PARAM, PHANTOM_ENCRYPTION_PUBLIC_KEY_PARAM,
    RedirectResponse, ResponseParams, WalletErrorResponse,
};

/// What happens to the stored secret key once a handshake was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretRetention {
    /// Leave it in the store until the next connect attempt overwrites it
    #[default]
    Keep,
    /// Remove it after the handshake succeeds or fails past the key lookup
    ClearOnCompletion,
}

/// Result of inspecting one page load
#[derive(Debug)]
pub enum HandshakeOutcome {
    /// Query carries no handshake response (ordinary first visit)
    NotAHandshake,
    /// Payload decrypted; the session state now holds the wallet
    Connected(ConnectPayload),
    /// Wallet sent an error redirect
    Rejected(WalletErrorResponse),
    /// Handshake failed and will not be retried
    Abandoned(ConnectError),
}

impl HandshakeOutcome {
    pub fn is_connected(&self) -> bool {
        matches!(self, HandshakeOutcome::Connected(_))
    }
}

/// Completes the deeplink handshake on the page load that receives the
/// wallet's redirect
#[derive(Debug, Clone, Default)]
pub struct HandshakeDecoder<O = NaclBox> {
    opener: O,
    retention: SecretRetention,
}

impl HandshakeDecoder<NaclBox> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<O: BoxOpener> HandshakeDecoder<O> {
    /// Decoder using a custom box opener
    pub fn with_opener(opener: O) -> Self {
        Self {
            opener,
            retention: SecretRetention::default(),
        }
    }

    pub fn with_retention(mut self, retention: SecretRetention) -> Self {
        self.retention = retention;
        self
    }

    pub fn retention(&self) -> SecretRetention {
        self.retention
    }

    /// Decode the redirect carried by a full page URL
    pub fn decode_url(&self, session: &mut SessionContext, url: &Url) -> HandshakeOutcome {
        self.decode(session, url.query().unwrap_or_default())
    }

    /// Inspect a query string and, if it carries a handshake response,
    /// complete the handshake.
    ///
    /// Never fails: every error is logged and reported as `Abandoned`, with
    /// the connection state left untouched.
    pub fn decode(&self, session: &mut SessionContext, query: &str) -> HandshakeOutcome {
        let params = match RedirectResponse::from_query(query) {
            None => {
                debug!("no handshake response in query");
                return HandshakeOutcome::NotAHandshake;
            }
            Some(RedirectResponse::Rejected(rejection)) => {
                let err = ConnectError::WalletRejected {
                    code: rejection.code.clone(),
                    message: rejection.message.clone(),
                };
                warn!(error = %err, "wallet declined the connection");
                return HandshakeOutcome::Rejected(rejection);
            }
            Some(RedirectResponse::Approved(params)) => params,
        };

        let result = self.open_response(session, &params);

        if self.retention == SecretRetention::ClearOnCompletion
            && !matches!(
                result,
                Err(ConnectError::MissingSecretKey(_)
                    | ConnectError::Storage(_)
                    | ConnectError::Io(_))
            )
        {
            if let Err(err) = session.clear_stored_secret() {
                warn!(error = %err, "failed to clear stored secret key");
            }
        }

        match result {
            Ok(payload) => {
                info!(
                    public_key = %payload.public_key,
                    has_session = payload.session.is_some(),
                    "wallet connected through deeplink"
                );
                session.state_mut().set_connected(
                    payload.public_key.clone(),
                    payload.session.clone(),
                    ConnectMethod::Deeplink,
                );
                HandshakeOutcome::Connected(payload)
            }
            Err(err) => {
                error!(
                    error = %err,
                    untrusted_input = err.is_untrusted_input(),
                    "handshake abandoned"
                );
                HandshakeOutcome::Abandoned(err)
            }
        }
    }

    fn open_response(
        &self,
        session: &SessionContext,
        params: &ResponseParams,
    ) -> Result<ConnectPayload> {
        let stored = session
            .stored_secret()?
            .ok_or_else(|| ConnectError::MissingSecretKey(session.storage_key().to_string()))?;

        // Length is checked here, before any decryption is attempted
        let keypair = EphemeralKeypair::from_secret_key_base58(&stored)?;

        let their_public: [u8; PUBLIC_KEY_LENGTH] = decode_fixed(
            PHANTOM_ENCRYPTION_PUBLIC_KEY_PARAM,
            &params.phantom_encryption_public_key,
        )?;
        let nonce: [u8; NONCE_LENGTH] = decode_fixed(NONCE_PARAM, &params.nonce)?;
        let ciphertext = bs58::decode(params.data.trim())
            .into_vec()
            .map_err(|e| ConnectError::base58(DATA_PARAM, e))?;

        let plaintext = self
            .opener
            .open(&keypair, &their_public, &nonce, &ciphertext)
            .ok_or(ConnectError::DecryptionFailed)?;

        let payload: ConnectPayload = serde_json::from_str(std::str::from_utf8(&plaintext)?)?;
        Ok(payload)
    }
}
