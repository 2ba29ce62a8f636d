/*
[INPUT]:  Connect deeplink URL, wallet account key
[OUTPUT]: Wallet redirect URL carrying an encrypted payload or an error
[POS]:    Wallet side of the handshake - for local testing and demos
[UPDATE]: When the wallet's response format or session claims change
*/

use chrono::Utc;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use serde::Serialize;
use url::Url;

use crate::crypto::{EphemeralKeypair, PUBLIC_KEY_LENGTH, decode_fixed, generate_nonce};
use crate::error::Result;
use crate::types::{
    ConnectParams, ConnectPayload, DAPP_ENCRYPTION_PUBLIC_KEY_PARAM, ResponseParams,
    WalletErrorResponse,
};

/// Error code Phantom uses when the user declines a request
pub const USER_REJECTED_CODE: &str = "4001";

#[derive(Serialize)]
struct SessionClaims<'a> {
    app_url: &'a str,
    timestamp: i64,
    chain: &'static str,
    cluster: &'static str,
}

/// Plays the wallet's part of the deeplink handshake.
///
/// Holds a Solana account identity (ed25519) and, separately, the X25519
/// keypair it encrypts responses with.
pub struct WalletResponder {
    identity: SigningKey,
    encryption: EphemeralKeypair,
}

impl WalletResponder {
    /// Wallet with a random account
    pub fn generate() -> Self {
        Self::from_identity(SigningKey::generate(&mut OsRng))
    }

    /// Wallet for an existing account key
    pub fn from_identity(identity: SigningKey) -> Self {
        Self {
            identity,
            encryption: EphemeralKeypair::generate(),
        }
    }

    /// Solana address of the wallet account
    pub fn public_key_base58(&self) -> String {
        bs58::encode(self.identity.verifying_key().as_bytes()).into_string()
    }

    pub fn encryption_public_key_base58(&self) -> String {
        self.encryption.public_key_base58()
    }

    /// Approve a connect deeplink: return its redirect link with the
    /// encrypted `{ public_key, session }` payload appended
    pub fn approve(&self, connect_url: &Url) -> Result<Url> {
        let params = ConnectParams::from_deeplink(connect_url)?;
        let dapp_public: [u8; PUBLIC_KEY_LENGTH] = decode_fixed(
            DAPP_ENCRYPTION_PUBLIC_KEY_PARAM,
            &params.dapp_encryption_public_key,
        )?;

        let payload = ConnectPayload {
            public_key: self.public_key_base58(),
            session: Some(self.issue_session(&params)?),
        };
        let response = self.seal_payload(&dapp_public, &payload)?;

        let mut redirect = params.redirect_link;
        response.append_to(&mut redirect);
        Ok(redirect)
    }

    /// Decline a connect deeplink with an error redirect
    pub fn reject(&self, connect_url: &Url, message: &str) -> Result<Url> {
        let params = ConnectParams::from_deeplink(connect_url)?;
        let mut redirect = params.redirect_link;
        WalletErrorResponse {
            code: USER_REJECTED_CODE.to_string(),
            message: message.to_string(),
        }
        .append_to(&mut redirect);
        Ok(redirect)
    }

    /// Encrypt a payload for the dapp with a fresh nonce
    pub fn seal_payload(
        &self,
        dapp_public: &[u8; PUBLIC_KEY_LENGTH],
        payload: &ConnectPayload,
    ) -> Result<ResponseParams> {
        self.seal_bytes(dapp_public, &serde_json::to_vec(payload)?)
    }

    /// Encrypt raw bytes for the dapp with a fresh nonce
    pub fn seal_bytes(
        &self,
        dapp_public: &[u8; PUBLIC_KEY_LENGTH],
        plaintext: &[u8],
    ) -> Result<ResponseParams> {
        let nonce = generate_nonce();
        let data = self
            .encryption
            .shared_secret(dapp_public)
            .seal(&nonce, plaintext)?;

        Ok(ResponseParams {
            phantom_encryption_public_key: self.encryption.public_key_base58(),
            nonce: bs58::encode(nonce).into_string(),
            data: bs58::encode(data).into_string(),
        })
    }

    /// Session token: base58 of `signature || claims_json`, signed by the
    /// wallet account
    fn issue_session(&self, params: &ConnectParams) -> Result<String> {
        let claims = SessionClaims {
            app_url: params.app_url.as_str(),
            timestamp: Utc::now().timestamp(),
            chain: "solana",
            cluster: params.cluster.as_str(),
        };
        let claims_json = serde_json::to_vec(&claims)?;
        let signature = self.identity.sign(&claims_json);

        let mut token = signature.to_bytes().to_vec();
        token.extend_from_slice(&claims_json);
        Ok(bs58::encode(token).into_string())
    }
}
