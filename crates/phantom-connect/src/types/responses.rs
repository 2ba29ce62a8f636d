/*
[INPUT]:  Redirect query strings from the wallet, decrypted payload bytes
[OUTPUT]: Typed handshake responses, wallet rejections, connect payloads
[POS]:    Data layer - inbound redirect parameters
[UPDATE]: When the wallet's redirect parameters or payload shape change
*/

use serde::{Deserialize, Serialize};
use url::Url;

use super::query_value;

pub const PHANTOM_ENCRYPTION_PUBLIC_KEY_PARAM: &str = "phantom_encryption_public_key";
pub const NONCE_PARAM: &str = "nonce";
pub const DATA_PARAM: &str = "data";
pub const ERROR_CODE_PARAM: &str = "errorCode";
pub const ERROR_MESSAGE_PARAM: &str = "errorMessage";

/// Encrypted handshake response, every field base58 encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseParams {
    pub phantom_encryption_public_key: String,
    pub nonce: String,
    pub data: String,
}

impl ResponseParams {
    /// Extract the three response parameters.
    ///
    /// Returns `None` unless all three are present and non-empty.
    pub fn from_query(query: &str) -> Option<Self> {
        Some(Self {
            phantom_encryption_public_key: query_value(query, PHANTOM_ENCRYPTION_PUBLIC_KEY_PARAM)?,
            nonce: query_value(query, NONCE_PARAM)?,
            data: query_value(query, DATA_PARAM)?,
        })
    }

    /// Append the parameters to a redirect link
    pub fn append_to(&self, url: &mut Url) {
        url.query_pairs_mut()
            .append_pair(
                PHANTOM_ENCRYPTION_PUBLIC_KEY_PARAM,
                &self.phantom_encryption_public_key,
            )
            .append_pair(NONCE_PARAM, &self.nonce)
            .append_pair(DATA_PARAM, &self.data);
    }
}

/// Error redirect sent by the wallet when the user declines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletErrorResponse {
    pub code: String,
    pub message: String,
}

impl WalletErrorResponse {
    pub fn from_query(query: &str) -> Option<Self> {
        let code = query_value(query, ERROR_CODE_PARAM)?;
        let message = query_value(query, ERROR_MESSAGE_PARAM).unwrap_or_default();
        Some(Self { code, message })
    }

    pub fn append_to(&self, url: &mut Url) {
        url.query_pairs_mut()
            .append_pair(ERROR_CODE_PARAM, &self.code)
            .append_pair(ERROR_MESSAGE_PARAM, &self.message);
    }
}

/// What a page load's query string says about the handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectResponse {
    Approved(ResponseParams),
    Rejected(WalletErrorResponse),
}

impl RedirectResponse {
    /// Classify a query string (with or without the leading `?`).
    ///
    /// `None` is the ordinary first-visit case.
    pub fn from_query(query: &str) -> Option<Self> {
        if let Some(rejection) = WalletErrorResponse::from_query(query) {
            return Some(RedirectResponse::Rejected(rejection));
        }
        ResponseParams::from_query(query).map(RedirectResponse::Approved)
    }
}

/// Decrypted connect payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectPayload {
    /// Wallet's Solana account public key (base58)
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}
