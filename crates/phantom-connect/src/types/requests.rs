/*
[INPUT]:  Dapp identity, ephemeral public key, redirect target, cluster
[OUTPUT]: Phantom connect deeplink URLs
[POS]:    Data layer - outbound deeplink parameters
[UPDATE]: When the connect deeplink parameters change
*/

use url::Url;

use super::enums::Cluster;
use super::query_value;
use crate::error::{ConnectError, Result};

/// Phantom universal-link endpoint for the connect method
pub const PHANTOM_CONNECT_URL: &str = "https://phantom.app/ul/v1/connect";

pub const APP_URL_PARAM: &str = "app_url";
pub const DAPP_ENCRYPTION_PUBLIC_KEY_PARAM: &str = "dapp_encryption_public_key";
pub const REDIRECT_LINK_PARAM: &str = "redirect_link";
pub const CLUSTER_PARAM: &str = "cluster";

/// Outbound parameters of a connect deeplink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    /// Url identifying the dapp to the wallet
    pub app_url: Url,
    /// Base58 X25519 public key of this session's ephemeral keypair
    pub dapp_encryption_public_key: String,
    /// Where the wallet sends the user back to
    pub redirect_link: Url,
    pub cluster: Cluster,
}

impl ConnectParams {
    /// Append the parameters, in wire order, to the connect endpoint
    pub fn to_deeplink(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair(APP_URL_PARAM, self.app_url.as_str())
            .append_pair(
                DAPP_ENCRYPTION_PUBLIC_KEY_PARAM,
                &self.dapp_encryption_public_key,
            )
            .append_pair(REDIRECT_LINK_PARAM, self.redirect_link.as_str())
            .append_pair(CLUSTER_PARAM, self.cluster.as_str());
        url
    }

    /// Parse a connect deeplink back into its parameters.
    ///
    /// Every parameter is required.
    pub fn from_deeplink(url: &Url) -> Result<Self> {
        let query = url.query().unwrap_or_default();

        let app_url = query_value(query, APP_URL_PARAM)
            .ok_or(ConnectError::MissingParameter(APP_URL_PARAM))?;
        let dapp_encryption_public_key = query_value(query, DAPP_ENCRYPTION_PUBLIC_KEY_PARAM)
            .ok_or(ConnectError::MissingParameter(DAPP_ENCRYPTION_PUBLIC_KEY_PARAM))?;
        let redirect_link = query_value(query, REDIRECT_LINK_PARAM)
            .ok_or(ConnectError::MissingParameter(REDIRECT_LINK_PARAM))?;
        let cluster = query_value(query, CLUSTER_PARAM)
            .ok_or(ConnectError::MissingParameter(CLUSTER_PARAM))?;

        Ok(Self {
            app_url: Url::parse(&app_url)?,
            dapp_encryption_public_key,
            redirect_link: Url::parse(&redirect_link)?,
            cluster: cluster.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ConnectParams {
        ConnectParams {
            app_url: Url::parse("https://dapp.example").unwrap(),
            dapp_encryption_public_key: "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin".to_string(),
            redirect_link: Url::parse("https://dapp.example/connect?from=phantom").unwrap(),
            cluster: Cluster::Devnet,
        }
    }

    #[test]
    fn test_deeplink_parameter_order_and_encoding() {
        let endpoint = Url::parse(PHANTOM_CONNECT_URL).unwrap();
        let url = params().to_deeplink(&endpoint);

        assert!(url.as_str().starts_with("https://phantom.app/ul/v1/connect?app_url="));
        let keys: Vec<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
        assert_eq!(
            keys,
            vec![
                APP_URL_PARAM,
                DAPP_ENCRYPTION_PUBLIC_KEY_PARAM,
                REDIRECT_LINK_PARAM,
                CLUSTER_PARAM
            ]
        );
        assert!(url.as_str().ends_with("&cluster=devnet"));
        // Nested query of the redirect link must be escaped
        assert!(url.as_str().contains("redirect_link=https%3A%2F%2Fdapp.example%2Fconnect%3Ffrom%3Dphantom"));
    }

    #[test]
    fn test_deeplink_replaces_existing_endpoint_query() {
        let endpoint = Url::parse("https://phantom.app/ul/v1/connect?stale=1").unwrap();
        let url = params().to_deeplink(&endpoint);
        assert!(!url.as_str().contains("stale"));
    }

    #[test]
    fn test_from_deeplink_recovers_params() {
        let endpoint = Url::parse(PHANTOM_CONNECT_URL).unwrap();
        let original = params();
        let parsed = ConnectParams::from_deeplink(&original.to_deeplink(&endpoint)).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_from_deeplink_missing_parameter() {
        let url = Url::parse(
            "https://phantom.app/ul/v1/connect?app_url=https%3A%2F%2Fdapp.example&cluster=devnet",
        )
        .unwrap();
        let err = ConnectParams::from_deeplink(&url).unwrap_err();
        assert!(matches!(
            err,
            ConnectError::MissingParameter(DAPP_ENCRYPTION_PUBLIC_KEY_PARAM)
        ));
    }
}
