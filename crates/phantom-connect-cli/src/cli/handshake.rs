/*
[INPUT]:  Loaded CliConfig, deeplink or redirect URLs from the command line
[OUTPUT]: Deeplinks, simulated wallet redirects and decoded connection reports
[POS]:    CLI command layer - drives Connector, HandshakeDecoder and WalletResponder
[UPDATE]: When subcommands or their output format change
*/

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use phantom_connect::{
    ConnectOutcome, Connector, Environment, FileStore, HandshakeDecoder, HandshakeOutcome,
    Navigator, SessionContext, WalletResponder, responder::USER_REJECTED_CODE,
};
use serde::Serialize;
use tracing::info;
use url::Url;

use crate::config::CliConfig;

/// Navigator for a terminal host: the deeplink is printed for the user to open
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn redirect(&self, url: &Url) -> phantom_connect::Result<()> {
        println!("{url}");
        Ok(())
    }

    fn open_new_context(&self, url: &Url) -> phantom_connect::Result<()> {
        println!("{url}");
        Ok(())
    }
}

/// Machine-readable result of `decode`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecodeReport {
    Connected {
        public_key: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        session: Option<String>,
        status_text: String,
    },
    Rejected {
        code: String,
        message: String,
    },
    NotAHandshake,
    Abandoned {
        error: String,
    },
}

impl DecodeReport {
    fn from_outcome(outcome: HandshakeOutcome, session: &SessionContext) -> Self {
        match outcome {
            HandshakeOutcome::Connected(payload) => DecodeReport::Connected {
                public_key: payload.public_key,
                session: payload.session,
                status_text: session.state().status_text(),
            },
            HandshakeOutcome::Rejected(rejection) => DecodeReport::Rejected {
                code: rejection.code,
                message: rejection.message,
            },
            HandshakeOutcome::NotAHandshake => DecodeReport::NotAHandshake,
            HandshakeOutcome::Abandoned(err) => DecodeReport::Abandoned {
                error: err.to_string(),
            },
        }
    }
}

fn open_session(config: &CliConfig) -> SessionContext {
    let dir = config.storage_dir();
    info!(storage_dir = %dir.display(), "opening secret key storage");
    SessionContext::new(Arc::new(FileStore::new(dir))).with_storage_key(config.storage_key.clone())
}

/// Start a deeplink connect and print the wallet URL
pub async fn run_connect(config: &CliConfig) -> Result<Url> {
    let connector = Connector::new(config.connector_config()?);
    let env = Environment::new(
        config.user_agent.clone(),
        config.redirect_link()?,
        Arc::new(StdoutNavigator),
    );
    let mut session = open_session(config);

    match connector.connect(&mut session, &env).await {
        ConnectOutcome::DeeplinkLaunched(navigation) => Ok(navigation.url().clone()),
        other => bail!("connect did not launch a deeplink: {other:?}"),
    }
}

/// Complete a handshake from the URL the wallet redirected to
pub fn run_decode(config: &CliConfig, redirect: &str) -> Result<DecodeReport> {
    let url = Url::parse(redirect).context("invalid redirect URL")?;
    let decoder = HandshakeDecoder::new().with_retention(config.retention());
    let mut session = open_session(config);

    let outcome = decoder.decode_url(&mut session, &url);
    let report = DecodeReport::from_outcome(outcome, &session);

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serialize decode report")?
    );
    Ok(report)
}

/// Answer a connect deeplink the way the wallet would and print the redirect
pub fn run_simulate_wallet(deeplink: &str, reject: bool) -> Result<Url> {
    let url = Url::parse(deeplink).context("invalid deeplink URL")?;
    let wallet = WalletResponder::generate();

    let redirect = if reject {
        info!(code = USER_REJECTED_CODE, "simulated wallet rejecting");
        wallet.reject(&url, "User rejected the request.")?
    } else {
        info!(public_key = %wallet.public_key_base58(), "simulated wallet approving");
        wallet.approve(&url)?
    };

    println!("{redirect}");
    Ok(redirect)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config() -> CliConfig {
        let mut config = CliConfig::template("https://dapp.example", "https://dapp.example/connect");
        config.storage_dir = Some(
            std::env::temp_dir().join(format!("phantom-connect-cli-{}", uuid::Uuid::new_v4())),
        );
        config
    }

    #[tokio::test]
    async fn test_connect_simulate_decode() {
        let config = temp_config();

        let deeplink = run_connect(&config).await.unwrap();
        assert!(deeplink.as_str().starts_with("https://phantom.app/ul/v1/connect?"));

        let redirect = run_simulate_wallet(deeplink.as_str(), false).unwrap();
        let report = run_decode(&config, redirect.as_str()).unwrap();

        match report {
            DecodeReport::Connected { session, status_text, .. } => {
                assert!(session.is_some());
                assert!(status_text.starts_with("Connected: "));
            }
            other => panic!("unexpected report: {other:?}"),
        }

        std::fs::remove_dir_all(config.storage_dir()).unwrap();
    }

    #[tokio::test]
    async fn test_rejection_reported() {
        let config = temp_config();
        let deeplink = run_connect(&config).await.unwrap();

        let redirect = run_simulate_wallet(deeplink.as_str(), true).unwrap();
        let report = run_decode(&config, redirect.as_str()).unwrap();

        assert!(matches!(report, DecodeReport::Rejected { ref code, .. } if code == USER_REJECTED_CODE));
        std::fs::remove_dir_all(config.storage_dir()).unwrap();
    }

    #[test]
    fn test_decode_without_stored_secret_is_abandoned() {
        let config = temp_config();
        let report = run_decode(
            &config,
            "https://dapp.example/connect?phantom_encryption_public_key=a&nonce=b&data=c",
        )
        .unwrap();
        assert!(matches!(report, DecodeReport::Abandoned { .. }));
    }

    #[test]
    fn test_report_serializes_with_status_tag() {
        let json = serde_json::to_value(DecodeReport::NotAHandshake).unwrap();
        assert_eq!(json, serde_json::json!({"status": "not_a_handshake"}));
    }
}
