/*
[INPUT]:  None (in-process wallet simulation)
[OUTPUT]: Console output of the deeplink, the wallet redirect and the connected key
[POS]:    Examples - complete connect/decode round trip
[UPDATE]: When Connector, HandshakeDecoder or WalletResponder API changes
*/

//! Example: full deeplink handshake without a real wallet
//!
//! The connector launches the deeplink, a simulated wallet answers it, and a
//! fresh session (the reloaded page) decodes the redirect.

use std::sync::Arc;

use phantom_connect::{
    ConnectOutcome, Connector, ConnectorConfig, Environment, HandshakeDecoder, MemoryStore,
    RecordingNavigator, SessionContext, WalletResponder,
};
use url::Url;

const MOBILE_UA: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) Mobile Safari/537.36";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Step 1: storage shared by both page instances
    let store = MemoryStore::new();
    let navigator = RecordingNavigator::new();

    let connector = Connector::new(ConnectorConfig::new(Url::parse("https://dapp.example")?)?);
    let env = Environment::new(
        MOBILE_UA,
        Url::parse("https://dapp.example/connect")?,
        Arc::new(navigator.clone()),
    );

    println!("=== Phantom Deeplink Round Trip ===");

    // Step 2: user taps connect
    let mut page = SessionContext::new(Arc::new(store.clone()));
    let deeplink = match connector.connect(&mut page, &env).await {
        ConnectOutcome::DeeplinkLaunched(navigation) => navigation.url().clone(),
        other => return Err(format!("deeplink not launched: {other:?}").into()),
    };
    println!("Deeplink: {deeplink}");

    // Step 3: the wallet approves and redirects back
    let wallet = WalletResponder::generate();
    let redirect = wallet.approve(&deeplink)?;
    println!("Redirect: {redirect}");

    // Step 4: the reloaded page completes the handshake
    let mut reloaded = SessionContext::new(Arc::new(store));
    let outcome = HandshakeDecoder::new().decode_url(&mut reloaded, &redirect);
    println!("Outcome connected: {}", outcome.is_connected());
    println!("{}", reloaded.state().status_text());

    Ok(())
}
