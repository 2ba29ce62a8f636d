/*
[INPUT]:  Test scenarios for the connect/decode round trip
[OUTPUT]: Shared fixtures: sessions, environments, tampering helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for phantom-connect tests

use std::io;
use std::sync::{Arc, Mutex};

use phantom_connect::{
    Connector, ConnectorConfig, Environment, MemoryStore, RecordingNavigator, SessionContext,
};
use url::Url;

pub const MOBILE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";
#[allow(dead_code)]
pub const DESKTOP_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/120.0";

pub const APP_URL: &str = "https://dapp.example";
pub const PAGE_URL: &str = "https://dapp.example/connect";

/// Connector on Phantom's endpoint, devnet
pub fn test_connector() -> Connector {
    Connector::new(ConnectorConfig::new(Url::parse(APP_URL).unwrap()).unwrap())
}

/// Session over a shared in-memory store
pub fn test_session(store: &MemoryStore) -> SessionContext {
    SessionContext::new(Arc::new(store.clone()))
}

/// Environment without an injected provider
pub fn test_env(user_agent: &str, navigator: &RecordingNavigator) -> Environment {
    Environment::new(
        user_agent,
        Url::parse(PAGE_URL).unwrap(),
        Arc::new(navigator.clone()),
    )
}

/// Flip one bit of one byte of a base58 query parameter
#[allow(dead_code)]
pub fn flip_param_byte(url: &Url, name: &str, index: usize) -> Url {
    let mut tampered = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == name {
                let mut bytes = bs58::decode(v.as_ref()).into_vec().unwrap();
                bytes[index] ^= 0x01;
                bs58::encode(bytes).into_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();

    tampered.set_query(None);
    tampered.query_pairs_mut().extend_pairs(pairs);
    tampered
}

/// Run `f` with a subscriber capturing every event as plain text
#[allow(dead_code)]
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer = CapturedWriter(buffer.clone());
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = buffer
        .lock()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default();
    (result, logs)
}

#[derive(Clone)]
struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
