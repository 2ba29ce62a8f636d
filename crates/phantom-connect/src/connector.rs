/*
[INPUT]:  Session context, host environment, connector configuration
[OUTPUT]: Native connection or launched connect deeplink
[POS]:    Connect layer - first half of the wallet handshake
[UPDATE]: When connect strategies or deeplink construction change
*/

use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};
use url::Url;

use crate::environment::{Environment, Navigation};
use crate::error::Result;
use crate::provider::NativeProvider;
use crate::session::{ConnectMethod, SessionContext};
use crate::types::{Cluster, ConnectParams, PHANTOM_CONNECT_URL};

/// Static connector configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    /// Url identifying this dapp to the wallet
    pub app_url: Url,
    pub cluster: Cluster,
    /// Wallet connect endpoint the parameters are appended to
    pub connect_endpoint: Url,
    /// Overrides the current page as the redirect target
    pub redirect_link: Option<Url>,
}

impl ConnectorConfig {
    /// Configuration for `app_url` with Phantom's endpoint on devnet
    pub fn new(app_url: Url) -> Result<Self> {
        Ok(Self {
            app_url,
            cluster: Cluster::default(),
            connect_endpoint: Url::parse(PHANTOM_CONNECT_URL)?,
            redirect_link: None,
        })
    }

    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn with_connect_endpoint(mut self, endpoint: Url) -> Self {
        self.connect_endpoint = endpoint;
        self
    }

    pub fn with_redirect_link(mut self, redirect_link: Url) -> Self {
        self.redirect_link = Some(redirect_link);
        self
    }
}

/// Connection strategy, picked per call from what the environment offers
#[derive(Clone)]
pub enum ConnectStrategy {
    /// Injected Phantom provider, connected directly
    Native(Arc<dyn NativeProvider>),
    /// Encrypted deeplink round trip through the wallet app
    Deeplink,
}

impl ConnectStrategy {
    pub fn select(env: &Environment) -> Self {
        match &env.provider {
            Some(provider) if provider.is_phantom() => ConnectStrategy::Native(provider.clone()),
            _ => ConnectStrategy::Deeplink,
        }
    }

    pub fn method(&self) -> ConnectMethod {
        match self {
            ConnectStrategy::Native(_) => ConnectMethod::Native,
            ConnectStrategy::Deeplink => ConnectMethod::Deeplink,
        }
    }
}

impl fmt::Debug for ConnectStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectStrategy::Native(_) => f.write_str("Native"),
            ConnectStrategy::Deeplink => f.write_str("Deeplink"),
        }
    }
}

/// What a connect call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Native provider connected; state holds the public key
    Connected { public_key: String },
    /// Native provider failed; state left unconnected
    ProviderFailed,
    /// Deeplink handed to the host; completion arrives via the decoder
    DeeplinkLaunched(Navigation),
    /// Deeplink could not be prepared or navigated to
    LaunchFailed,
}

/// Starts a wallet connection
#[derive(Debug, Clone)]
pub struct Connector {
    config: ConnectorConfig,
}

impl Connector {
    pub fn new(config: ConnectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Connect a wallet.
    ///
    /// 1. Select native provider or deeplink strategy
    /// 2. Native: call the provider, record the returned public key
    /// 3. Deeplink: rotate the ephemeral keypair, persist its secret
    /// 4. Build the connect deeplink
    /// 5. Redirect on mobile, open a new context elsewhere
    ///
    /// Errors are logged and reported through the outcome, never returned.
    pub async fn connect(&self, session: &mut SessionContext, env: &Environment) -> ConnectOutcome {
        session.state_mut().begin_connecting();

        let outcome = match ConnectStrategy::select(env) {
            ConnectStrategy::Native(provider) => self.connect_native(session, provider.as_ref()).await,
            ConnectStrategy::Deeplink => match self.launch_deeplink(session, env) {
                Ok(navigation) => ConnectOutcome::DeeplinkLaunched(navigation),
                Err(err) => {
                    error!(error = %err, "failed to launch connect deeplink");
                    ConnectOutcome::LaunchFailed
                }
            },
        };

        session.state_mut().finish_connecting();
        outcome
    }

    async fn connect_native(
        &self,
        session: &mut SessionContext,
        provider: &dyn NativeProvider,
    ) -> ConnectOutcome {
        match provider.connect().await {
            Ok(connection) => {
                info!(public_key = %connection.public_key, "connected through native provider");
                session.state_mut().set_connected(
                    connection.public_key.clone(),
                    None,
                    ConnectMethod::Native,
                );
                ConnectOutcome::Connected {
                    public_key: connection.public_key,
                }
            }
            Err(err) => {
                warn!(error = %err, "native provider connect failed");
                ConnectOutcome::ProviderFailed
            }
        }
    }

    fn launch_deeplink(&self, session: &mut SessionContext, env: &Environment) -> Result<Navigation> {
        let redirect_link = self
            .config
            .redirect_link
            .clone()
            .unwrap_or_else(|| env.current_url.clone());

        // Persist before navigating: on mobile the redirect ends this page
        let public_key = session.rotate_keypair()?.public_key_base58();
        let url = self.build_deeplink(public_key, redirect_link);

        let navigation = if env.platform().is_mobile() {
            env.navigator.redirect(&url)?;
            Navigation::Redirect(url)
        } else {
            env.navigator.open_new_context(&url)?;
            Navigation::NewContext(url)
        };

        info!(
            url = %navigation.url(),
            cluster = %self.config.cluster,
            "connect deeplink launched"
        );
        Ok(navigation)
    }

    /// Connect deeplink for a base58 dapp encryption public key
    pub fn build_deeplink(&self, dapp_encryption_public_key: String, redirect_link: Url) -> Url {
        ConnectParams {
            app_url: self.config.app_url.clone(),
            dapp_encryption_public_key,
            redirect_link,
            cluster: self.config.cluster,
        }
        .to_deeplink(&self.config.connect_endpoint)
    }
}
