/*
[INPUT]:  Host user agent, current page URL, injected provider, navigation backend
[OUTPUT]: Execution environment handed to the connector
[POS]:    Environment layer - host capabilities as explicit ports
[UPDATE]: When the host exposes new capabilities or navigation modes
*/

use std::fmt;
use std::sync::{Arc, RwLock};

use url::Url;

use crate::error::{ConnectError, Result};
use crate::provider::NativeProvider;
use crate::types::Platform;

/// How the deeplink was handed to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Current page replaced by the URL (mobile)
    Redirect(Url),
    /// URL opened in a new browsing context (desktop)
    NewContext(Url),
}

impl Navigation {
    pub fn url(&self) -> &Url {
        match self {
            Navigation::Redirect(url) | Navigation::NewContext(url) => url,
        }
    }
}

/// Navigation backend of the host
pub trait Navigator: Send + Sync {
    /// Replace the current page with `url`
    fn redirect(&self, url: &Url) -> Result<()>;

    /// Open `url` in a new browsing context
    fn open_new_context(&self, url: &Url) -> Result<()>;
}

/// Navigator that records requests instead of performing them
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    events: Arc<RwLock<Vec<Navigation>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All navigations requested so far, oldest first
    pub fn events(&self) -> Vec<Navigation> {
        self.events
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Navigation> {
        self.events().pop()
    }

    fn record(&self, navigation: Navigation) -> Result<()> {
        self.events
            .write()
            .map_err(|_| ConnectError::Navigation("navigation log lock poisoned".to_string()))?
            .push(navigation);
        Ok(())
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, url: &Url) -> Result<()> {
        self.record(Navigation::Redirect(url.clone()))
    }

    fn open_new_context(&self, url: &Url) -> Result<()> {
        self.record(Navigation::NewContext(url.clone()))
    }
}

/// Everything the connector needs to know about where it runs
#[derive(Clone)]
pub struct Environment {
    pub user_agent: String,
    /// Current page, used as the wallet's redirect link
    pub current_url: Url,
    pub provider: Option<Arc<dyn NativeProvider>>,
    pub navigator: Arc<dyn Navigator>,
}

impl Environment {
    pub fn new(
        user_agent: impl Into<String>,
        current_url: Url,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            current_url,
            provider: None,
            navigator,
        }
    }

    /// Expose an injected wallet provider
    pub fn with_provider(mut self, provider: Arc<dyn NativeProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn platform(&self) -> Platform {
        Platform::from_user_agent(&self.user_agent)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("user_agent", &self.user_agent)
            .field("current_url", &self.current_url.as_str())
            .field("provider", &self.provider.is_some())
            .finish_non_exhaustive()
    }
}
