/*
[INPUT]:  YAML configuration file, PHANTOM_CONNECT_* environment overrides
[OUTPUT]: Validated CLI configuration and derived library settings
[POS]:    Configuration layer - dapp identity and storage setup
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use phantom_connect::{
    Cluster, ConnectorConfig, PHANTOM_CONNECT_URL, SECRET_KEY_STORAGE_KEY, SecretRetention,
    validate_key,
};
use serde::{Deserialize, Serialize};
use url::Url;

/// Prefix of environment variables overriding file values
pub const ENV_PREFIX: &str = "PHANTOM_CONNECT";

const DEFAULT_USER_AGENT: &str = "phantom-connect-cli";

/// Top-level configuration for the connect CLI
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CliConfig {
    /// Url identifying the dapp to the wallet
    pub app_url: String,
    /// Page the wallet redirects back to
    pub redirect_link: String,
    /// Solana cluster requested from the wallet
    #[serde(default)]
    pub cluster: Cluster,
    /// Wallet connect endpoint
    #[serde(default = "default_connect_endpoint")]
    pub connect_endpoint: String,
    /// Directory holding the stored secret key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    /// Entry name of the stored secret key
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Remove the stored secret key once a handshake was attempted
    #[serde(default)]
    pub clear_secret_after_handshake: bool,
    /// User agent reported to the connector; decides redirect vs new context
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_connect_endpoint() -> String {
    PHANTOM_CONNECT_URL.to_string()
}

fn default_storage_key() -> String {
    SECRET_KEY_STORAGE_KEY.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl CliConfig {
    /// Starting point written by `init-config`
    pub fn template(app_url: &str, redirect_link: &str) -> Self {
        Self {
            app_url: app_url.to_string(),
            redirect_link: redirect_link.to_string(),
            cluster: Cluster::default(),
            connect_endpoint: default_connect_endpoint(),
            storage_dir: None,
            storage_key: default_storage_key(),
            clear_secret_after_handshake: false,
            user_agent: default_user_agent(),
        }
    }

    /// Load configuration from a YAML file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(true),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("read config {}", path.display()))?;

        let config: Self = settings
            .try_deserialize()
            .context("deserialize config")?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check every value the connector and decoder will rely on
    pub fn validate(&self) -> Result<()> {
        if self.app_url.trim().is_empty() {
            bail!("app_url cannot be empty");
        }
        if self.redirect_link.trim().is_empty() {
            bail!("redirect_link cannot be empty");
        }
        if self.storage_key.trim().is_empty() {
            bail!("storage_key cannot be empty");
        }
        validate_key(&self.storage_key)
            .context("storage_key may only contain ASCII letters, digits, '_' and '-'")?;
        self.app_url()?;
        self.redirect_link()?;
        Url::parse(&self.connect_endpoint).context("invalid connect_endpoint")?;
        Ok(())
    }

    pub fn app_url(&self) -> Result<Url> {
        Url::parse(&self.app_url).context("invalid app_url")
    }

    pub fn redirect_link(&self) -> Result<Url> {
        Url::parse(&self.redirect_link).context("invalid redirect_link")
    }

    pub fn connector_config(&self) -> Result<ConnectorConfig> {
        let endpoint = Url::parse(&self.connect_endpoint).context("invalid connect_endpoint")?;
        Ok(ConnectorConfig::new(self.app_url()?)?
            .with_cluster(self.cluster)
            .with_connect_endpoint(endpoint)
            .with_redirect_link(self.redirect_link()?))
    }

    /// Configured storage directory, or the per-user data directory
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("phantom-connect")
        })
    }

    pub fn retention(&self) -> SecretRetention {
        if self.clear_secret_after_handshake {
            SecretRetention::ClearOnCompletion
        } else {
            SecretRetention::Keep
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config = CliConfig::from_yaml_str(
            "app_url: https://dapp.example\nredirect_link: https://dapp.example/connect\n",
        )
        .unwrap();

        assert_eq!(config.cluster, Cluster::Devnet);
        assert_eq!(config.connect_endpoint, PHANTOM_CONNECT_URL);
        assert_eq!(config.storage_key, SECRET_KEY_STORAGE_KEY);
        assert_eq!(config.retention(), SecretRetention::Keep);
        assert!(config.storage_dir().ends_with("phantom-connect"));
    }

    #[test]
    fn test_invalid_urls_rejected() {
        let err = CliConfig::from_yaml_str("app_url: not a url\nredirect_link: https://dapp.example\n")
            .unwrap_err();
        assert!(err.to_string().contains("app_url"));

        assert!(CliConfig::from_yaml_str("app_url: https://dapp.example\nredirect_link: ''\n").is_err());
    }

    #[test]
    fn test_storage_key_must_name_a_file() {
        let base = "app_url: https://dapp.example\nredirect_link: https://dapp.example/connect\n";

        for key in ["phantom.secret", "../phantom", "phantom key"] {
            let err = CliConfig::from_yaml_str(&format!("{base}storage_key: '{key}'\n")).unwrap_err();
            assert!(err.to_string().contains("storage_key"), "{key}: {err}");
        }

        let config = CliConfig::from_yaml_str(&format!("{base}storage_key: phantom-secret_2\n")).unwrap();
        assert_eq!(config.storage_key, "phantom-secret_2");
    }

    #[test]
    fn test_template_round_trips_through_yaml() {
        let mut template = CliConfig::template("https://dapp.example", "https://dapp.example/connect");
        template.cluster = Cluster::MainnetBeta;
        template.clear_secret_after_handshake = true;

        let yaml = template.to_yaml().unwrap();
        assert!(yaml.contains("cluster: mainnet-beta"));

        let parsed = CliConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed.cluster, Cluster::MainnetBeta);
        assert_eq!(parsed.retention(), SecretRetention::ClearOnCompletion);
    }

    #[test]
    fn test_connector_config_uses_redirect_link() {
        let config = CliConfig::template("https://dapp.example", "https://dapp.example/connect");
        let connector = config.connector_config().unwrap();
        assert_eq!(
            connector.redirect_link.unwrap().as_str(),
            "https://dapp.example/connect"
        );
        assert_eq!(connector.connect_endpoint.as_str(), PHANTOM_CONNECT_URL);
    }
}
