/*
[INPUT]:  Output path, dapp URL and redirect link from the command line
[OUTPUT]: Generated YAML configuration file
[POS]:    CLI initialization layer
[UPDATE]: When CliConfig schema changes
*/

use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::info;

use crate::config::CliConfig;

/// Write a starter configuration to `output`
pub fn run_init(output: &Path, app_url: &str, redirect_link: &str, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite",
            output.display()
        );
    }

    let config = CliConfig::template(app_url, redirect_link);
    config.validate().context("invalid init values")?;

    let yaml = config
        .to_yaml()
        .context("failed to serialize config to YAML")?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(output, yaml)
        .with_context(|| format!("failed to write config to {}", output.display()))?;

    info!(path = %output.display(), "configuration written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("phantom-connect-init-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let path = temp_path("phantom.yaml");

        run_init(&path, "https://dapp.example", "https://dapp.example/connect", false).unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.redirect_link, "https://dapp.example/connect");

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let path = temp_path("phantom.yaml");
        run_init(&path, "https://dapp.example", "https://dapp.example/connect", false).unwrap();

        let err = run_init(&path, "https://other.example", "https://other.example", false).unwrap_err();
        assert!(err.to_string().contains("--force"));

        run_init(&path, "https://other.example", "https://other.example", true).unwrap();
        assert_eq!(CliConfig::load(&path).unwrap().app_url, "https://other.example");

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_init_rejects_invalid_url() {
        let path = temp_path("phantom.yaml");
        assert!(run_init(&path, "not a url", "https://dapp.example", false).is_err());
        assert!(!path.exists());
    }
}
