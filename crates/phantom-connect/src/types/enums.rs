/*
[INPUT]:  Deeplink schema values and client user agents
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for deeplink communication
[UPDATE]: When the deeplink schema changes or new platforms are detected
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConnectError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    MainnetBeta,
    Testnet,
    #[default]
    Devnet,
}

impl Cluster {
    /// Query value used by the `cluster` deeplink parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Testnet => "testnet",
            Cluster::Devnet => "devnet",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cluster {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mainnet-beta" | "mainnet" => Ok(Cluster::MainnetBeta),
            "testnet" => Ok(Cluster::Testnet),
            "devnet" => Ok(Cluster::Devnet),
            other => Err(ConnectError::Config(format!("Unknown cluster: {other}"))),
        }
    }
}

/// Client platform, decides between redirecting and opening a new context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Mobile,
    Desktop,
}

const MOBILE_MARKERS: [&str; 4] = ["iphone", "ipad", "ipod", "android"];

impl Platform {
    /// Classify a user agent string. Matching is case-insensitive.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let user_agent = user_agent.to_ascii_lowercase();
        if MOBILE_MARKERS
            .iter()
            .any(|marker| user_agent.contains(marker))
        {
            Platform::Mobile
        } else {
            Platform::Desktop
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self, Platform::Mobile)
    }
}
