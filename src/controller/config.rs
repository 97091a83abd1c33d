//! Wallet configuration - passed from higher layers

use serde::{Deserialize, Serialize};

use crate::core::balance::KTA_DECIMALS;
use crate::core::codes::INSTALL_URL;

/// Controller and presentation settings. Higher layers construct this, or
/// load it from JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Opened when the extension reports `WALLET_NOT_FOUND`
    pub install_url: String,
    pub open_install_page: bool,
    /// Token symbol shown next to balances
    pub ticker: String,
    /// Smallest units per display unit, as a power of ten
    pub decimals: u32,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            install_url: INSTALL_URL.into(),
            open_install_page: true,
            ticker: "KTA".into(),
            decimals: KTA_DECIMALS,
        }
    }
}

impl WalletConfig {
    pub fn new() -> Self { Self::default() }
    pub fn with_install_url(mut self, url: impl Into<String>) -> Self { self.install_url = url.into(); self }
    pub fn without_install_page(mut self) -> Self { self.open_install_page = false; self }
    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self { self.ticker = ticker.into(); self }
    pub fn with_decimals(mut self, decimals: u32) -> Self { self.decimals = decimals; self }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WalletConfig::default();
        assert_eq!(config.ticker, "KTA");
        assert_eq!(config.decimals, 9);
        assert!(config.open_install_page);
        assert!(config.install_url.starts_with("https://chromewebstore.google.com/"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = WalletConfig::from_json(r#"{"ticker": "tKTA", "open_install_page": false}"#).unwrap();
        assert_eq!(config.ticker, "tKTA");
        assert!(!config.open_install_page);
        assert_eq!(config.decimals, 9);
    }

    #[test]
    fn test_invalid_json() {
        assert!(WalletConfig::from_json("{not json").is_err());
    }
}
