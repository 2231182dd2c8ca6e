//! # Configuration State
//!
//! Register settings loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`MUEEN_*`)
//! 2. `[register]` table of `register.toml`
//! 3. Defaults (this file)
//!
//! ```toml
//! [api]
//! base_url = "https://dashboard.example.com/api/"
//!
//! [register]
//! cashier = "Mona"
//! default_payment_mode = "Cash"
//! mobile_debounce_ms = 400
//! ```
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use mueen_api::config::default_config_path;
use mueen_core::{Money, PaymentMode};

use crate::error::{ApiError, ErrorCode};

/// Register configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigState {
    /// Printed on invoices when the backend does not report who created the sale.
    pub cashier: Option<String>,

    /// Payment mode preselected for new checkouts
    pub default_payment_mode: PaymentMode,

    /// Only list sections of this channel
    pub channel: Option<u64>,

    /// Settle window of the customer name search
    pub name_debounce_ms: u64,

    /// Settle window of the exact mobile lookup
    pub mobile_debounce_ms: u64,

    /// Settle window of the catalog search
    pub product_debounce_ms: u64,

    /// Maximum customer suggestions
    pub customer_search_limit: u32,

    /// Catalog page size
    pub product_search_limit: u32,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    register: ConfigState,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Debounce: name 300 ms, mobile 400 ms, catalog 300 ms
    /// - Limits: 50 customers, 25 products
    /// - Currency: QAR, 2 decimals
    fn default() -> Self {
        ConfigState {
            cashier: None,
            default_payment_mode: PaymentMode::Cash,
            channel: None,
            name_debounce_ms: 300,
            mobile_debounce_ms: 400,
            product_debounce_ms: 300,
            customer_search_limit: 50,
            product_search_limit: 25,
            currency_symbol: "QAR ".to_string(),
            currency_decimals: 2,
        }
    }
}

impl ConfigState {
    /// Loads the `[register]` table, then applies environment overrides.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(default_config_path) {
            if path.exists() {
                info!(?path, "Loading register config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using register defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ApiError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ApiError::new(ErrorCode::ConfigError, format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Parses the `[register]` table of a register.toml document.
    pub fn from_toml(contents: &str) -> Result<Self, ApiError> {
        let file: ConfigFile = toml::from_str(contents)
            .map_err(|e| ApiError::new(ErrorCode::ConfigError, format!("Invalid register config: {}", e)))?;
        Ok(file.register)
    }

    /// Applies `MUEEN_*` overrides read through `var`.
    ///
    /// ## Environment Variables
    /// - `MUEEN_CASHIER`
    /// - `MUEEN_PAYMENT_MODE`: cash, credit, bank or wallet
    /// - `MUEEN_CHANNEL_ID`
    /// - `MUEEN_MOBILE_DEBOUNCE_MS`
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(cashier) = var("MUEEN_CASHIER") {
            self.cashier = Some(cashier);
        }

        if let Some(mode) = var("MUEEN_PAYMENT_MODE") {
            match mode.parse::<PaymentMode>() {
                Ok(mode) => self.default_payment_mode = mode,
                Err(e) => warn!(value = %mode, error = %e, "Ignoring invalid MUEEN_PAYMENT_MODE"),
            }
        }

        if let Some(channel) = var("MUEEN_CHANNEL_ID") {
            match channel.parse::<u64>() {
                Ok(id) => self.channel = Some(id),
                Err(_) => warn!(value = %channel, "Ignoring invalid MUEEN_CHANNEL_ID"),
            }
        }

        if let Some(ms) = var("MUEEN_MOBILE_DEBOUNCE_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => self.mobile_debounce_ms = ms,
                Err(_) => warn!(value = %ms, "Ignoring invalid MUEEN_MOBILE_DEBOUNCE_MS"),
            }
        }
    }

    pub fn name_debounce(&self) -> Duration {
        Duration::from_millis(self.name_debounce_ms)
    }

    pub fn mobile_debounce(&self) -> Duration {
        Duration::from_millis(self.mobile_debounce_ms)
    }

    pub fn product_debounce(&self) -> Duration {
        Duration::from_millis(self.product_debounce_ms)
    }

    /// Cashier name for invoices, if configured and not blank.
    pub fn cashier(&self) -> Option<&str> {
        self.cashier.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }

    /// Formats an amount for display.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "QAR 12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        let decimals = self.currency_decimals.min(2) as u32;
        // Money is held in hundredths; drop digits the currency does not show.
        let scaled = cents / 10_i64.pow(2 - decimals);
        let divisor = 10_i64.pow(decimals);
        let whole = (scaled / divisor).abs();
        let frac = (scaled % divisor).abs();
        let sign = if cents < 0 { "-" } else { "" };

        if decimals > 0 {
            format!(
                "{}{}{}.{:0width$}",
                sign,
                self.currency_symbol,
                whole,
                frac,
                width = decimals as usize
            )
        } else {
            format!("{}{}{}", sign, self.currency_symbol, whole)
        }
    }
}
