//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Business identity used by the tax engine and overdue computation.
    #[serde(default)]
    pub business: BusinessConfig,
    /// Account codes referenced when payments generate cash-movement vouchers.
    #[serde(default)]
    pub accounts: AccountCodesConfig,
    /// Overdue sweep tuning.
    #[serde(default)]
    pub sweep: SweepConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Business identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessConfig {
    /// The state the business is registered in.
    #[serde(default = "default_state")]
    pub state: String,
    /// IANA timezone name used to decide what "today" is.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_state() -> String {
    "Rajasthan".to_string()
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            state: default_state(),
            timezone: default_timezone(),
        }
    }
}

impl BusinessConfig {
    /// Parses the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns the offending name if it is not a known IANA zone.
    pub fn tz(&self) -> Result<chrono_tz::Tz, String> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| format!("Unknown timezone: {}", self.timezone))
    }

    /// Returns today's date in the business timezone.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured timezone is invalid.
    pub fn today(&self) -> Result<chrono::NaiveDate, String> {
        let tz = self.tz()?;
        Ok(chrono::Utc::now().with_timezone(&tz).date_naive())
    }
}

/// Account codes for payment postings.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountCodesConfig {
    /// Cash in hand.
    #[serde(default = "default_cash_code")]
    pub cash_code: String,
    /// Bank account.
    #[serde(default = "default_bank_code")]
    pub bank_code: String,
    /// Accounts receivable (customers).
    #[serde(default = "default_receivable_code")]
    pub receivable_code: String,
    /// Accounts payable (suppliers).
    #[serde(default = "default_payable_code")]
    pub payable_code: String,
}

fn default_cash_code() -> String {
    "1010".to_string()
}

fn default_bank_code() -> String {
    "1020".to_string()
}

fn default_receivable_code() -> String {
    "1100".to_string()
}

fn default_payable_code() -> String {
    "2100".to_string()
}

impl Default for AccountCodesConfig {
    fn default() -> Self {
        Self {
            cash_code: default_cash_code(),
            bank_code: default_bank_code(),
            receivable_code: default_receivable_code(),
            payable_code: default_payable_code(),
        }
    }
}

/// Overdue sweep configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// Rows loaded per page while sweeping.
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    /// Optimistic-lock retries per row before giving up on it.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_batch_size() -> u64 {
    500
}

fn default_max_retries() -> u32 {
    3
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BAHI").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
