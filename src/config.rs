use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::env;
use tracing::info;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";

/// Vendor-discovery endpoint settings.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct VendorSearchConfig {
    /// Text-to-structured-data lookup endpoint
    pub endpoint: String,
    pub api_key: Option<String>,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_timeout_secs() -> u64 {
    20
}

/// Outbound telephony settings. All optional: with no endpoint configured
/// the dialer becomes a logged no-op.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct OutboundCallConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub from_number: Option<String>,
}

/// One-way calendar export settings.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CalendarConfig {
    pub endpoint: Option<String>,
}

/// Pacing and vendor-selection policy for the new-order workflow.
#[derive(Clone, Debug, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default = "default_search_step_interval_ms")]
    pub search_step_interval_ms: u64,
    #[serde(default = "default_call_step_interval_ms")]
    pub call_step_interval_ms: u64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Guaranteed vendor appended to every discovery result
    pub house_vendor_name: Option<String>,
    pub house_vendor_email: Option<String>,
    pub house_vendor_phone: Option<String>,
    /// Vendor name that wins selection whenever present among candidates
    pub priority_vendor: Option<String>,
    #[serde(default = "default_call_script_prompt")]
    pub call_script_prompt: String,
    #[serde(default = "default_call_opening_line")]
    pub call_opening_line: String,
}

fn default_search_step_interval_ms() -> u64 {
    1000
}

fn default_call_step_interval_ms() -> u64 {
    2000
}

fn default_settle_delay_ms() -> u64 {
    1000
}

fn default_call_script_prompt() -> String {
    "You are a procurement agent negotiating pricing and availability for \
     industrial parts. Ask for the best unit price and lead time."
        .to_string()
}

fn default_call_opening_line() -> String {
    "Hello, I'm calling about a bulk purchase inquiry.".to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            search_step_interval_ms: default_search_step_interval_ms(),
            call_step_interval_ms: default_call_step_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            house_vendor_name: None,
            house_vendor_email: None,
            house_vendor_phone: None,
            priority_vendor: None,
            call_script_prompt: default_call_script_prompt(),
            call_opening_line: default_call_opening_line(),
        }
    }
}

/// Purchasing policy: reorder banding and purchase-order defaults.
#[derive(Clone, Debug, Deserialize)]
pub struct PurchasingConfig {
    /// Stock at or below reorder_point * low_stock_band counts as Low
    #[serde(default = "default_low_stock_band")]
    pub low_stock_band: Decimal,
    #[serde(default = "default_lead_time_days")]
    pub lead_time_days: i64,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    #[serde(default = "default_shipping_flat")]
    pub shipping_flat: Decimal,
    #[serde(default = "default_order_quantity")]
    pub default_quantity: u32,
    #[serde(default = "default_unit_price")]
    pub default_unit_price: Decimal,
    #[serde(default = "default_payment_terms")]
    pub payment_terms: String,
}

fn default_low_stock_band() -> Decimal {
    dec!(1.2)
}

fn default_lead_time_days() -> i64 {
    30
}

fn default_tax_rate() -> Decimal {
    dec!(0.08)
}

fn default_shipping_flat() -> Decimal {
    dec!(75.00)
}

fn default_order_quantity() -> u32 {
    10
}

fn default_unit_price() -> Decimal {
    dec!(112.50)
}

fn default_payment_terms() -> String {
    "Net 30".to_string()
}

impl Default for PurchasingConfig {
    fn default() -> Self {
        Self {
            low_stock_band: default_low_stock_band(),
            lead_time_days: default_lead_time_days(),
            tax_rate: default_tax_rate(),
            shipping_flat: default_shipping_flat(),
            default_quantity: default_order_quantity(),
            default_unit_price: default_unit_price(),
            payment_terms: default_payment_terms(),
        }
    }
}

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    #[validate(length(min = 1))]
    pub database_url: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level filter (trace/debug/info/warn/error)
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,

    /// Run pending migrations at startup
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,

    pub vendor_search: VendorSearchConfig,

    #[serde(default)]
    pub outbound_call: OutboundCallConfig,

    #[serde(default)]
    pub calendar: CalendarConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,

    #[serde(default)]
    pub purchasing: PurchasingConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_auto_migrate() -> bool {
    true
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

/// Loads configuration from layered sources: `config/default.toml`, an
/// optional `config/{RUN_MODE}.toml`, then `APP__`-prefixed environment
/// variables. Fails fast on missing or invalid settings.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let cfg = Config::builder()
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_mode)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = cfg.try_deserialize()?;
    app_config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {}", e)))?;

    info!(run_mode = %run_mode, "configuration loaded");
    Ok(app_config)
}

/// Initializes the global tracing subscriber. `RUST_LOG` overrides the
/// configured level.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("procure_api={0},tower_http={0}", level)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
