use std::env;
use std::str::FromStr;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DEFAULT_DATABASE: &str = "TourBook";
const DEFAULT_TENANT: &str = "default";
const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_STORAGE_URL: &str = "https://storage.googleapis.com";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_WINDOW_DAYS: i64 = 180;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// When unset the service runs on the in-memory store.
    pub mongo_uri: Option<String>,
    pub mongo_database: String,
    pub default_tenant: String,
    pub stripe_secret_key: Option<String>,
    pub currency: String,
    pub upload_bucket: Option<String>,
    pub storage_base_url: String,
    pub max_upload_bytes: usize,
    pub availability_window_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            mongo_uri: None,
            mongo_database: DEFAULT_DATABASE.to_string(),
            default_tenant: DEFAULT_TENANT.to_string(),
            stripe_secret_key: None,
            currency: DEFAULT_CURRENCY.to_string(),
            upload_bucket: None,
            storage_base_url: DEFAULT_STORAGE_URL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            availability_window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            mongo_uri: optional_var("MONGODB_URI"),
            mongo_database: env::var("MONGODB_DATABASE").unwrap_or(defaults.mongo_database),
            default_tenant: env::var("DEFAULT_TENANT").unwrap_or(defaults.default_tenant),
            stripe_secret_key: optional_var("STRIPE_SECRET_KEY"),
            currency: env::var("CURRENCY").unwrap_or(defaults.currency),
            upload_bucket: optional_var("UPLOAD_BUCKET"),
            storage_base_url: env::var("CLOUD_STORAGE_URL").unwrap_or(defaults.storage_base_url),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            availability_window_days: parse_var(
                "AVAILABILITY_WINDOW_DAYS",
                defaults.availability_window_days,
            )?,
        })
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}
