use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::billing::PromoPolicy;
use crate::domain::{Amount, PaymentMethod};
use crate::store::firestore::DEFAULT_BASE_URL;
use crate::store::FirestoreSettings;
use crate::validation::MAX_PRICE;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub store: StoreConfig,
    pub billing: BillingConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            store: StoreConfig::load()?,
            billing: BillingConfig::load()?,
            auth: AuthConfig::load()?,
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        None => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Which document store backs the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory,
    Firestore(FirestoreSettings),
}

impl StoreConfig {
    fn load() -> Result<Self, ConfigError> {
        match var_or("STORE_BACKEND", "memory").trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "firestore" => {
                let project_id = optional_var("FIRESTORE_PROJECT_ID")
                    .ok_or(ConfigError::MissingVar("FIRESTORE_PROJECT_ID"))?;
                let poll_secs: u64 = parse_var("STORE_POLL_INTERVAL_SECS", 5)?;
                Ok(Self::Firestore(FirestoreSettings {
                    project_id,
                    api_key: optional_var("FIRESTORE_API_KEY"),
                    id_token: optional_var("FIRESTORE_ID_TOKEN"),
                    base_url: var_or("FIRESTORE_BASE_URL", DEFAULT_BASE_URL),
                    poll_interval: Duration::from_secs(poll_secs.max(1)),
                }))
            }
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Whether office routes demand a session resolved by the fronting proxy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub require_session: bool,
}

impl AuthConfig {
    fn load() -> Result<Self, ConfigError> {
        let require_session = match optional_var("AUTH_REQUIRE_SESSION") {
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidFlag {
                        name: "AUTH_REQUIRE_SESSION",
                        value: raw,
                    })
                }
            },
            None => false,
        };
        Ok(Self { require_session })
    }
}

/// Pricing knobs for the promo engine and new-class defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingConfig {
    pub promo_price: Amount,
    pub promo_method: PaymentMethod,
    pub default_price: Amount,
    pub top_students: usize,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            promo_price: 9000,
            promo_method: PaymentMethod::Cash,
            default_price: 15000,
            top_students: 10,
        }
    }
}

impl BillingConfig {
    fn load() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let promo_method = match optional_var("BILLING_PROMO_METHOD") {
            Some(raw) => {
                PaymentMethod::parse(&raw).ok_or(ConfigError::InvalidPaymentMethod(raw))?
            }
            None => defaults.promo_method,
        };

        Ok(Self {
            promo_price: parse_price("BILLING_PROMO_PRICE", defaults.promo_price)?,
            promo_method,
            default_price: parse_price("BILLING_DEFAULT_PRICE", defaults.default_price)?,
            top_students: parse_var("BILLING_TOP_STUDENTS", defaults.top_students)?,
        })
    }

    pub fn promo_policy(&self) -> PromoPolicy {
        PromoPolicy {
            promo_price: self.promo_price,
            promo_payment_method: self.promo_method,
            ..PromoPolicy::default()
        }
    }
}

// Prices pre-filled into forms must pass the same checks as the forms.
fn parse_price(name: &'static str, default: Amount) -> Result<Amount, ConfigError> {
    let value: Amount = parse_var(name, default)?;
    if value == 0 || value > MAX_PRICE {
        return Err(ConfigError::InvalidPrice { name, value });
    }
    Ok(value)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
    MissingVar(&'static str),
    UnknownBackend(String),
    InvalidPaymentMethod(String),
    InvalidPrice { name: &'static str, value: Amount },
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be a non-negative integer, got '{value}'")
            }
            ConfigError::MissingVar(name) => write!(f, "{name} is required"),
            ConfigError::UnknownBackend(value) => {
                write!(f, "STORE_BACKEND must be 'memory' or 'firestore', got '{value}'")
            }
            ConfigError::InvalidPaymentMethod(value) => {
                write!(f, "BILLING_PROMO_METHOD must be 'cash' or 'transfer', got '{value}'")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false, got '{value}'")
            }
            ConfigError::InvalidPrice { name, value } => {
                write!(f, "{name} must be between 1 and {MAX_PRICE}, got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
