use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub asaas: AsaasSettings,
    pub orders: OrderSettings,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

/// Where the processor's payment-creation endpoint lives.
#[derive(Debug, Clone)]
pub struct AsaasSettings {
    pub payment_url: String,
    pub api_key: Option<Secret<String>>,
}

#[derive(Debug, Clone)]
pub struct OrderSettings {
    /// Trailing window for fuzzy duplicate detection.
    pub dedupe_window_seconds: i64,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            dedupe_window_seconds: 300,
        }
    }
}

impl OrderSettings {
    pub fn dedupe_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.dedupe_window_seconds)
    }
}

impl CheckoutConfig {
    pub fn load() -> Result<Self, AppError> {
        let mut common_config = core_config::Config::load()?;
        if let Ok(level) = env::var("LOG_LEVEL") {
            common_config.log_level = level;
        }
        if let Ok(endpoint) = env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
            common_config.otlp_endpoint = Some(endpoint).filter(|e| !e.is_empty());
        }
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let dedupe_window_seconds = get_env("DEDUPE_WINDOW_SECONDS", Some("300"), false)?
            .parse()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("DEDUPE_WINDOW_SECONDS: {}", e))
            })?;

        Ok(CheckoutConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("checkout_db"), is_prod)?,
            },
            asaas: AsaasSettings {
                payment_url: get_env(
                    "ASAAS_PAYMENT_URL",
                    Some("http://localhost:8888/.netlify/functions/create-asaas-customer"),
                    is_prod,
                )?,
                api_key: env::var("ASAAS_API_KEY")
                    .ok()
                    .filter(|key| !key.is_empty())
                    .map(Secret::new),
            },
            orders: OrderSettings {
                dedupe_window_seconds,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
