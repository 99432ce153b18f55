use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rust_decimal::Decimal;

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub documents: DocumentSettings,
    pub templates: TemplateConfig,
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
        let ansi = matches!(
            var_or("APP_LOG_ANSI", "false").trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes"
        );

        let documents = DocumentSettings::new(
            var_or("APP_SUPPORT_EMAIL", DocumentSettings::DEFAULT_SUPPORT_EMAIL),
            var_or("APP_SIGNATURE", DocumentSettings::DEFAULT_SIGNATURE),
            parse_tax_rate(&var_or("APP_TAX_RATE", DocumentSettings::DEFAULT_TAX_RATE))?,
        );

        let base_uri = var_or("APP_TEMPLATE_BASE_URI", "templates/");

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, ansi },
            documents,
            templates: TemplateConfig { base_uri },
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_tax_rate(raw: &str) -> Result<Decimal, ConfigError> {
    let invalid = || ConfigError::InvalidTaxRate {
        value: raw.to_string(),
    };
    let rate = Decimal::from_str(raw.trim()).map_err(|_| invalid())?;
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(invalid());
    }
    Ok(rate)
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Read-only values stamped onto every generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSettings {
    pub support_email: String,
    pub signature: String,
    pub tax_rate: Decimal,
}

impl DocumentSettings {
    pub const DEFAULT_SUPPORT_EMAIL: &'static str = "support@example.com";
    pub const DEFAULT_SIGNATURE: &'static str = "The Applications Team";
    pub const DEFAULT_TAX_RATE: &'static str = "0.2";

    pub fn new(
        support_email: impl Into<String>,
        signature: impl Into<String>,
        tax_rate: Decimal,
    ) -> Self {
        Self {
            support_email: support_email.into(),
            signature: signature.into(),
            tax_rate,
        }
    }
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_SUPPORT_EMAIL,
            Self::DEFAULT_SIGNATURE,
            Decimal::new(2, 1),
        )
    }
}

/// Where view templates are served from.
#[derive(Debug, Clone)]
pub struct TemplateConfig {
    pub base_uri: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost { source: std::net::AddrParseError },
    #[error("APP_TAX_RATE must be a decimal between 0 and 1, found '{value}'")]
    InvalidTaxRate { value: String },
}
