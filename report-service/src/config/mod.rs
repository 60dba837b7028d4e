use crate::services::chart::{MAX_CHART_EDGE_PX, MIN_CHART_EDGE_PX};
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub brand: BrandSettings,
    pub chart: ChartSettings,
    pub store: StoreSettings,
    /// Prefix for links returned by `/generate-pdf-url`; relative links when unset.
    pub public_base_url: Option<String>,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrandSettings {
    pub name: String,
    pub footer: String,
    pub logo_path: Option<PathBuf>,
    pub palette_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartSettings {
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    pub ttl_minutes: u64,
    pub max_items: usize,
    pub cleanup_interval_secs: u64,
}

impl ChartSettings {
    /// Rejects canvas sizes the renderer cannot draw or that would exhaust memory.
    pub fn validate(&self) -> Result<(), AppError> {
        let edges = [
            ("CHART_WIDTH_PX", self.width_px),
            ("CHART_HEIGHT_PX", self.height_px),
        ];
        for (key, value) in edges {
            if !(MIN_CHART_EDGE_PX..=MAX_CHART_EDGE_PX).contains(&value) {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} must be between {} and {}, got {}",
                    key,
                    MIN_CHART_EDGE_PX,
                    MAX_CHART_EDGE_PX,
                    value
                )));
            }
        }
        Ok(())
    }
}

impl StoreSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_minutes * 60)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}

impl Default for BrandSettings {
    fn default() -> Self {
        Self {
            name: "Skillera".to_string(),
            footer: "Confidential leadership assessment".to_string(),
            logo_path: None,
            palette_path: None,
        }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width_px: 800,
            height_px: 600,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            ttl_minutes: 30,
            max_items: 100,
            cleanup_interval_secs: 60,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            common: core_config::Config::default(),
            environment: Environment::Dev,
            brand: BrandSettings::default(),
            chart: ChartSettings::default(),
            store: StoreSettings::default(),
            public_base_url: None,
            otlp_endpoint: None,
        }
    }
}

impl ReportConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let environment: Environment = get_env("ENVIRONMENT", Some("dev"), false)?.parse()?;
        let is_prod = environment == Environment::Prod;

        let brand_defaults = BrandSettings::default();
        let chart_defaults = ChartSettings::default();
        let store_defaults = StoreSettings::default();

        let chart = ChartSettings {
            width_px: get_parsed("CHART_WIDTH_PX", chart_defaults.width_px)?,
            height_px: get_parsed("CHART_HEIGHT_PX", chart_defaults.height_px)?,
        };
        chart.validate()?;

        Ok(ReportConfig {
            common: common_config,
            environment,
            brand: BrandSettings {
                name: get_env("BRAND_NAME", Some(&brand_defaults.name), false)?,
                footer: get_env("BRAND_FOOTER", Some(&brand_defaults.footer), false)?,
                // Production reports must carry the real brand assets
                logo_path: optional_env("BRAND_LOGO_PATH", is_prod)?.map(PathBuf::from),
                palette_path: optional_env("BRAND_PALETTE_PATH", is_prod)?.map(PathBuf::from),
            },
            chart,
            store: StoreSettings {
                ttl_minutes: get_parsed("PDF_STORE_TTL_MINUTES", store_defaults.ttl_minutes)?,
                max_items: get_parsed("PDF_STORE_MAX_ITEMS", store_defaults.max_items)?,
                cleanup_interval_secs: get_parsed(
                    "PDF_STORE_CLEANUP_INTERVAL_SECS",
                    store_defaults.cleanup_interval_secs,
                )?,
            },
            public_base_url: optional_env("PUBLIC_BASE_URL", false)?,
            otlp_endpoint: optional_env("OTLP_ENDPOINT", false)?,
        })
    }
}

impl FromStr for Environment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Dev),
            "prod" | "production" => Ok(Environment::Prod),
            _ => Err(AppError::ConfigError(anyhow::anyhow!(
                "Invalid environment: {}",
                s
            ))),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, required: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if required {
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

fn optional_env(key: &str, required: bool) -> Result<Option<String>, AppError> {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => Ok(Some(val)),
        _ if required => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} is required in production but not set",
            key
        ))),
        _ => Ok(None),
    }
}

fn get_parsed<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val.trim().parse().map_err(|e: T::Err| {
            AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, val, e))
        }),
        Err(_) => Ok(default),
    }
}
