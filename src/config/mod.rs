use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:3000",
];

const BYTES_PER_MB: usize = 1024 * 1024;

pub const DEFAULT_SUMMARIZER_MODEL: &str = "sshleifer/distilbart-cnn-12-6";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Upload limit in MB; `None` leaves request bodies unbounded.
    pub max_file_size_mb: Option<usize>,
    pub cors_allowed_origins: Vec<String>,
    pub tesseract_cmd: String,
    pub pdftoppm_cmd: String,
    pub raster_dpi: u32,
    pub summarizer_url: Option<String>,
    pub summarizer_model: String,
    pub summarizer_api_token: Option<String>,
    pub summarizer_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            max_file_size_mb: None,
            cors_allowed_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            tesseract_cmd: "tesseract".to_string(),
            pdftoppm_cmd: "pdftoppm".to_string(),
            raster_dpi: 200,
            summarizer_url: None,
            summarizer_model: DEFAULT_SUMMARIZER_MODEL.to_string(),
            summarizer_api_token: None,
            summarizer_timeout_seconds: 120,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        let defaults = Config::default();

        let config = Config {
            server_host: Self::string_var("SERVER_HOST", &defaults.server_host),
            server_port: Self::parse_env_var("SERVER_PORT", defaults.server_port)
                .context("Failed to parse SERVER_PORT")?,
            max_file_size_mb: Self::optional_var("MAX_FILE_SIZE_MB")
                .map(|raw| raw.parse::<usize>())
                .transpose()
                .context("Failed to parse MAX_FILE_SIZE_MB")?,
            cors_allowed_origins: Self::list_var("CORS_ALLOWED_ORIGINS")
                .unwrap_or(defaults.cors_allowed_origins),
            tesseract_cmd: Self::string_var("TESSERACT_CMD", &defaults.tesseract_cmd),
            pdftoppm_cmd: Self::string_var("PDFTOPPM_CMD", &defaults.pdftoppm_cmd),
            raster_dpi: Self::parse_env_var("RASTER_DPI", defaults.raster_dpi)
                .context("Failed to parse RASTER_DPI")?,
            summarizer_url: Self::optional_var("SUMMARIZER_URL"),
            summarizer_model: Self::string_var("SUMMARIZER_MODEL", &defaults.summarizer_model),
            summarizer_api_token: Self::optional_var("SUMMARIZER_API_TOKEN"),
            summarizer_timeout_seconds: Self::parse_env_var(
                "SUMMARIZER_TIMEOUT_SECONDS",
                defaults.summarizer_timeout_seconds,
            )
            .context("Failed to parse SUMMARIZER_TIMEOUT_SECONDS")?,
        };

        config.validate()?;

        if config.summarizer_url.is_none() {
            warn!("SUMMARIZER_URL not set, summaries will fall back to truncation");
        }

        info!(
            server_host = %config.server_host,
            server_port = config.server_port,
            max_file_size_mb = ?config.max_file_size_mb,
            raster_dpi = config.raster_dpi,
            summarizer_model = %config.summarizer_model,
            "Configuration loaded successfully"
        );
        Ok(config)
    }

    /// Port to bind, honouring the platform-provided `PORT` override.
    pub fn listen_port(&self) -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(self.server_port)
    }

    pub fn body_limit_bytes(&self) -> Option<usize> {
        self.max_file_size_mb.map(|mb| mb.saturating_mul(BYTES_PER_MB))
    }

    pub fn summarizer_timeout(&self) -> Duration {
        Duration::from_secs(self.summarizer_timeout_seconds)
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    fn string_var(var_name: &str, default: &str) -> String {
        env::var(var_name).unwrap_or_else(|_| {
            info!("{} not set, using default: {}", var_name, default);
            default.to_string()
        })
    }

    fn optional_var(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn list_var(var_name: &str) -> Option<Vec<String>> {
        let items: Vec<String> = Self::optional_var(var_name)?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if items.is_empty() {
            None
        } else {
            Some(items)
        }
    }

    fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_file_size_mb == Some(0) {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0 when set"));
        }
        if let Some(mb) = self.max_file_size_mb {
            if mb.checked_mul(BYTES_PER_MB).is_none() {
                return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB is too large: {}", mb));
            }
        }
        if self.raster_dpi < 72 {
            return Err(anyhow::anyhow!("RASTER_DPI must be at least 72"));
        }
        if self.summarizer_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("SUMMARIZER_TIMEOUT_SECONDS must be greater than 0"));
        }
        if self.tesseract_cmd.trim().is_empty() {
            return Err(anyhow::anyhow!("TESSERACT_CMD must not be empty"));
        }
        Ok(())
    }
}
