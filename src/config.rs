//! Runtime configuration loaded from environment variables (and `.env`).

use crate::error::{ExportError, Result};

pub const DEFAULT_API_URL: &str = "https://api.braintrust.dev/v1";
pub const DEFAULT_OUTPUT_DIR: &str = "braintrust_data";

/// Page size for experiment/dataset/project listings.
pub const DEFAULT_LIST_LIMIT: usize = 10;
/// Page size for per-object event fetches.
pub const DEFAULT_EVENT_LIMIT: usize = 100;

/// Exporter configuration. Everything except the API key has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer credential for the Braintrust API. Required.
    pub api_key: String,
    /// Base URL including the version prefix, no trailing slash.
    pub api_url: String,
    /// Directory the per-object CSV files are written under.
    pub output_dir: String,
    pub list_page_limit: usize,
    pub event_page_limit: usize,
}

impl Config {
    /// Load configuration from the process environment. Call
    /// [`crate::load_env`] first so a local `.env` is honored.
    ///
    /// Fails before any network activity when `BRAINTRUST_API_KEY` is
    /// absent or blank.
    pub fn load() -> Result<Self> {
        let api_key = std::env::var("BRAINTRUST_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ExportError::Config {
                message: "BRAINTRUST_API_KEY is not set".to_string(),
            })?;

        let mut config = Self {
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            list_page_limit: DEFAULT_LIST_LIMIT,
            event_page_limit: DEFAULT_EVENT_LIMIT,
        };

        if let Ok(url) = std::env::var("BRAINTRUST_API_URL")
            && !url.trim().is_empty()
        {
            config.api_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Ok(dir) = std::env::var("BRAINTRUST_OUTPUT_DIR")
            && !dir.trim().is_empty()
        {
            config.output_dir = dir.trim().to_string();
        }

        // Malformed values keep the default; zero is clamped up.
        if let Some(limit) = std::env::var("BRAINTRUST_LIST_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            config.list_page_limit = limit.max(1);
        }

        if let Some(limit) = std::env::var("BRAINTRUST_EVENT_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            config.event_page_limit = limit.max(1);
        }

        Ok(config)
    }
}
