use chrono::{DateTime, NaiveDate, Utc};
use phonenumber::country;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use tracing::debug;

use crate::constants::{country_label, supported_countries, DEFAULT_COUNTRY};
use crate::error::{Result, ScraperError};
use crate::normalize::postal::postal_pattern;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
}

/// Politeness and transport settings for the portal crawler.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub user_agent: String,
    pub accept_language: String,
    pub delay_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            // Static user-agent string used when no config file overrides it
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "de,en;q=0.9".to_string(),
            delay_ms: 1000,
            timeout_seconds: 30,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!("Failed to read config file '{path}': {e}"))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Load the config file, falling back to built-in defaults when absent.
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                debug!(%err, "no usable config file, using built-in crawler defaults");
                Self::default()
            }
        }
    }
}

/// Immutable per-run settings, resolved once and threaded through every
/// pipeline stage.
///
/// The country code drives the search-form label, the postal code pattern
/// and the phone parsing region; the run timestamp is captured here so all
/// records of a run carry the same `lastvisited` date.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub country_code: String,
    pub country_label: &'static str,
    pub phone_region: country::Id,
    /// Compiled once per run; `None` for countries without a known postal
    /// code length.
    pub postal_pattern: Option<Regex>,
    pub started_at: DateTime<Utc>,
    pub run_date: NaiveDate,
}

impl RunConfig {
    /// Resolve run settings from an optional country override.
    ///
    /// An unrecognized country code aborts the run before any record is
    /// processed, since it would invalidate every record produced.
    pub fn resolve(country_code: Option<&str>) -> Result<Self> {
        let code = country_code
            .unwrap_or(DEFAULT_COUNTRY)
            .trim()
            .to_uppercase();

        let label = country_label(&code).ok_or_else(|| {
            ScraperError::Config(format!(
                "Unknown country code '{}'. Use one of {:?}.",
                code,
                supported_countries()
            ))
        })?;

        let phone_region = code.parse::<country::Id>().map_err(|_| {
            ScraperError::Config(format!("No phone region known for country '{code}'"))
        })?;

        let started_at = Utc::now();

        Ok(Self {
            postal_pattern: postal_pattern(&code),
            country_code: code,
            country_label: label,
            phone_region,
            started_at,
            run_date: started_at.date_naive(),
        })
    }
}
