use crate::monitor::Thresholds;
use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("Unknown REPORT_FORMAT '{}', expected text or json", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: String,
    pub scans_file: String,
    pub refills_file: String,
    pub site_filter: Option<String>,
    pub thresholds: Thresholds,
    pub poll_interval_secs: u64,
    pub poll_max_retries: u32,
    pub poll_cooldown_secs: u64,
    pub report_format: ReportFormat,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| ".".to_string());
        let scans_file =
            env::var("SCANS_FILE").unwrap_or_else(|_| "Scans data - Sheet1.csv".to_string());
        let refills_file =
            env::var("REFILLS_FILE").unwrap_or_else(|_| "refills data - Sheet1.csv".to_string());
        let site_filter = env::var("SITE_FILTER").ok();

        let wash_inactivity_days = parse_or("WASH_INACTIVITY_DAYS", 3i64);
        let recent_window_days = parse_or("RECENT_WINDOW_DAYS", 7i64);
        let refill_gap_days = parse_or("REFILL_GAP_DAYS", 30i64);
        let thresholds =
            Thresholds::from_days(wash_inactivity_days, recent_window_days, refill_gap_days)
                .context("Invalid threshold configuration")?;

        let poll_interval_secs = parse_or("POLL_INTERVAL_SECS", 0u64);
        let poll_max_retries = parse_or("POLL_MAX_RETRIES", 5u32);
        let poll_cooldown_secs = parse_or("POLL_COOLDOWN_SECS", 300u64);

        let report_format = env::var("REPORT_FORMAT")
            .unwrap_or_else(|_| "text".to_string())
            .parse()?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            data_dir,
            scans_file,
            refills_file,
            site_filter,
            thresholds,
            poll_interval_secs,
            poll_max_retries,
            poll_cooldown_secs,
            report_format,
            log_level,
        })
    }
}

/// Reads a numeric variable, falling back to `default` when unset or unparseable.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
