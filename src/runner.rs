use crate::config::{AppConfig, ReportFormat};
use crate::monitor::Thresholds;
use crate::processor::{build_report, DashboardReport};
use crate::source::DataSource;
use chrono::{Local, NaiveDateTime};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Loads both tables and builds one report for the given instant.
pub fn run_once<S: DataSource>(
    source: &S,
    site_filter: Option<&str>,
    thresholds: &Thresholds,
    now: NaiveDateTime,
) -> anyhow::Result<DashboardReport> {
    let scans = source.scans()?;
    let refills = source.refills()?;
    Ok(build_report(&scans, &refills, site_filter, now, thresholds))
}

pub fn emit(report: &DashboardReport, format: ReportFormat) -> anyhow::Result<()> {
    match format {
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        ReportFormat::Text => {
            info!(
                "Washes in past window: {} (site: {})",
                report.washes_in_window,
                report.site_filter.as_deref().unwrap_or("All")
            );
            for (vehicle, count) in &report.washes_per_vehicle {
                info!("  {}: {}", vehicle, count);
            }
            debug!(
                "Wash times (first {}): {:?}",
                report.wash_times.len(),
                report.wash_times
            );
            for line in report.alert_lines() {
                warn!("{}", line);
            }
            if !report.has_alerts() {
                info!("No overdue vehicles or sites");
            }
        }
    }
    Ok(())
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Runs once when polling is disabled, otherwise re-renders on every tick
/// until Ctrl-C. Repeated load failures trip a cooldown before retrying.
pub async fn start<S: DataSource>(config: &AppConfig, source: S) -> anyhow::Result<()> {
    let site_filter = config.site_filter.as_deref();

    if config.poll_interval_secs == 0 {
        let report = run_once(&source, site_filter, &config.thresholds, now())?;
        return emit(&report, config.report_format);
    }

    info!("Polling data every {} seconds", config.poll_interval_secs);

    let mut interval = tokio::time::interval(Duration::from_secs(config.poll_interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut consecutive_failures = 0;
    let max_retries = config.poll_max_retries;
    let cooldown_duration = Duration::from_secs(config.poll_cooldown_secs);

    loop {
        if max_retries > 0 && consecutive_failures >= max_retries {
            warn!(
                "Circuit breaker tripped ({} consecutive failures)! Sleeping for {} seconds...",
                consecutive_failures, config.poll_cooldown_secs
            );
            tokio::select! {
                _ = tokio::time::sleep(cooldown_duration) => {}
                _ = tokio::signal::ctrl_c() => break,
            }
            consecutive_failures = 0;
            info!("Circuit breaker reset. Resuming polling.");
        }

        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        match run_once(&source, site_filter, &config.thresholds, now()) {
            Ok(report) => {
                consecutive_failures = 0;
                if let Err(e) = emit(&report, config.report_format) {
                    error!("Failed to emit report: {}", e);
                }
            }
            Err(e) => {
                consecutive_failures += 1;
                error!(
                    "Failed to load data: {}. Failure count ({} / {})",
                    e, consecutive_failures, max_retries
                );
            }
        }
    }

    info!("Shutting down");
    Ok(())
}
