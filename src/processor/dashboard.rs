use crate::models::{RefillRecord, ScanRecord};
use crate::monitor::{
    count_recent, count_recent_per_entity, flag_overdue, latest_per_entity, AlertRecord, Event,
    Thresholds,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Sentinel used by the site picker for "no filter".
pub const ALL_SITES: &str = "All";

/// Length of the wash time series shown on the scans page.
pub const WASH_TIME_SERIES_LEN: usize = 50;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardReport {
    pub generated_at: NaiveDateTime,
    pub site_filter: Option<String>,
    pub thresholds: Thresholds,
    pub sites: Vec<String>,
    pub washes_in_window: usize,
    pub washes_per_vehicle: Vec<(String, usize)>,
    pub missed_washes: Vec<AlertRecord>,
    pub refill_gaps: Vec<AlertRecord>,
    pub wash_times: Vec<f64>,
}

impl DashboardReport {
    pub fn has_alerts(&self) -> bool {
        !self.missed_washes.is_empty() || !self.refill_gaps.is_empty()
    }

    /// Human-readable warning lines, missed washes first.
    pub fn alert_lines(&self) -> Vec<String> {
        let missed = self
            .missed_washes
            .iter()
            .map(|a| format!("{} last washed on {}", a.entity_key, a.last_seen_date()));
        let refills = self
            .refill_gaps
            .iter()
            .map(|a| format!("No refill at {} since {}", a.entity_key, a.last_seen_date()));
        missed.chain(refills).collect()
    }
}

/// Normalises a site picker value: blank or `All` means no filter.
pub fn normalize_site_filter(filter: Option<&str>) -> Option<String> {
    filter
        .map(str::trim)
        .filter(|f| !f.is_empty() && !f.eq_ignore_ascii_case(ALL_SITES))
        .map(str::to_string)
}

/// Distinct, non-blank sites present in the scans, sorted.
pub fn distinct_sites(scans: &[ScanRecord]) -> Vec<String> {
    scans
        .iter()
        .filter_map(ScanRecord::site)
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Wash times of the first scans in file order, missing values as `0.0`.
pub fn wash_time_series(scans: &[ScanRecord]) -> Vec<f64> {
    scans
        .iter()
        .take(WASH_TIME_SERIES_LEN)
        .map(|scan| scan.wash_time.unwrap_or(0.0))
        .collect()
}

/// Builds the dashboard numbers for one render.
///
/// The site filter narrows the wash figures only; refill gaps and the wash
/// time series always cover every site.
pub fn build_report(
    scans: &[ScanRecord],
    refills: &[RefillRecord],
    site_filter: Option<&str>,
    now: NaiveDateTime,
    thresholds: &Thresholds,
) -> DashboardReport {
    let site_filter = normalize_site_filter(site_filter);

    let wash_events: Vec<Event> = scans
        .iter()
        .filter(|scan| match &site_filter {
            Some(site) => scan.site() == Some(site.as_str()),
            None => true,
        })
        .filter_map(ScanRecord::to_event)
        .collect();

    let refill_events: Vec<Event> = refills.iter().filter_map(RefillRecord::to_event).collect();

    debug!(
        "Building report from {} wash events and {} refill events",
        wash_events.len(),
        refill_events.len()
    );

    let washes_in_window = count_recent(&wash_events, now, thresholds.recent_window);
    let washes_per_vehicle = count_recent_per_entity(&wash_events, now, thresholds.recent_window);
    let missed_washes = flag_overdue(
        &latest_per_entity(&wash_events),
        now,
        thresholds.wash_inactivity,
    );
    let refill_gaps = flag_overdue(
        &latest_per_entity(&refill_events),
        now,
        thresholds.refill_gap,
    );

    DashboardReport {
        generated_at: now,
        site_filter,
        thresholds: *thresholds,
        sites: distinct_sites(scans),
        washes_in_window,
        washes_per_vehicle,
        missed_washes,
        refill_gaps,
        wash_times: wash_time_series(scans),
    }
}
