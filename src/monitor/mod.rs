//! Overdue-activity detection over timestamped vehicle and site events.
//!
//! Every function here is pure: the caller supplies both the events and the
//! reference `now`, so results are reproducible.

pub mod activity;
pub mod threshold;
pub mod timestamp;

pub use activity::{
    count_recent, count_recent_per_entity, flag_overdue, latest_per_entity, AlertRecord,
    EntityKey, Event,
};
pub use threshold::{MonitorError, Threshold, Thresholds};
pub use timestamp::parse_timestamp;
