pub mod dashboard;

pub use dashboard::{build_report, DashboardReport};
