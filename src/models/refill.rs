use crate::models::scan::non_blank;
use crate::monitor::Event;
use serde::{Deserialize, Serialize};

/// One row of the refill deliveries sheet.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct RefillRecord {
    #[serde(rename = "Site", default)]
    pub site: Option<String>,
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
}

impl RefillRecord {
    pub fn to_event(&self) -> Option<Event> {
        let site = non_blank(self.site.as_deref())?;
        Some(Event::from_raw(site, self.date.as_deref()))
    }
}
