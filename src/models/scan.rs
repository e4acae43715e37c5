use crate::monitor::Event;
use serde::{Deserialize, Deserializer, Serialize};

/// One row of the wash scans sheet. Unknown columns are ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ScanRecord {
    #[serde(rename = "Site", default)]
    pub site: Option<String>,
    #[serde(rename = "Vehicle Name", default)]
    pub vehicle_name: Option<String>,
    #[serde(rename = "Created", default)]
    pub created: Option<String>,
    #[serde(rename = "Wash Time", default, deserialize_with = "lenient_f64")]
    pub wash_time: Option<f64>,
}

impl ScanRecord {
    /// Wash event keyed by vehicle. Rows without a vehicle name have no event.
    pub fn to_event(&self) -> Option<Event> {
        let vehicle = non_blank(self.vehicle_name.as_deref())?;
        Some(Event::from_raw(vehicle, self.created.as_deref()))
    }

    pub fn site(&self) -> Option<&str> {
        non_blank(self.site.as_deref())
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Numbers may arrive as text, blank, or junk; anything unparseable is `None`.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrFloat {
        Float(f64),
        String(String),
    }

    let v: Option<StringOrFloat> = Option::deserialize(deserializer)?;
    Ok(match v {
        Some(StringOrFloat::Float(f)) => Some(f),
        Some(StringOrFloat::String(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    })
}
