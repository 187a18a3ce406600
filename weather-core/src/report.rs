use serde::Serialize;

use crate::model::{LocationRecord, WeatherObservation};

/// Output header, in column order.
pub const REPORT_COLUMNS: [&str; 6] =
    ["name", "area", "temperatureC", "humidity", "windSpeed", "pressure"];

/// One output line: the location fields followed by the observation fields.
///
/// Field declaration order is the column order; it must stay in sync with
/// [`REPORT_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub name: String,
    pub area: String,
    pub temperature_c: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub pressure: u32,
}

impl ReportRow {
    pub fn flatten(location: &LocationRecord, observation: &WeatherObservation) -> Self {
        Self {
            name: location.name.clone(),
            area: location.area.clone(),
            temperature_c: observation.temperature_c,
            humidity: observation.humidity,
            wind_speed: observation.wind_speed,
            pressure: observation.pressure,
        }
    }
}

/// Flatten every (location, observation) pair into a report row.
///
/// Produces exactly one row per entry, in the collection's iteration order.
/// Pass a `BTreeMap` for rows sorted by name then area; a `HashMap` gives no
/// ordering guarantee.
pub fn merge<'a, I>(collection: I) -> Vec<ReportRow>
where
    I: IntoIterator<Item = (&'a LocationRecord, &'a WeatherObservation)>,
{
    collection
        .into_iter()
        .map(|(location, observation)| ReportRow::flatten(location, observation))
        .collect()
}
