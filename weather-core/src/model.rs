use chrono::NaiveDate;

/// A city from the input list.
///
/// Used as the key of the location -> observation map, so equality and
/// hashing are structural over both fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationRecord {
    pub name: String,
    pub area: String,
}

impl LocationRecord {
    pub fn new(name: impl Into<String>, area: impl Into<String>) -> Self {
        Self { name: name.into(), area: area.into() }
    }

    /// Free-text query understood by the weather providers.
    pub fn query(&self) -> String {
        if self.area.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.area)
        }
    }
}

/// Weather for one location on the requested date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherObservation {
    pub temperature_c: f64,
    /// Relative humidity, percent.
    pub humidity: u8,
    /// Metres per second.
    pub wind_speed: f64,
    /// Hectopascals (millibars).
    pub pressure: u32,
}

impl WeatherObservation {
    pub fn new(temperature_c: f64, humidity: u8, wind_speed: f64, pressure: u32) -> Self {
        Self { temperature_c, humidity, wind_speed, pressure }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub location: LocationRecord,
    pub date: NaiveDate,
}
