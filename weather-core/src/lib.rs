//! Core library for the `csv-weather` report generator.
//!
//! This crate defines:
//! - Shared domain models (locations, observations)
//! - CSV reading of the location list and writing of the weather report
//! - Flattening of location/observation pairs into report rows
//! - Abstraction over weather providers and their configuration
//!
//! It is used by `csv-weather`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod report;
pub mod storage;

pub use config::{Config, ProviderConfig};
pub use error::StorageError;
pub use model::{LocationRecord, WeatherObservation, WeatherRequest};
pub use provider::{ProviderId, WeatherProvider, collect_observations};
pub use report::{REPORT_COLUMNS, ReportRow, merge};
pub use storage::{read_locations, write_report};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn csv_in_csv_out() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("cities.csv");
        let output = dir.path().join("report.csv");
        fs::write(&input, "Lagos,Africa\nKyiv,Europe\n").unwrap();

        let locations = read_locations(&input).unwrap();
        let observations: std::collections::BTreeMap<_, _> = locations
            .into_iter()
            .map(|l| (l, WeatherObservation::new(5.0, 80, 3.2, 1012)))
            .collect();
        write_report(&merge(&observations), &output).unwrap();

        let contents = fs::read_to_string(&output).unwrap();
        assert_eq!(
            contents.lines().collect::<Vec<_>>(),
            [
                "name,area,temperatureC,humidity,windSpeed,pressure",
                "Kyiv,Europe,5.0,80,3.2,1012",
                "Lagos,Africa,5.0,80,3.2,1012",
            ]
        );
    }
}
