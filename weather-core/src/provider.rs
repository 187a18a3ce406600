use crate::{
    Config, LocationRecord, WeatherObservation, WeatherRequest,
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use std::{collections::BTreeMap, convert::TryFrom, fmt::Debug};
use tracing::{debug, warn};

pub mod openweather;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, weatherapi."
            )),
        }
    }
}

/// Source of weather observations for a single location and date.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_observation(&self, request: &WeatherRequest)
    -> anyhow::Result<WeatherObservation>;
}

/// Where a requested date falls relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRequest {
    Current,
    Past(DateTime<Utc>),
    Future(DateTime<Utc>),
}

/// The calendar date providers treat as "now". UTC, so callers and
/// providers agree regardless of the local timezone.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Lookups for other days target midday UTC.
pub fn classify_date(today: NaiveDate, date: NaiveDate) -> DateRequest {
    let at = Utc.from_utc_datetime(&date.and_time(midday()));

    match date.cmp(&today) {
        std::cmp::Ordering::Equal => DateRequest::Current,
        std::cmp::Ordering::Less => DateRequest::Past(at),
        std::cmp::Ordering::Greater => DateRequest::Future(at),
    }
}

fn midday() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Fetch one observation per distinct location, in input order.
///
/// Stops at the first provider failure. Repeated locations are fetched once.
pub async fn collect_observations(
    provider: &dyn WeatherProvider,
    locations: &[LocationRecord],
    date: NaiveDate,
) -> anyhow::Result<BTreeMap<LocationRecord, WeatherObservation>> {
    let mut observations = BTreeMap::new();

    for location in locations {
        if observations.contains_key(location) {
            warn!(name = %location.name, area = %location.area, "Skipping duplicate location");
            continue;
        }

        debug!(query = %location.query(), %date, "Requesting weather");
        let request = WeatherRequest { location: location.clone(), date };
        let observation = provider
            .get_observation(&request)
            .await
            .with_context(|| format!("Failed to get weather for '{}'", location.query()))?;

        observations.insert(location.clone(), observation);
    }

    Ok(observations)
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.provider_api_key(id).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `csv-weather configure {id}` and enter your API key."
        )
    })?;

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenWeather => Box::new(OpenWeatherProvider::new(api_key.to_owned())),
        ProviderId::WeatherApi => Box::new(WeatherApiProvider::new(api_key.to_owned())),
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use anyhow::anyhow;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct FakeProvider {
        calls: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn get_observation(
            &self,
            request: &WeatherRequest,
        ) -> anyhow::Result<WeatherObservation> {
            let name = request.location.name.clone();
            self.calls.lock().unwrap().push(name.clone());

            if self.fail_on == Some(name.as_str()) {
                return Err(anyhow!("service unavailable"));
            }
            Ok(WeatherObservation::new(name.len() as f64, 50, 1.0, 1000))
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let parsed = ProviderId::try_from(id.as_str()).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
        assert_eq!(ProviderId::try_from("OpenWeather").unwrap(), ProviderId::OpenWeather);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn classify_date_relative_to_today() {
        let today = date("2024-06-10");

        assert_eq!(classify_date(today, today), DateRequest::Current);

        match classify_date(today, date("2024-06-08")) {
            DateRequest::Past(at) => assert_eq!(at.to_rfc3339(), "2024-06-08T12:00:00+00:00"),
            other => panic!("expected past, got {other:?}"),
        }
        assert!(matches!(classify_date(today, date("2024-06-12")), DateRequest::Future(_)));
    }

    #[test]
    fn today_classifies_as_current() {
        assert_eq!(classify_date(Utc::now().date_naive(), today()), DateRequest::Current);
    }

    #[test]
    fn truncate_body_is_char_safe() {
        let long = "é".repeat(300);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test]
    async fn collects_one_observation_per_distinct_location() {
        let provider = FakeProvider::default();
        let locations = vec![
            LocationRecord::new("Lagos", "Africa"),
            LocationRecord::new("Kyiv", "Europe"),
            LocationRecord::new("Lagos", "Africa"),
        ];

        let map =
            collect_observations(&provider, &locations, date("2024-06-10")).await.unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(*provider.calls.lock().unwrap(), ["Lagos", "Kyiv"]);
        assert_eq!(map[&LocationRecord::new("Kyiv", "Europe")].temperature_c, 4.0);
    }

    #[tokio::test]
    async fn stops_at_first_failure() {
        let provider = FakeProvider { fail_on: Some("Kyiv"), ..Default::default() };
        let locations = vec![
            LocationRecord::new("Kyiv", "Europe"),
            LocationRecord::new("Lagos", "Africa"),
        ];

        let err = collect_observations(&provider, &locations, date("2024-06-10"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Kyiv, Europe"));
        assert_eq!(provider.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderId::OpenWeather, &cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured for provider"));
    }

    #[test]
    fn default_provider_from_config_errors_when_not_set() {
        let cfg = Config::default();
        let err = default_provider_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No default provider configured"));
        assert!(msg.contains("Hint: run `csv-weather configure"));
    }

    #[test]
    fn default_provider_from_config_works_when_set_and_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "KEY".to_string());

        let provider = default_provider_from_config(&cfg);
        assert!(provider.is_ok());
    }
}
