use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    model::{WeatherObservation, WeatherRequest},
    provider::{DateRequest, classify_date, today, truncate_body},
};

use super::WeatherProvider;

const BASE_URL: &str = "http://api.weatherapi.com/v1";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self { api_key, http: Client::new() }
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{BASE_URL}/{endpoint}.json");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .with_context(|| format!("Failed to send request to WeatherAPI.com ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read WeatherAPI {endpoint} response body"))?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "WeatherAPI {endpoint} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse WeatherAPI {endpoint} JSON"))
    }

    async fn fetch_current(&self, query: String) -> Result<WeatherObservation> {
        let parsed: WaResponse = self.fetch_json("current", &[("q", query)]).await?;
        Ok(parsed.current.into())
    }

    /// `forecast` for future dates, `history` for past ones.
    async fn fetch_at(
        &self,
        query: String,
        when: DateTime<Utc>,
        is_forecast: bool,
    ) -> Result<WeatherObservation> {
        let endpoint = if is_forecast { "forecast" } else { "history" };

        let params = [
            ("q", query),
            ("dt", when.format("%Y-%m-%d").to_string()),
            ("hour", when.hour().to_string()),
        ];
        let parsed: WaForecastResponse = self.fetch_json(endpoint, &params).await?;

        closest_hour(&parsed, when)
    }
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    humidity: u8,
    wind_kph: f64,
    pressure_mb: f64,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaForecastHour {
    time_epoch: i64,
    temp_c: f64,
    humidity: u8,
    wind_kph: f64,
    pressure_mb: f64,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    hour: Vec<WaForecastHour>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    forecast: WaForecast,
}

fn observation(temp_c: f64, humidity: u8, wind_kph: f64, pressure_mb: f64) -> WeatherObservation {
    WeatherObservation::new(temp_c, humidity, wind_kph / 3.6, pressure_mb.round() as u32)
}

impl From<WaCurrent> for WeatherObservation {
    fn from(c: WaCurrent) -> Self {
        observation(c.temp_c, c.humidity, c.wind_kph, c.pressure_mb)
    }
}

fn closest_hour(parsed: &WaForecastResponse, when: DateTime<Utc>) -> Result<WeatherObservation> {
    let target_ts = when.timestamp();

    let day = parsed
        .forecast
        .forecastday
        .first()
        .ok_or_else(|| anyhow::anyhow!("WeatherAPI response contained no forecastday data"))?;

    let h = day
        .hour
        .iter()
        .min_by_key(|h| (h.time_epoch - target_ts).abs())
        .ok_or_else(|| anyhow::anyhow!("WeatherAPI response contained no hourly data"))?;

    Ok(observation(h.temp_c, h.humidity, h.wind_kph, h.pressure_mb))
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn get_observation(&self, request: &WeatherRequest) -> Result<WeatherObservation> {
        let query = request.location.query();

        match classify_date(today(), request.date) {
            DateRequest::Current => self.fetch_current(query).await,
            DateRequest::Future(dt) => self.fetch_at(query, dt, true).await,
            DateRequest::Past(dt) => self.fetch_at(query, dt, false).await,
        }
    }
}
