use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    model::{WeatherObservation, WeatherRequest},
    provider::{DateRequest, classify_date, truncate_body},
};

use super::WeatherProvider;

const CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";
const FORECAST_DAYS: i64 = 5;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self { api_key, http: Client::new() }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str, query: &str, kind: &str) -> Result<T> {
        let res = self
            .http
            .get(url)
            .query(&[("q", query), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({kind})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {kind} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {kind} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).with_context(|| format!("Failed to parse OpenWeather {kind} JSON"))
    }

    async fn fetch_current(&self, query: &str) -> Result<WeatherObservation> {
        let parsed: OwCurrentResponse = self.fetch_json(CURRENT_URL, query, "current").await?;
        Ok(parsed.into())
    }

    async fn fetch_forecast(&self, query: &str, when: DateTime<Utc>) -> Result<WeatherObservation> {
        let parsed: OwForecastResponse = self.fetch_json(FORECAST_URL, query, "forecast").await?;
        closest_forecast(&parsed, when)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
    /// hPa
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn observation(main: &OwMain, wind: &OwWind) -> WeatherObservation {
    WeatherObservation::new(main.temp, main.humidity, wind.speed, main.pressure)
}

impl From<OwCurrentResponse> for WeatherObservation {
    fn from(res: OwCurrentResponse) -> Self {
        observation(&res.main, &res.wind)
    }
}

fn closest_forecast(parsed: &OwForecastResponse, when: DateTime<Utc>) -> Result<WeatherObservation> {
    let target_ts = when.timestamp();

    let entry = parsed
        .list
        .iter()
        .min_by_key(|e| (e.dt - target_ts).abs())
        .ok_or_else(|| anyhow!("OpenWeather forecast response contained no data"))?;

    Ok(observation(&entry.main, &entry.wind))
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn get_observation(&self, request: &WeatherRequest) -> Result<WeatherObservation> {
        let now = Utc::now();
        let query = request.location.query();

        match classify_date(now.date_naive(), request.date) {
            DateRequest::Current => self.fetch_current(&query).await,
            DateRequest::Past(dt) => Err(anyhow!(
                "Historical weather ({}) is not supported by free OpenWeather API.\n\
                 Only current weather and up to {FORECAST_DAYS} days forecast are available.",
                dt.date_naive()
            )),
            DateRequest::Future(dt) => {
                let max_forecast = now + Duration::days(FORECAST_DAYS);
                if dt > max_forecast {
                    Err(anyhow!(
                        "Requested date {} exceeds the {FORECAST_DAYS}-day forecast limit of free OpenWeather API.\n\
                         Allowed range: today .. {}.",
                        dt.date_naive(),
                        max_forecast.date_naive()
                    ))
                } else {
                    self.fetch_forecast(&query, dt).await
                }
            }
        }
    }
}
