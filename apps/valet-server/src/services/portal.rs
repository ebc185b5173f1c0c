//! Client for the public-data portal's holiday and forecast services.
//!
//! Both endpoints authenticate with a service key passed as a query
//! parameter and wrap their data in the portal's common response envelope.
//! Responses are requested as JSON.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::clock;
use crate::config::PortalConfig;
use crate::error::ServerError;

use super::{ForecastEntry, Holiday, HolidayCalendar, WeatherForecast};

/// Holiday lookup endpoint.
const HOLIDAY_PATH: &str = "/B090041/openapi/service/SpcdeInfoService/getRestDeInfo";

/// Ultra-short-term forecast endpoint.
const FORECAST_PATH: &str = "/1360000/VilageFcstInfoService_2.0/getUltraSrtFcst";

/// The forecast covers six hours, ten categories per hour.
const FORECAST_ROWS: i32 = 60;

/// Client for the portal's REST services.
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    config: PortalConfig,
}

/// Common envelope wrapping every portal response.
#[derive(Debug, Deserialize)]
struct PortalEnvelope<T> {
    response: PortalResponse<T>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct PortalResponse<T> {
    #[serde(default)]
    body: Option<PortalBody<T>>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct PortalBody<T> {
    #[serde(rename = "totalCount", default)]
    total: i32,
    #[serde(default = "PortalItems::empty")]
    items: PortalItems<T>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct PortalItems<T> {
    #[serde(default)]
    item: Vec<T>,
}

impl<T> PortalItems<T> {
    fn empty() -> Self {
        Self { item: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
struct HolidayItem {
    /// Date as a `YYYYMMDD` number (e.g. `20250301`).
    #[serde(rename = "locdate", default)]
    date: i64,
    #[serde(rename = "dateName", default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ForecastItem {
    #[serde(default)]
    category: String,
    #[serde(rename = "fcstDate", default)]
    date: String,
    #[serde(rename = "fcstTime", default)]
    time: String,
    #[serde(rename = "fcstValue", default)]
    value: String,
}

impl PortalClient {
    pub fn new(config: PortalConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<PortalBody<T>, ServerError> {
        let resp = self
            .http
            .get(format!("{}{path}", self.config.base_url))
            .query(params)
            .send()
            .await
            .map_err(|e| ServerError::Portal(format!("{path} request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ServerError::Portal(format!("{path} returned {status}")));
        }

        let envelope: PortalEnvelope<T> = resp
            .json()
            .await
            .map_err(|e| ServerError::Portal(format!("{path} response parse failed: {e}")))?;

        envelope
            .response
            .body
            .ok_or_else(|| ServerError::Portal("empty response body".into()))
    }
}

#[async_trait]
impl HolidayCalendar for PortalClient {
    async fn list_holidays(&self, year: i32, month: u32) -> Result<Vec<Holiday>, ServerError> {
        debug!(year, month, "listing holidays");
        let params = [
            ("serviceKey", self.config.service_key.clone()),
            ("solYear", year.to_string()),
            ("solMonth", format!("{month:02}")),
            ("_type", "json".to_string()),
        ];
        let body: PortalBody<HolidayItem> = self.request(HOLIDAY_PATH, &params).await?;

        let holidays = body
            .items
            .item
            .into_iter()
            .map(|item| Holiday {
                day: (item.date % 100).unsigned_abs() as u32,
                name: item.name,
            })
            .collect();
        Ok(holidays)
    }
}

#[async_trait]
impl WeatherForecast for PortalClient {
    async fn ultra_short_forecast(&self) -> Result<Vec<ForecastEntry>, ServerError> {
        let now = clock::now();
        let base_date = now.format("%Y%m%d").to_string();
        // Issued every hour on the half hour.
        let base_hour = if chrono::Timelike::minute(&now) > 30 {
            now.format("%H").to_string()
        } else {
            (now - chrono::Duration::hours(1)).format("%H").to_string()
        };
        let base_time = format!("{base_hour}30");
        debug!(base_date, base_time, "requesting ultra-short-term forecast");

        let params = [
            ("serviceKey", self.config.service_key.clone()),
            ("dataType", "JSON".to_string()),
            ("pageNo", "1".to_string()),
            ("numOfRows", FORECAST_ROWS.to_string()),
            ("base_date", base_date),
            ("base_time", base_time),
            ("nx", self.config.grid_x.to_string()),
            ("ny", self.config.grid_y.to_string()),
        ];
        let body: PortalBody<ForecastItem> = self.request(FORECAST_PATH, &params).await?;
        if body.total > FORECAST_ROWS {
            warn!(total = body.total, "forecast response truncated to one page");
        }

        Ok(fold_forecast(body.items.item))
    }
}

/// Folds per-category forecast rows into one entry per timestamp.
fn fold_forecast(items: Vec<ForecastItem>) -> Vec<ForecastEntry> {
    let mut by_time: BTreeMap<String, ForecastEntry> = BTreeMap::new();
    for item in items {
        let key = format!("{}{}", item.date, item.time);
        let entry = by_time.entry(key.clone()).or_insert_with(|| ForecastEntry {
            time: key,
            temperature: 0,
            sky: String::new(),
            precipitation: String::new(),
        });
        match item.category.as_str() {
            "T1H" => match item.value.parse::<i32>() {
                Ok(temperature) => entry.temperature = temperature,
                Err(e) => warn!(value = item.value, error = %e, "failed to parse temperature"),
            },
            "SKY" => entry.sky = sky_label(&item.value).to_string(),
            "PTY" => entry.precipitation = precipitation_label(&item.value).to_string(),
            _ => {}
        }
    }
    by_time.into_values().collect()
}

/// Sky condition code labels.
fn sky_label(code: &str) -> &'static str {
    match code {
        "1" => "clear",
        "3" => "mostly cloudy",
        "4" => "overcast",
        _ => "?",
    }
}

/// Precipitation form code labels.
fn precipitation_label(code: &str) -> &'static str {
    match code {
        "0" => "none",
        "1" => "rain",
        "2" => "rain/snow",
        "3" => "snow",
        "4" => "shower",
        "5" => "drizzle",
        "6" => "sleet",
        "7" => "snow flurry",
        _ => "?",
    }
}
