//! Google Directions and Weather API client

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::{DirectionsProvider, MapsError, RouteLeg, RouteSummary, TravelMode, WeatherProvider};
use crate::config::MapsConfig;
use crate::domain::{Place, WeatherRecord};

/// Days covered by the daily forecast lookup
const FORECAST_DAYS: i64 = 10;

/// Directions and weather backed by Google Maps Platform
pub struct GoogleMapsClient {
    api_key: String,
    base_url: String,
    weather_base_url: String,
    http: Client,
}

impl GoogleMapsClient {
    /// Create a client from the maps configuration
    pub fn from_config(config: &MapsConfig) -> Result<Self, MapsError> {
        debug!(base_url = %config.base_url, "GoogleMapsClient::from_config: called");
        let api_key = config.get_api_key().map_err(|e| MapsError::Config(e.to_string()))?;
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(MapsError::Network)?;
        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            weather_base_url: config.weather_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T, MapsError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MapsError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    async fn leg(&self, from: &Place, to: &Place, mode: TravelMode) -> Result<RouteLeg, MapsError> {
        debug!(from = %from.name, to = %to.name, %mode, "GoogleMapsClient::leg: called");
        let url = format!("{}/maps/api/directions/json", self.base_url);
        let query = [
            ("origin", endpoint(from)),
            ("destination", endpoint(to)),
            ("mode", mode.as_str().to_string()),
        ];
        let body: DirectionsResponse = self.get_json(&url, &query).await?;
        let (duration_secs, distance_m) = parse_directions(body, &from.name, &to.name)?;
        Ok(RouteLeg {
            from: from.name.clone(),
            to: to.name.clone(),
            duration_secs,
            distance_m,
        })
    }

    async fn current_conditions(&self, lat: f64, lng: f64) -> Result<WeatherRecord, MapsError> {
        debug!(lat, lng, "GoogleMapsClient::current_conditions: called");
        let url = format!("{}/v1/currentConditions:lookup", self.weather_base_url);
        let body: CurrentConditions = self.get_json(&url, &location_query(lat, lng)).await?;
        Ok(body.into_record())
    }

    async fn forecast(&self, lat: f64, lng: f64, date: NaiveDate) -> Result<WeatherRecord, MapsError> {
        debug!(lat, lng, %date, "GoogleMapsClient::forecast: called");
        let url = format!("{}/v1/forecast/days:lookup", self.weather_base_url);
        let mut query = location_query(lat, lng);
        query.push(("days", FORECAST_DAYS.to_string()));
        let body: ForecastResponse = self.get_json(&url, &query).await?;
        body.day(date)
            .ok_or_else(|| MapsError::InvalidResponse(format!("forecast has no entry for {}", date)))
    }
}

/// Origin or destination parameter for a place
fn endpoint(place: &Place) -> String {
    match place.coordinates {
        Some(coords) => coords.to_query(),
        None if !place.address.is_empty() => place.address.clone(),
        None => place.name.clone(),
    }
}

fn location_query(lat: f64, lng: f64) -> Vec<(&'static str, String)> {
    vec![("location.latitude", lat.to_string()), ("location.longitude", lng.to_string())]
}

/// Parse `YYYY-MM-DD` when it falls inside the forecast window
fn forecast_date(date: Option<&str>, today: NaiveDate) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(date?.trim(), "%Y-%m-%d").ok()?;
    let ahead = (date - today).num_days();
    (0..FORECAST_DAYS).contains(&ahead).then_some(date)
}

#[async_trait]
impl DirectionsProvider for GoogleMapsClient {
    async fn route(&self, places: &[Place], mode: TravelMode) -> Result<RouteSummary, MapsError> {
        debug!(place_count = places.len(), %mode, "GoogleMapsClient::route: called");
        let mut legs = Vec::with_capacity(places.len().saturating_sub(1));
        for pair in places.windows(2) {
            legs.push(self.leg(&pair[0], &pair[1], mode).await?);
        }
        let summary = RouteSummary::from_legs(mode, places.iter().map(|p| p.index).collect(), legs);
        info!(
            legs = summary.legs.len(),
            total_duration_secs = summary.total_duration_secs,
            total_distance_m = summary.total_distance_m,
            "GoogleMapsClient::route: route computed"
        );
        Ok(summary)
    }
}

#[async_trait]
impl WeatherProvider for GoogleMapsClient {
    async fn weather(&self, lat: f64, lng: f64, date: Option<&str>) -> Result<WeatherRecord, MapsError> {
        debug!(lat, lng, ?date, "GoogleMapsClient::weather: called");
        match forecast_date(date, Utc::now().date_naive()) {
            Some(day) => self.forecast(lat, lng, day).await,
            None => self.current_conditions(lat, lng).await,
        }
    }
}

// Directions API response types

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    #[serde(default)]
    legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    duration: ValueField,
    distance: ValueField,
}

#[derive(Debug, Deserialize)]
struct ValueField {
    value: u64,
}

/// Duration in seconds and distance in metres of the first route
fn parse_directions(body: DirectionsResponse, from: &str, to: &str) -> Result<(u64, u64), MapsError> {
    match body.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => {
            return Err(MapsError::NoRoute {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        _ => {
            return Err(MapsError::Provider {
                status: body.status,
                message: body.error_message.unwrap_or_default(),
            });
        }
    }

    let legs = body
        .routes
        .into_iter()
        .next()
        .map(|r| r.legs)
        .ok_or_else(|| MapsError::InvalidResponse("directions response has no routes".to_string()))?;
    Ok(legs
        .iter()
        .fold((0, 0), |(d, m), leg| (d + leg.duration.value, m + leg.distance.value)))
}

// Weather API response types

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Temperature {
    degrees: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeatherCondition {
    #[serde(default)]
    description: Option<LocalizedText>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

impl WeatherCondition {
    fn label(self) -> String {
        self.description
            .map(|d| d.text)
            .or(self.kind)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct LocalizedText {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentConditions {
    #[serde(default)]
    temperature: Temperature,
    #[serde(default)]
    weather_condition: WeatherCondition,
}

impl CurrentConditions {
    fn into_record(self) -> WeatherRecord {
        WeatherRecord {
            temperature: self.temperature.degrees,
            condition: self.weather_condition.label(),
            date: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastResponse {
    #[serde(default)]
    forecast_days: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForecastDay {
    display_date: DisplayDate,
    #[serde(default)]
    daytime_forecast: Option<DaytimeForecast>,
    #[serde(default)]
    max_temperature: Temperature,
    #[serde(default)]
    min_temperature: Temperature,
}

#[derive(Debug, Deserialize)]
struct DisplayDate {
    year: i32,
    month: u32,
    day: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DaytimeForecast {
    #[serde(default)]
    weather_condition: WeatherCondition,
}

impl ForecastResponse {
    /// Record for one day, temperature averaged over the daily range
    fn day(self, date: NaiveDate) -> Option<WeatherRecord> {
        let day = self
            .forecast_days
            .into_iter()
            .find(|d| NaiveDate::from_ymd_opt(d.display_date.year, d.display_date.month, d.display_date.day) == Some(date))?;

        let temperature = match (day.max_temperature.degrees, day.min_temperature.degrees) {
            (Some(max), Some(min)) => Some((max + min) / 2.0),
            (max, min) => max.or(min),
        };
        Some(WeatherRecord {
            temperature,
            condition: day.daytime_forecast.map(|f| f.weather_condition.label()).unwrap_or_default(),
            date: Some(date.format("%Y-%m-%d").to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_prefers_coordinates() {
        let with_coords = Place::new("Leeum").with_coordinates(37.538, 126.999).with_address("Itaewon-ro");
        assert_eq!(endpoint(&with_coords), "37.538,126.999");
        assert_eq!(endpoint(&Place::new("Leeum").with_address("Itaewon-ro")), "Itaewon-ro");
        assert_eq!(endpoint(&Place::new("Leeum")), "Leeum");
    }

    #[test]
    fn test_forecast_date_window() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        assert_eq!(forecast_date(Some("2026-05-03"), today), NaiveDate::from_ymd_opt(2026, 5, 3));
        assert_eq!(forecast_date(Some("2026-05-01 ~ 2026-05-02"), today), None);
        assert_eq!(forecast_date(Some("2026-06-30"), today), None);
        assert_eq!(forecast_date(Some("2026-04-30"), today), None);
        assert_eq!(forecast_date(Some("today"), today), None);
        assert_eq!(forecast_date(None, today), None);
    }

    #[test]
    fn test_parse_directions_ok() {
        let body: DirectionsResponse = serde_json::from_str(
            r#"{"status": "OK", "routes": [{"legs": [{"duration": {"value": 840, "text": "14 mins"}, "distance": {"value": 1100, "text": "1.1 km"}}]}]}"#,
        )
        .unwrap();
        assert_eq!(parse_directions(body, "a", "b").unwrap(), (840, 1100));
    }

    #[test]
    fn test_parse_directions_zero_results() {
        let body: DirectionsResponse = serde_json::from_str(r#"{"status": "ZERO_RESULTS", "routes": []}"#).unwrap();
        let err = parse_directions(body, "Jeju", "Seoul").unwrap_err();
        assert!(matches!(err, MapsError::NoRoute { .. }));
        assert!(err.to_string().contains("Jeju"));
    }

    #[test]
    fn test_parse_directions_denied() {
        let body: DirectionsResponse =
            serde_json::from_str(r#"{"status": "REQUEST_DENIED", "error_message": "bad key"}"#).unwrap();
        assert!(matches!(parse_directions(body, "a", "b"), Err(MapsError::Provider { .. })));
    }

    #[test]
    fn test_current_conditions_record() {
        let body: CurrentConditions = serde_json::from_str(
            r#"{
                "temperature": {"degrees": 13.7, "unit": "CELSIUS"},
                "weatherCondition": {"description": {"text": "Light rain", "languageCode": "en"}, "type": "LIGHT_RAIN"}
            }"#,
        )
        .unwrap();
        let record = body.into_record();
        assert_eq!(record.temperature, Some(13.7));
        assert_eq!(record.condition, "Light rain");
        assert!(record.date.is_none());
    }

    #[test]
    fn test_forecast_day_record() {
        let body: ForecastResponse = serde_json::from_str(
            r#"{
                "forecastDays": [
                    {
                        "displayDate": {"year": 2026, "month": 5, "day": 1},
                        "maxTemperature": {"degrees": 20.0},
                        "minTemperature": {"degrees": 10.0},
                        "daytimeForecast": {"weatherCondition": {"type": "CLEAR"}}
                    },
                    {
                        "displayDate": {"year": 2026, "month": 5, "day": 2},
                        "maxTemperature": {"degrees": 24.0},
                        "minTemperature": {"degrees": 14.0},
                        "daytimeForecast": {"weatherCondition": {"description": {"text": "Sunny"}}}
                    }
                ]
            }"#,
        )
        .unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 5, 2).unwrap();
        let record = body.day(date).unwrap();
        assert_eq!(record.temperature, Some(19.0));
        assert_eq!(record.condition, "Sunny");
        assert_eq!(record.date.as_deref(), Some("2026-05-02"));
    }
}
