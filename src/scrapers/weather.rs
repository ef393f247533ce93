//! Current conditions from Open-Meteo.

use crate::config::WeatherConfig;
use crate::error::FetchError;
use crate::models::{ContentItem, ContentKind};
use crate::scrapers::get_json;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

#[derive(Debug, Deserialize)]
struct Forecast {
    current: Option<Current>,
}

#[derive(Debug, Deserialize)]
struct Current {
    temperature_2m: f64,
    weather_code: u16,
}

/// Fetch the current temperature and sky for the configured city.
#[instrument(level = "info", skip_all, fields(city = %config.city))]
pub async fn fetch(client: &Client, config: &WeatherConfig) -> Result<ContentItem, FetchError> {
    let url = forecast_url(config)?;
    let forecast: Forecast = get_json(client, &url).await?;
    let current = forecast.current.ok_or_else(|| FetchError::Parse {
        url: url.clone(),
        reason: "response has no current conditions".to_string(),
    })?;

    let condition = describe_weather_code(current.weather_code);
    info!(temperature = current.temperature_2m, condition, "Fetched weather");
    Ok(ContentItem::new(
        ContentKind::Weather {
            city: config.city.clone(),
            temperature_c: current.temperature_2m,
            condition: condition.to_string(),
        },
        format!("Weather in {}", config.city),
        "",
    ))
}

fn forecast_url(config: &WeatherConfig) -> Result<String, FetchError> {
    let url = url::Url::parse_with_params(
        &config.base_url,
        &[
            ("latitude", config.latitude.to_string()),
            ("longitude", config.longitude.to_string()),
            ("current", "temperature_2m,weather_code".to_string()),
        ],
    )
    .map_err(|e| FetchError::Parse {
        url: config.base_url.clone(),
        reason: e.to_string(),
    })?;
    Ok(url.into())
}

/// Human wording for a WMO weather interpretation code.
pub fn describe_weather_code(code: u16) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown conditions",
    }
}
