use serde::{Deserialize, Serialize};

const OWM_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Current conditions reshaped for the frontend.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub city: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
    pub icon: String,
    pub humidity: f64,
    pub wind_speed: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("City not found")]
    CityNotFound,
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    name: String,
    main: OwmMain,
    weather: Vec<OwmCondition>,
    wind: OwmWind,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

/// OpenWeatherMap passthrough, metric units.
pub struct WeatherService {
    http: reqwest::Client,
    api_key: String,
}

impl WeatherService {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }

    pub async fn current(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let resp = self
            .http
            .get(OWM_ENDPOINT)
            .query(&[("q", city), ("appid", &self.api_key), ("units", "metric")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(WeatherError::CityNotFound);
        }

        let data: OwmResponse = resp.json().await?;
        let condition = data.weather.into_iter().next();
        Ok(WeatherReport {
            city: data.name,
            temperature: data.main.temp,
            feels_like: data.main.feels_like,
            description: condition.as_ref().map(|c| c.description.clone()).unwrap_or_default(),
            icon: condition.map(|c| c.icon).unwrap_or_default(),
            humidity: data.main.humidity,
            wind_speed: data.wind.speed,
        })
    }
}
