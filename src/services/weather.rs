use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

// Care-tip thresholds (metric)
const COLD_LIMIT_C: f32 = 10.0;
const HOT_LIMIT_C: f32 = 30.0;
const DRY_LIMIT_PCT: i32 = 40;
const HUMID_LIMIT_PCT: i32 = 80;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    main: ApiMain,
    weather: Vec<ApiCondition>,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f32,
    humidity: i32,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    main: String,
    description: String,
    icon: String,
}

/// Current conditions plus derived plant-care recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature: i32,
    pub humidity: i32,
    pub description: String,
    pub icon: String,
    pub recommendations: Vec<String>,
}

/// OpenWeatherMap client that turns current conditions into care tips.
pub struct WeatherService {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WeatherService {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: WEATHER_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn current(&self, latitude: f64, longitude: f64) -> Result<WeatherReport> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .context("weather request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("weather API error: {}", response.status());
        }

        let data: ApiResponse = response
            .json()
            .await
            .context("malformed weather payload")?;
        Self::build_report(data)
    }

    fn build_report(data: ApiResponse) -> Result<WeatherReport> {
        let condition = data
            .weather
            .first()
            .context("weather payload has no conditions")?;

        let recommendations =
            Self::recommendations(data.main.temp, data.main.humidity, &condition.main);

        Ok(WeatherReport {
            temperature: data.main.temp.round() as i32,
            humidity: data.main.humidity,
            description: condition.description.clone(),
            icon: condition.icon.clone(),
            recommendations,
        })
    }

    fn recommendations(temp: f32, humidity: i32, condition: &str) -> Vec<String> {
        let mut recommendations = Vec::new();

        if temp < COLD_LIMIT_C {
            recommendations.push(
                "Consider bringing sensitive plants indoors or providing frost protection."
                    .to_string(),
            );
        } else if temp > HOT_LIMIT_C {
            recommendations.push(
                "Increase watering frequency for outdoor plants. Consider shade cloth for \
                 sensitive plants."
                    .to_string(),
            );
        }

        if humidity < DRY_LIMIT_PCT {
            recommendations.push(
                "Low humidity detected. Consider misting plants or using a humidifier."
                    .to_string(),
            );
        } else if humidity > HUMID_LIMIT_PCT {
            recommendations.push(
                "High humidity detected. Ensure good air circulation to prevent fungal issues."
                    .to_string(),
            );
        }

        if condition == "Rain" {
            recommendations
                .push("Rain detected. Reduce watering frequency for outdoor plants.".to_string());
        }

        recommendations
    }

    /// Readable summary for the shell.
    pub fn format_report(report: &WeatherReport) -> String {
        let mut text = format!(
            "Current weather: {}\n• Temperature: {}°C\n• Humidity: {}%",
            report.description, report.temperature, report.humidity
        );
        for tip in &report.recommendations {
            text.push_str(&format!("\n• {}", tip));
        }
        text
    }
}
