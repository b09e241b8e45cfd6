use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const PLACES_API_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
const SEARCH_KEYWORD: &str = "plant nursery garden center";
pub const DEFAULT_RADIUS_M: u32 = 5000;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
}

/// Finds nearby plant shops through the Places nearby-search API.
pub struct StoreLocator {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl StoreLocator {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: PLACES_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn find_plant_stores(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: u32,
    ) -> Result<Vec<Place>> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("location", format!("{},{}", latitude, longitude)),
                ("radius", radius_m.to_string()),
                ("keyword", SEARCH_KEYWORD.to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .context("store search request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Places API error: {}", response.status());
        }

        let data: ApiResponse = response
            .json()
            .await
            .context("malformed Places payload")?;

        if data.status != "OK" && data.status != "ZERO_RESULTS" {
            anyhow::bail!("Places API status: {}", data.status);
        }

        Ok(Self::filter_plant_stores(data.results))
    }

    /// Keeps places that look like plant shops: a telling name, or the
    /// generic "store" type.
    fn filter_plant_stores(results: Vec<Place>) -> Vec<Place> {
        results
            .into_iter()
            .filter(|place| {
                let name = place.name.to_lowercase();
                name.contains("nursery")
                    || name.contains("garden")
                    || name.contains("plant")
                    || place.types.iter().any(|t| t == "store")
            })
            .collect()
    }

    /// Plain-text store summary for the shell.
    pub fn summary(place: &Place) -> String {
        let mut lines = vec![place.name.clone()];

        if let Some(vicinity) = &place.vicinity {
            lines.push(vicinity.clone());
        }

        match place.rating {
            Some(rating) => lines.push(format!("Rating: {}/5", rating)),
            None => lines.push("No rating available".to_string()),
        }

        if let Some(level) = place.price_level {
            lines.push(format!("Price: {}", "$".repeat(level as usize)));
        }

        if let Some(hours) = &place.opening_hours {
            if let Some(open) = hours.open_now {
                lines.push(format!("Open: {}", if open { "Yes" } else { "No" }));
            }
        }

        lines.join("\n")
    }
}
