use crate::ai::prompt::PlantContext;
use anyhow::{Context, Result};
use image::ImageFormat;
use serde::{Deserialize, Serialize};

const PLANTNET_API_URL: &str = "https://my-api.plantnet.org/v2/identify";
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
const MAX_MATCHES: usize = 3;

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    results: Vec<ApiResult>,
}

#[derive(Debug, Deserialize)]
struct ApiResult {
    score: f64,
    species: ApiSpecies,
}

#[derive(Debug, Deserialize)]
struct ApiSpecies {
    #[serde(rename = "scientificNameWithoutAuthor")]
    scientific_name: String,
    #[serde(rename = "commonNames", default)]
    common_names: Vec<String>,
    family: Option<ApiTaxon>,
    genus: Option<ApiTaxon>,
    description: Option<ApiDescription>,
}

#[derive(Debug, Deserialize)]
struct ApiTaxon {
    #[serde(rename = "scientificNameWithoutAuthor")]
    scientific_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiDescription {
    value: String,
}

/// One candidate species from an identification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantMatch {
    pub scientific_name: String,
    pub common_names: Vec<String>,
    /// 0-100, rounded from the API score.
    pub confidence: u8,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identification {
    pub matches: Vec<PlantMatch>,
    /// True when these are canned sample matches, not a real API result.
    pub fallback: bool,
}

impl From<&PlantMatch> for PlantContext {
    fn from(plant: &PlantMatch) -> Self {
        PlantContext {
            scientific_name: plant.scientific_name.clone(),
            common_names: plant.common_names.clone(),
        }
    }
}

/// PlantNet photo-identification client. Degrades to canned sample
/// matches when the key is missing or the API rejects the request.
pub struct PlantIdentifier {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    project: String,
    configured: bool,
}

impl PlantIdentifier {
    pub fn new(api_key: Option<String>, project: String) -> Self {
        let configured = api_key.is_some();
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.unwrap_or_default(),
            base_url: PLANTNET_API_URL.to_string(),
            project,
            configured,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Identifies a plant photo. `organs` names the pictured plant parts
    /// ("leaf", "flower", ...). Rejects invalid images outright; API
    /// trouble degrades to the sample matches instead of failing.
    pub async fn identify(
        &self,
        image_bytes: &[u8],
        file_name: &str,
        organs: &[&str],
    ) -> Result<Identification> {
        let mime = validate_image(image_bytes)?;

        if !self.configured {
            log::warn!("PlantNet key not configured, returning sample matches");
            return Ok(Self::fallback_matches());
        }

        let part = reqwest::multipart::Part::bytes(image_bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let mut form = reqwest::multipart::Form::new().part("images", part);
        for organ in organs {
            form = form.text("organs", organ.to_string());
        }

        let url = format!("{}/{}", self.base_url, self.project);
        let response = match self
            .http
            .post(&url)
            .query(&[("api-key", &self.api_key)])
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                log::warn!("PlantNet request failed: {}", e);
                return Ok(Self::fallback_matches());
            }
        };

        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            log::warn!("PlantNet returned 400, using sample matches");
            return Ok(Self::fallback_matches());
        }
        if !response.status().is_success() {
            anyhow::bail!("PlantNet API error: {}", response.status());
        }

        let data: ApiResponse = response
            .json()
            .await
            .context("malformed PlantNet payload")?;
        Ok(Self::from_api(data))
    }

    fn from_api(data: ApiResponse) -> Identification {
        let matches = data
            .results
            .into_iter()
            .take(MAX_MATCHES)
            .map(|result| PlantMatch {
                scientific_name: result.species.scientific_name,
                common_names: result.species.common_names,
                confidence: (result.score * 100.0).round().clamp(0.0, 100.0) as u8,
                family: result.species.family.map(|t| t.scientific_name),
                genus: result.species.genus.map(|t| t.scientific_name),
                description: result.species.description.map(|d| d.value),
            })
            .collect();

        Identification {
            matches,
            fallback: false,
        }
    }

    /// Sample matches shown when the API cannot be used.
    fn fallback_matches() -> Identification {
        Identification {
            matches: vec![
                PlantMatch {
                    scientific_name: "Monstera deliciosa".to_string(),
                    common_names: vec![
                        "Swiss Cheese Plant".to_string(),
                        "Split-leaf Philodendron".to_string(),
                    ],
                    confidence: 85,
                    family: Some("Araceae".to_string()),
                    genus: Some("Monstera".to_string()),
                    description: Some(
                        "A popular houseplant known for its large, fenestrated leaves. \
                         Native to tropical forests of Central America."
                            .to_string(),
                    ),
                },
                PlantMatch {
                    scientific_name: "Sansevieria trifasciata".to_string(),
                    common_names: vec![
                        "Snake Plant".to_string(),
                        "Mother-in-law's Tongue".to_string(),
                    ],
                    confidence: 78,
                    family: Some("Asparagaceae".to_string()),
                    genus: Some("Sansevieria".to_string()),
                    description: Some(
                        "A hardy succulent plant with upright, sword-like leaves. Excellent \
                         for beginners due to low maintenance requirements."
                            .to_string(),
                    ),
                },
            ],
            fallback: true,
        }
    }
}

/// Accepts JPEG, PNG and GIF up to 10 MB; returns the mime type.
fn validate_image(bytes: &[u8]) -> Result<&'static str> {
    if bytes.len() > MAX_IMAGE_BYTES {
        anyhow::bail!("image must be smaller than 10 MB");
    }

    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => Ok("image/jpeg"),
        Ok(ImageFormat::Png) => Ok("image/png"),
        Ok(ImageFormat::Gif) => Ok("image/gif"),
        _ => anyhow::bail!("please upload a valid image file (JPEG, PNG, or GIF)"),
    }
}
