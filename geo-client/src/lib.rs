use reqwest::header::HeaderValue;
use serde::Deserialize;
use url::Url;

use track_error::{Result, TrackError};

/// Default reverse-geocoding endpoint (Nominatim).
pub const NOMINATIM_ENDPOINT: &str =
    "https://nominatim.openstreetmap.org/reverse";

/// Display text when the service resolves nothing usable.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Structured address as returned by the service. All components are
/// optional and may be empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressDetails {
    #[serde(default)]
    pub road: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub village: Option<String>,
    #[serde(default)]
    pub hamlet: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl AddressDetails {
    /// First non-empty of city, town, village, hamlet.
    fn locality(&self) -> Option<&str> {
        [&self.city, &self.town, &self.village, &self.hamlet]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .find(|part| !part.is_empty())
    }
}

/// Response body of a reverse-geocoding request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReverseGeocodeResponse {
    #[serde(default)]
    pub address: Option<AddressDetails>,
}

impl ReverseGeocodeResponse {
    /// Join the present address components with ", ". Missing `address`
    /// object or all-empty components yield "Unknown Location".
    pub fn display_address(&self) -> String {
        let Some(address) = &self.address else {
            return UNKNOWN_LOCATION.to_string();
        };

        let mut parts: Vec<&str> = Vec::new();
        if let Some(road) = address.road.as_deref() {
            if !road.is_empty() {
                parts.push(road);
            }
        }
        if let Some(locality) = address.locality() {
            parts.push(locality);
        }
        if let Some(country) = address.country.as_deref() {
            if !country.is_empty() {
                parts.push(country);
            }
        }

        if parts.is_empty() {
            UNKNOWN_LOCATION.to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Thin client around the reverse-geocoding service. One attempt per
/// request, no retry, no client-side timeout; callers treat any transport
/// error or non-2xx status as failure.
pub struct GeocodeClient {
    endpoint: Url,
    client: reqwest::Client,
}

impl GeocodeClient {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(Url::parse(NOMINATIM_ENDPOINT)?)
    }

    /// Point the client at a different endpoint, e.g. a self-hosted
    /// Nominatim instance.
    pub fn with_endpoint(endpoint: Url) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "User-Agent",
            HeaderValue::from_static("waytrack/0.1 (location tracker)"),
        );
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self { endpoint, client })
    }

    /// URL for one lookup: `<endpoint>?format=json&lat=<lat>&lon=<lon>`.
    pub fn request_url(&self, latitude: f64, longitude: f64) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("lat", &latitude.to_string())
            .append_pair("lon", &longitude.to_string());
        url
    }

    /// Resolve a coordinate to a structured address.
    pub async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<ReverseGeocodeResponse> {
        let url = self.request_url(latitude, longitude);
        log::debug!("reverse geocoding {}", url);

        let response = self.client.get(url).send().await?;
        let response = response.error_for_status().map_err(|err| {
            TrackError::Geocode(format!("HTTP error! status: {}", err))
        })?;
        Ok(response.json().await?)
    }
}
