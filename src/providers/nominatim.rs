use super::Geocoder;
use crate::engine::Coordinates;
use crate::error::{FareError, FareResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use tracing::{debug, error};

/// Geocodificador sobre la API de búsqueda de Nominatim (OpenStreetMap).
pub struct NominatimGeocoder {
    http: reqwest::Client,
    base_url: String,
}

// Nominatim devuelve lat/lon como strings
#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn search(&self, address: &str) -> FareResult<Coordinates> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/search", self.base_url),
            &[("format", "json"), ("q", address), ("limit", "1")],
        )
        .map_err(|e| FareError::Geocoding(format!("{}: {}", address, e)))?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| {
                error!("Geocoding request failed for {}: {}", address, e);
                FareError::Geocoding(format!("{}: {}", address, e))
            })?;

        if !response.status().is_success() {
            return Err(FareError::Geocoding(format!(
                "{}: provider returned {}",
                address,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FareError::Geocoding(format!("{}: {}", address, e)))?;
        parse_search_response(address, &body)
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode<'a>(&'a self, address: &'a str) -> BoxFuture<'a, FareResult<Coordinates>> {
        self.search(address).boxed()
    }
}

/// Interpreta el cuerpo de `/search`; una lista vacía significa dirección no encontrada.
pub fn parse_search_response(address: &str, body: &str) -> FareResult<Coordinates> {
    let results: Vec<SearchResult> = serde_json::from_str(body)
        .map_err(|e| FareError::Geocoding(format!("{}: malformed response ({})", address, e)))?;

    let first = results
        .into_iter()
        .next()
        .ok_or_else(|| FareError::Geocoding(format!("Address not found: {}", address)))?;

    let lat = first.lat.trim().parse::<f64>();
    let lon = first.lon.trim().parse::<f64>();
    let coordinates = match (lat, lon) {
        (Ok(lat), Ok(lon)) => Coordinates::new(lat, lon),
        _ => {
            return Err(FareError::Geocoding(format!(
                "{}: invalid coordinates in response",
                address
            )))
        }
    };

    if !coordinates.is_valid() {
        return Err(FareError::Geocoding(format!(
            "{}: coordinates out of range",
            address
        )));
    }

    debug!("Geocoded {} -> {:?}", address, coordinates);
    Ok(coordinates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_result() {
        let body = r#"[
            {"place_id": 1, "lat": "19.0544", "lon": "72.8402", "display_name": "Bandra West"},
            {"place_id": 2, "lat": "0", "lon": "0"}
        ]"#;
        let coords = parse_search_response("Bandra", body).unwrap();
        assert_eq!(coords, Coordinates::new(19.0544, 72.8402));
    }

    #[test]
    fn test_empty_result_is_not_found() {
        let err = parse_search_response("Atlantis", "[]").unwrap_err();
        assert!(matches!(err, FareError::Geocoding(msg) if msg.contains("Atlantis")));
    }

    #[test]
    fn test_malformed_bodies_are_errors() {
        for body in ["", "{}", "<html>rate limited</html>", r#"[{"lat": "abc", "lon": "72.8"}]"#, r#"[{"lat": "95.0", "lon": "72.8"}]"#] {
            assert!(matches!(
                parse_search_response("Andheri", body),
                Err(FareError::Geocoding(_))
            ));
        }
    }
}
