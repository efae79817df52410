use super::TrafficProvider;
use crate::engine::Coordinates;
use crate::error::TrafficError;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use tracing::debug;

/// Cliente TomTom Routing con tráfico en vivo.
pub struct TomTomTraffic {
    http: reqwest::Client,
    api_key: String,
    /// Endpoint base, p.ej: "https://api.tomtom.com"
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CalculateRouteResponse {
    #[serde(default)]
    routes: Vec<TomTomRoute>,
}

#[derive(Debug, Deserialize)]
struct TomTomRoute {
    summary: TomTomSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TomTomSummary {
    travel_time_in_seconds: f64,
}

impl TomTomTraffic {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, pickup: Coordinates, dropoff: Coordinates) -> Result<f64, TrafficError> {
        let url = reqwest::Url::parse_with_params(
            &format!(
                "{}/routing/1/calculateRoute/{},{}:{},{}/json",
                self.base_url, pickup.lat, pickup.lon, dropoff.lat, dropoff.lon
            ),
            &[
                ("key", self.api_key.as_str()),
                ("traffic", "true"),
                ("travelMode", "car"),
            ],
        )
        .map_err(|e| TrafficError::Unavailable(e.to_string()))?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| TrafficError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TrafficError::Unavailable(format!(
                "provider returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TrafficError::Unavailable(e.to_string()))?;
        parse_travel_time(&body)
    }
}

impl TrafficProvider for TomTomTraffic {
    fn travel_time<'a>(
        &'a self,
        pickup: Coordinates,
        dropoff: Coordinates,
    ) -> BoxFuture<'a, Result<f64, TrafficError>> {
        self.fetch(pickup, dropoff).boxed()
    }
}

/// Extrae `routes[0].summary.travelTimeInSeconds`; solo valores positivos son válidos.
pub fn parse_travel_time(body: &str) -> Result<f64, TrafficError> {
    let parsed: CalculateRouteResponse = serde_json::from_str(body)
        .map_err(|e| TrafficError::Unavailable(format!("malformed response: {}", e)))?;

    let seconds = parsed
        .routes
        .first()
        .map(|route| route.summary.travel_time_in_seconds)
        .ok_or_else(|| TrafficError::Unavailable("no routes in response".to_string()))?;

    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(TrafficError::Unavailable(format!(
            "invalid travel time: {}",
            seconds
        )));
    }

    debug!("Live travel time: {} s", seconds);
    Ok(seconds)
}
