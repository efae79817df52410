use super::{RouteSummary, Router};
use crate::engine::Coordinates;
use crate::error::{FareError, FareResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use tracing::{debug, error};

/// Enrutador sobre el servicio `route` de OSRM (perfil driving).
pub struct OsrmRouter {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
}

impl OsrmRouter {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, pickup: Coordinates, dropoff: Coordinates) -> FareResult<RouteSummary> {
        let url = route_url(&self.base_url, pickup, dropoff);
        let response = self.http.get(&url).send().await.map_err(|e| {
            error!("Routing request failed: {}", e);
            FareError::Routing(e.to_string())
        })?;

        // OSRM responde 400 con un cuerpo JSON para "NoRoute", por eso se lee el cuerpo igual
        let body = response
            .text()
            .await
            .map_err(|e| FareError::Routing(e.to_string()))?;
        parse_route_response(&body)
    }
}

impl Router for OsrmRouter {
    fn route<'a>(
        &'a self,
        pickup: Coordinates,
        dropoff: Coordinates,
    ) -> BoxFuture<'a, FareResult<RouteSummary>> {
        self.fetch(pickup, dropoff).boxed()
    }
}

/// OSRM espera lon,lat (no lat,lon).
pub fn route_url(base_url: &str, pickup: Coordinates, dropoff: Coordinates) -> String {
    format!(
        "{}/route/v1/driving/{},{};{},{}?overview=false",
        base_url.trim_end_matches('/'),
        pickup.lon,
        pickup.lat,
        dropoff.lon,
        dropoff.lat
    )
}

pub fn parse_route_response(body: &str) -> FareResult<RouteSummary> {
    let parsed: RouteResponse = serde_json::from_str(body)
        .map_err(|e| FareError::Routing(format!("Malformed routing response: {}", e)))?;

    if parsed.code != "Ok" {
        return Err(FareError::Routing(format!(
            "No route found ({}{})",
            parsed.code,
            parsed.message.map(|m| format!(": {}", m)).unwrap_or_default()
        )));
    }

    let route = parsed
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| FareError::Routing("No route found".to_string()))?;

    debug!("OSRM route: {} m, {} s", route.distance, route.duration);
    RouteSummary::new(route.distance, route.duration)
}
