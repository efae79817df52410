use crate::config::ProvidersConfig;
use crate::engine::Coordinates;
use crate::error::{FareError, FareResult, TrafficError};
use futures::future::BoxFuture;

pub mod nominatim;
pub mod osrm;
pub mod tomtom;

pub use nominatim::NominatimGeocoder;
pub use osrm::OsrmRouter;
pub use tomtom::TomTomTraffic;

/// Dirección -> coordenadas.
pub trait Geocoder: Send + Sync {
    fn geocode<'a>(&'a self, address: &'a str) -> BoxFuture<'a, FareResult<Coordinates>>;
}

/// Ruta de conducción entre dos puntos (sin tráfico).
pub trait Router: Send + Sync {
    fn route<'a>(
        &'a self,
        pickup: Coordinates,
        dropoff: Coordinates,
    ) -> BoxFuture<'a, FareResult<RouteSummary>>;
}

/// Tiempo de viaje con tráfico en vivo, en segundos.
pub trait TrafficProvider: Send + Sync {
    fn travel_time<'a>(
        &'a self,
        pickup: Coordinates,
        dropoff: Coordinates,
    ) -> BoxFuture<'a, Result<f64, TrafficError>>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl RouteSummary {
    pub fn new(distance_meters: f64, duration_seconds: f64) -> FareResult<Self> {
        if !distance_meters.is_finite() || distance_meters < 0.0 {
            return Err(FareError::Routing(format!(
                "Invalid route distance: {}",
                distance_meters
            )));
        }
        if !duration_seconds.is_finite() || duration_seconds < 0.0 {
            return Err(FareError::Routing(format!(
                "Invalid route duration: {}",
                duration_seconds
            )));
        }
        Ok(Self {
            distance_meters,
            duration_seconds,
        })
    }

    /// Kilómetros con un decimal.
    pub fn distance_km(&self) -> f64 {
        (self.distance_meters / 100.0).round() / 10.0
    }

    /// Minutos redondeados hacia arriba.
    pub fn duration_min(&self) -> u32 {
        seconds_to_minutes(self.duration_seconds)
    }
}

pub fn seconds_to_minutes(seconds: f64) -> u32 {
    (seconds / 60.0).ceil().max(0.0) as u32
}

/// Cliente HTTP compartido por todos los proveedores.
pub fn http_client(config: &ProvidersConfig) -> FareResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .build()
        .map_err(|e| FareError::Config(format!("Could not build HTTP client: {}", e)))
}
