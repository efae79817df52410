use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RouteCoordinates {
    pub pickup: Coordinates,
    pub dropoff: Coordinates,
}

/// Clasificación gruesa del tráfico, ordenada de menor a mayor congestión.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TrafficCondition {
    Normal,
    Light,
    Moderate,
    Heavy,
}

impl fmt::Display for TrafficCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrafficCondition::Normal => "normal",
            TrafficCondition::Light => "light",
            TrafficCondition::Moderate => "moderate",
            TrafficCondition::Heavy => "heavy",
        };
        f.write_str(label)
    }
}

/// De dónde salió la duración con tráfico. Alimenta el puntaje de confianza.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrafficSourceKind {
    RealTime,
    Heuristic,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteInfo {
    pub distance_km: f64,
    pub base_duration_min: u32,
    pub traffic_duration_min: u32,
    pub traffic_delay_min: u32,
    pub traffic_condition: TrafficCondition,
    pub traffic_source: TrafficSourceKind,
    pub avg_speed_kmh: f64,
    pub waiting_time_estimate_min: u32,
    pub coordinates: Option<RouteCoordinates>,
}

impl RouteInfo {
    pub fn with_coordinates(mut self, coordinates: RouteCoordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Distancia en décimas de km, la unidad con la que trabaja la aritmética de tarifas.
    pub(crate) fn distance_tenths(&self) -> u64 {
        (self.distance_km * 10.0).round().max(0.0) as u64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FareBreakdown {
    pub base_fare: u32,
    pub distance_fare: u32,
    pub night_charge: u32,
    pub waiting_charge: u32,
    pub chargeable_distance_km: f64,
    pub is_night_time: bool,
    pub waiting_minutes: u32,
    pub total_fare: u32,
    pub confidence_score: u8,
}

/// Estimaciones de los dos servicios de referencia (Ola Mini y Uber Go).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceFares {
    pub service_a: u32,
    pub service_b: u32,
}

/// Redondeo hacia arriba sobre enteros; toda la aritmética monetaria pasa por aquí.
/// Satura en `u32::MAX` en lugar de truncar.
pub(crate) fn ceil_div(numerator: u64, denominator: u64) -> u32 {
    u32::try_from(numerator.div_ceil(denominator)).unwrap_or(u32::MAX)
}
