use super::_structs::*;
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Tarifario de auto-rickshaw. Los valores por defecto son los vigentes en Mumbai.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FareRules {
    pub base_fare: u32,
    pub per_km_rate: u32,
    /// Distancia ya cubierta por la tarifa base (km)
    pub min_distance_km: f64,
    /// Recargo nocturno en porcentaje sobre base + distancia
    pub night_surcharge_pct: u32,
    pub night_start_hour: u32,
    pub night_end_hour: u32,
    pub waiting_charge_per_min: f64,
    /// Por debajo de esta velocidad (km/h) se considera tráfico lento
    pub slow_traffic_kmh: f64,
}

impl Default for FareRules {
    fn default() -> Self {
        Self {
            base_fare: 26,
            per_km_rate: 16,
            min_distance_km: 1.5,
            night_surcharge_pct: 25,
            night_start_hour: 22,
            night_end_hour: 5,
            waiting_charge_per_min: 1.5,
            slow_traffic_kmh: 15.0,
        }
    }
}

impl FareRules {
    pub fn is_night(&self, hour: u32) -> bool {
        hour >= self.night_start_hour || hour < self.night_end_hour
    }

    fn min_distance_tenths(&self) -> u64 {
        (self.min_distance_km * 10.0).round().max(0.0) as u64
    }

    fn waiting_rate_tenths(&self) -> u64 {
        (self.waiting_charge_per_min * 10.0).round().max(0.0) as u64
    }
}

const INITIAL_CONFIDENCE: i32 = 95;
const NIGHT_PENALTY: i32 = 5;
const WAITING_PENALTY: i32 = 10;
const LONG_DISTANCE_PENALTY: i32 = 5;
const LONG_DISTANCE_KM: f64 = 10.0;
const HEURISTIC_TRAFFIC_PENALTY: i32 = 8;

/// Calcula el desglose con el tarifario por defecto.
pub fn compute_fare(route: &RouteInfo, fare_time: NaiveDateTime) -> FareBreakdown {
    compute_fare_with(&FareRules::default(), route, fare_time)
}

/// Aplica el tarifario a una ruta ya ajustada por tráfico.
///
/// Todos los componentes monetarios se redondean hacia arriba.
pub fn compute_fare_with(
    rules: &FareRules,
    route: &RouteInfo,
    fare_time: NaiveDateTime,
) -> FareBreakdown {
    let is_night_time = rules.is_night(fare_time.hour());

    let chargeable_tenths = route
        .distance_tenths()
        .saturating_sub(rules.min_distance_tenths());
    let distance_fare = ceil_div(chargeable_tenths * rules.per_km_rate as u64, 10);

    // El respaldo solo aplica cuando el estimador no dio espera alguna
    let mut waiting_minutes = route.waiting_time_estimate_min;
    if waiting_minutes == 0 && route.avg_speed_kmh < rules.slow_traffic_kmh {
        waiting_minutes = round_fifth(route.traffic_duration_min);
    }
    let waiting_charge = ceil_div(waiting_minutes as u64 * rules.waiting_rate_tenths(), 10);

    let base_fare = rules.base_fare;
    let night_charge = if is_night_time {
        ceil_div(
            (base_fare as u64 + distance_fare as u64) * rules.night_surcharge_pct as u64,
            100,
        )
    } else {
        0
    };

    let total_fare = base_fare
        .saturating_add(distance_fare)
        .saturating_add(waiting_charge)
        .saturating_add(night_charge);

    FareBreakdown {
        base_fare,
        distance_fare,
        night_charge,
        waiting_charge,
        chargeable_distance_km: chargeable_tenths as f64 / 10.0,
        is_night_time,
        waiting_minutes,
        total_fare,
        confidence_score: confidence_score(route, is_night_time, waiting_charge),
    }
}

// round(minutes * 0.2), mitades hacia arriba
fn round_fifth(minutes: u32) -> u32 {
    ((minutes as u64 * 2 + 5) / 10) as u32
}

fn confidence_score(route: &RouteInfo, is_night_time: bool, waiting_charge: u32) -> u8 {
    let mut score = INITIAL_CONFIDENCE;
    if is_night_time {
        score -= NIGHT_PENALTY;
    }
    if waiting_charge > 0 {
        score -= WAITING_PENALTY;
    }
    if route.distance_km > LONG_DISTANCE_KM {
        score -= LONG_DISTANCE_PENALTY;
    }
    if route.traffic_source == TrafficSourceKind::Heuristic
        && route.traffic_condition >= TrafficCondition::Moderate
    {
        score -= HEURISTIC_TRAFFIC_PENALTY;
    }
    score.clamp(0, 100) as u8
}
