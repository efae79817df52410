use super::_structs::*;
use crate::error::{FareError, FareResult};
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use tracing::{debug, warn};

/// Origen de la duración con tráfico para un viaje.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficSource {
    /// Tiempo de viaje reportado por un proveedor de tráfico en vivo.
    RealTime { travel_time_min: u32 },
    /// Sin proveedor disponible: se usa el modelo por hora del día.
    HeuristicFallback,
}

/// Regla de la tabla heurística. La primera regla cuyo predicado se cumpla gana.
#[derive(Debug)]
pub struct TrafficRule {
    pub name: &'static str,
    applies: fn(hour: u32, weekend: bool) -> bool,
    /// Multiplicador en porcentaje (150 = x1.5)
    pub multiplier_pct: u32,
    pub condition: TrafficCondition,
    /// Si el fin de semana atenúa el multiplicador (x0.8)
    pub weekend_dampened: bool,
}

pub const WEEKEND_DAMPENING_PCT: u32 = 80;

/// Límites de entrada aceptados por el estimador (un viaje en auto, no una ruta nacional).
pub const MAX_DISTANCE_KM: f64 = 1_000.0;
pub const MAX_DURATION_MIN: u32 = 24 * 60;

fn weekend_evening(hour: u32, weekend: bool) -> bool {
    weekend && (18..=21).contains(&hour)
}

fn peak_within_peak(hour: u32, _weekend: bool) -> bool {
    hour == 9 || hour == 18
}

fn rush_hour(hour: u32, _weekend: bool) -> bool {
    (8..=10).contains(&hour) || (17..=19).contains(&hour)
}

fn busy_hour(hour: u32, _weekend: bool) -> bool {
    (11..=16).contains(&hour) || (20..=22).contains(&hour)
}

fn off_peak(_hour: u32, _weekend: bool) -> bool {
    true
}

// El orden importa: el tráfico comercial de fin de semana le gana a la hora pico,
// y la hora pico dentro del pico le gana al resto de la franja.
pub static TRAFFIC_RULES: [TrafficRule; 5] = [
    TrafficRule {
        name: "weekend_evening",
        applies: weekend_evening,
        multiplier_pct: 130,
        condition: TrafficCondition::Moderate,
        weekend_dampened: false,
    },
    TrafficRule {
        name: "peak_within_peak",
        applies: peak_within_peak,
        multiplier_pct: 180,
        condition: TrafficCondition::Heavy,
        weekend_dampened: true,
    },
    TrafficRule {
        name: "rush_hour",
        applies: rush_hour,
        multiplier_pct: 150,
        condition: TrafficCondition::Moderate,
        weekend_dampened: true,
    },
    TrafficRule {
        name: "busy_hour",
        applies: busy_hour,
        multiplier_pct: 120,
        condition: TrafficCondition::Light,
        weekend_dampened: true,
    },
    TrafficRule {
        name: "off_peak",
        applies: off_peak,
        multiplier_pct: 100,
        condition: TrafficCondition::Normal,
        weekend_dampened: true,
    },
];

/// Resultado de evaluar la tabla para un instante dado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicMatch {
    pub rule: &'static str,
    pub multiplier_pct: u32,
    pub condition: TrafficCondition,
}

pub fn is_weekend(at: &NaiveDateTime) -> bool {
    matches!(at.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Evalúa la tabla de reglas (primera coincidencia) y aplica la atenuación de fin de semana.
pub fn classify_time(at: &NaiveDateTime) -> HeuristicMatch {
    let hour = at.hour();
    let weekend = is_weekend(at);

    let rule = TRAFFIC_RULES
        .iter()
        .find(|rule| (rule.applies)(hour, weekend))
        .unwrap_or(&TRAFFIC_RULES[TRAFFIC_RULES.len() - 1]);

    let multiplier_pct = if weekend && rule.weekend_dampened {
        rule.multiplier_pct * WEEKEND_DAMPENING_PCT / 100
    } else {
        rule.multiplier_pct
    };

    HeuristicMatch {
        rule: rule.name,
        multiplier_pct,
        condition: rule.condition,
    }
}

/// Clasifica por proporción de retraso (ruta con datos en vivo).
pub fn classify_delay(delay_min: u32, base_duration_min: u32) -> TrafficCondition {
    let (delay, base) = (delay_min as u64, base_duration_min as u64);
    if delay * 2 > base {
        TrafficCondition::Heavy
    } else if delay * 5 > base {
        TrafficCondition::Moderate
    } else {
        TrafficCondition::Normal
    }
}

/// Minutos de espera derivados del retraso según la condición.
pub fn waiting_time_estimate(condition: TrafficCondition, delay_min: u32) -> u32 {
    let delay = delay_min as u64;
    match condition {
        TrafficCondition::Heavy => ceil_div(delay * 8, 10),
        TrafficCondition::Moderate => ceil_div(delay * 5, 10),
        TrafficCondition::Light => ceil_div(delay * 3, 10),
        TrafficCondition::Normal if delay > 0 => ceil_div(delay * 3, 10),
        TrafficCondition::Normal => 0,
    }
}

/// Convierte la duración base de una ruta en una duración afectada por tráfico.
///
/// Los campos de coordenadas no participan; se adjuntan después con
/// [`RouteInfo::with_coordinates`]. La duración con tráfico nunca baja de la
/// duración base, aun cuando la atenuación de fin de semana o una lectura en
/// vivo más rápida darían un valor menor.
pub fn estimate_traffic(
    distance_km: f64,
    base_duration_min: u32,
    at: NaiveDateTime,
    source: TrafficSource,
) -> FareResult<RouteInfo> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(FareError::InvalidInput(format!(
            "Route distance must be a non-negative number, got {}",
            distance_km
        )));
    }
    if base_duration_min == 0 {
        return Err(FareError::InvalidInput(
            "Route duration must be greater than zero".to_string(),
        ));
    }
    if distance_km > MAX_DISTANCE_KM {
        return Err(FareError::InvalidInput(format!(
            "Route distance {} km exceeds the {} km limit",
            distance_km, MAX_DISTANCE_KM
        )));
    }
    if base_duration_min > MAX_DURATION_MIN {
        return Err(FareError::InvalidInput(format!(
            "Route duration {} min exceeds the {} min limit",
            base_duration_min, MAX_DURATION_MIN
        )));
    }
    if let TrafficSource::RealTime { travel_time_min } = source {
        if travel_time_min > MAX_DURATION_MIN {
            return Err(FareError::InvalidInput(format!(
                "Real-time travel time {} min exceeds the {} min limit",
                travel_time_min, MAX_DURATION_MIN
            )));
        }
    }

    let distance_km = (distance_km * 10.0).round() / 10.0;

    let (traffic_duration_min, traffic_condition, traffic_source) = match source {
        TrafficSource::RealTime { travel_time_min } if travel_time_min > 0 => {
            let duration = travel_time_min.max(base_duration_min);
            let delay = duration - base_duration_min;
            (
                duration,
                classify_delay(delay, base_duration_min),
                TrafficSourceKind::RealTime,
            )
        }
        other => {
            if let TrafficSource::RealTime { .. } = other {
                warn!("Ignoring zero real-time travel time, using heuristic traffic model");
            }
            let matched = classify_time(&at);
            debug!("Heuristic traffic rule {} -> {:?}", matched.rule, matched);
            let scaled = ceil_div(base_duration_min as u64 * matched.multiplier_pct as u64, 100);
            (
                scaled.max(base_duration_min),
                matched.condition,
                TrafficSourceKind::Heuristic,
            )
        }
    };

    let traffic_delay_min = traffic_duration_min - base_duration_min;
    let waiting_time_estimate_min = waiting_time_estimate(traffic_condition, traffic_delay_min);
    let avg_speed_kmh = distance_km / (traffic_duration_min as f64 / 60.0);

    Ok(RouteInfo {
        distance_km,
        base_duration_min,
        traffic_duration_min,
        traffic_delay_min,
        traffic_condition,
        traffic_source,
        avg_speed_kmh,
        waiting_time_estimate_min,
        coordinates: None,
    })
}
