use super::_structs::*;
use chrono::{NaiveDateTime, Timelike};

/// Tarifa de un servicio de referencia. Los montos van en décimas de rupia.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tariff {
    pub base_fare_tenths: u64,
    pub per_km_tenths: u64,
    pub per_min_tenths: u64,
}

/// Ola Mini
pub const SERVICE_A: Tariff = Tariff {
    base_fare_tenths: 450,
    per_km_tenths: 120,
    per_min_tenths: 10,
};

/// Uber Go
pub const SERVICE_B: Tariff = Tariff {
    base_fare_tenths: 480,
    per_km_tenths: 140,
    per_min_tenths: 15,
};

/// Factor de surge en porcentaje: condición de tráfico más bono por hora pico.
pub fn surge_pct(condition: TrafficCondition, hour: u32) -> u64 {
    let mut surge = match condition {
        TrafficCondition::Heavy => 140,
        TrafficCondition::Moderate => 120,
        _ => 100,
    };
    if (8..=10).contains(&hour) || (17..=20).contains(&hour) {
        surge += 10;
    }
    surge
}

impl Tariff {
    pub fn estimate(&self, route: &RouteInfo, surge_pct: u64) -> u32 {
        // subtotal en centésimas de rupia
        let subtotal_hundredths = self.base_fare_tenths * 10
            + route.distance_tenths() * self.per_km_tenths
            + route.traffic_duration_min as u64 * self.per_min_tenths * 10;
        ceil_div(subtotal_hundredths * surge_pct, 100 * 100)
    }
}

pub fn estimate_reference_fares(route: &RouteInfo, at: NaiveDateTime) -> ReferenceFares {
    let surge = surge_pct(route.traffic_condition, at.hour());
    ReferenceFares {
        service_a: SERVICE_A.estimate(route, surge),
        service_b: SERVICE_B.estimate(route, surge),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 12)
            .unwrap()
            .and_hms_opt(hour, 15, 0)
            .unwrap()
    }

    fn route(condition: TrafficCondition) -> RouteInfo {
        RouteInfo {
            distance_km: 5.0,
            base_duration_min: 20,
            traffic_duration_min: 24,
            traffic_delay_min: 4,
            traffic_condition: condition,
            traffic_source: TrafficSourceKind::Heuristic,
            avg_speed_kmh: 12.5,
            waiting_time_estimate_min: 2,
            coordinates: None,
        }
    }

    #[test]
    fn test_surge_factors() {
        assert_eq!(surge_pct(TrafficCondition::Light, 14), 100);
        assert_eq!(surge_pct(TrafficCondition::Moderate, 14), 120);
        assert_eq!(surge_pct(TrafficCondition::Heavy, 14), 140);
        assert_eq!(surge_pct(TrafficCondition::Heavy, 9), 150);
        assert_eq!(surge_pct(TrafficCondition::Normal, 20), 110);
        assert_eq!(surge_pct(TrafficCondition::Normal, 21), 100);
    }

    #[test]
    fn test_off_peak_light_traffic() {
        // A: 45 + 5*12 + 24*1.0 = 129; B: 48 + 5*14 + 24*1.5 = 154
        let fares = estimate_reference_fares(&route(TrafficCondition::Light), at(14));
        assert_eq!(fares, ReferenceFares { service_a: 129, service_b: 154 });
    }

    #[test]
    fn test_surge_rounds_up() {
        // 129 * 1.2 = 154.8 -> 155; 154 * 1.2 = 184.8 -> 185
        let fares = estimate_reference_fares(&route(TrafficCondition::Moderate), at(14));
        assert_eq!(fares, ReferenceFares { service_a: 155, service_b: 185 });

        // 129 * 1.5 = 193.5 -> 194; 154 * 1.5 = 231
        let fares = estimate_reference_fares(&route(TrafficCondition::Heavy), at(18));
        assert_eq!(fares, ReferenceFares { service_a: 194, service_b: 231 });
    }
}
