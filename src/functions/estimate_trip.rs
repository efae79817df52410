use crate::config::AppConfig;
use crate::engine::*;
use crate::error::{FareError, FareResult, TrafficError};
use crate::functions::share::share_text;
use crate::providers::*;
use crate::utils::route_map;
use chrono::NaiveDateTime;
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Direcciones de recogida y destino tal como las escribe el usuario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteQuery {
    #[serde(alias = "pickup_address")]
    pub pickup: String,
    #[serde(alias = "dropoff_address")]
    pub dropoff: String,
}

impl RouteQuery {
    pub fn new(pickup: impl Into<String>, dropoff: impl Into<String>) -> Self {
        Self {
            pickup: pickup.into(),
            dropoff: dropoff.into(),
        }
    }

    fn validated(&self) -> FareResult<(&str, &str)> {
        let (pickup, dropoff) = (self.pickup.trim(), self.dropoff.trim());
        if pickup.is_empty() || dropoff.is_empty() {
            return Err(FareError::InvalidInput(
                "Please enter both pickup and dropoff locations".to_string(),
            ));
        }
        Ok((pickup, dropoff))
    }
}

/// Todo lo que la capa de presentación necesita para mostrar una estimación.
#[derive(Debug, Clone, Serialize)]
pub struct TripEstimate {
    pub query: RouteQuery,
    pub at: NaiveDateTime,
    pub route: RouteInfo,
    pub fare: FareBreakdown,
    pub comparison: ReferenceFares,
    pub map: FeatureCollection,
    pub share_text: String,
}

/// Colaboradores externos de una estimación.
#[derive(Clone)]
pub struct TripServices {
    pub geocoder: Arc<dyn Geocoder>,
    pub router: Arc<dyn Router>,
    pub traffic: Option<Arc<dyn TrafficProvider>>,
    pub fare_rules: FareRules,
    pub timeout: Duration,
}

impl TripServices {
    /// Construye los proveedores HTTP reales. El tráfico en vivo solo se instala con clave.
    pub fn from_config(config: &AppConfig) -> FareResult<Self> {
        let providers = &config.providers;
        let http = http_client(providers)?;

        let traffic: Option<Arc<dyn TrafficProvider>> = match config.traffic_api_key() {
            Some(key) => {
                info!("Live traffic provider enabled ({})", providers.traffic_url);
                Some(Arc::new(TomTomTraffic::new(
                    http.clone(),
                    providers.traffic_url.clone(),
                    key,
                )))
            }
            None => {
                info!("No traffic API key configured, using heuristic traffic model");
                None
            }
        };

        Ok(Self {
            geocoder: Arc::new(NominatimGeocoder::new(http.clone(), providers.geocoding_url.clone())),
            router: Arc::new(OsrmRouter::new(http, providers.routing_url.clone())),
            traffic,
            fare_rules: config.fare.clone(),
            timeout: providers.timeout(),
        })
    }
}

async fn bounded<T, F>(limit: Duration, call: F, on_timeout: impl FnOnce() -> FareError) -> FareResult<T>
where
    F: Future<Output = FareResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout()),
    }
}

/// Consulta el proveedor de tráfico en vivo; cualquier fallo degrada al modelo heurístico.
async fn traffic_source(
    services: &TripServices,
    coordinates: &RouteCoordinates,
) -> TrafficSource {
    let Some(provider) = services.traffic.as_ref() else {
        return TrafficSource::HeuristicFallback;
    };

    let lookup = provider.travel_time(coordinates.pickup, coordinates.dropoff);
    let result = match tokio::time::timeout(services.timeout, lookup).await {
        Ok(result) => result,
        Err(_) => Err(TrafficError::Timeout),
    };

    match result {
        Ok(seconds) => TrafficSource::RealTime {
            travel_time_min: seconds_to_minutes(seconds),
        },
        Err(e) => {
            warn!("{}; falling back to heuristic traffic model", e);
            TrafficSource::HeuristicFallback
        }
    }
}

/// Geocodifica, enruta, ajusta por tráfico y tarifica un viaje.
///
/// Las llamadas externas son secuenciales. Un fallo de geocodificación o de
/// ruta aborta todo el cálculo; el tráfico en vivo nunca es fatal.
pub async fn estimate_trip(
    services: &TripServices,
    query: &RouteQuery,
    at: NaiveDateTime,
) -> FareResult<TripEstimate> {
    let (pickup, dropoff) = query.validated()?;
    let limit = services.timeout;

    let pickup_coords = bounded(limit, services.geocoder.geocode(pickup), || {
        FareError::Geocoding(format!("{}: request timed out", pickup))
    })
    .await?;
    let dropoff_coords = bounded(limit, services.geocoder.geocode(dropoff), || {
        FareError::Geocoding(format!("{}: request timed out", dropoff))
    })
    .await?;

    let coordinates = RouteCoordinates {
        pickup: pickup_coords,
        dropoff: dropoff_coords,
    };

    let summary = bounded(
        limit,
        services.router.route(pickup_coords, dropoff_coords),
        || FareError::Routing("request timed out".to_string()),
    )
    .await
    .map_err(|e| {
        error!("Routing failed from {} to {}: {}", pickup, dropoff, e);
        e
    })?;

    let source = traffic_source(services, &coordinates).await;

    let route = estimate_traffic(summary.distance_km(), summary.duration_min(), at, source)?
        .with_coordinates(coordinates);
    let fare = compute_fare_with(&services.fare_rules, &route, at);
    let comparison = estimate_reference_fares(&route, at);

    info!(
        "Estimated {} -> {}: {} km, {} min ({}), total {}",
        pickup,
        dropoff,
        route.distance_km,
        route.traffic_duration_min,
        route.traffic_condition,
        fare.total_fare
    );

    Ok(TripEstimate {
        query: RouteQuery::new(pickup, dropoff),
        at,
        map: route_map(&coordinates),
        share_text: share_text(pickup, dropoff, fare.total_fare),
        route,
        fare,
        comparison,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use futures::future::{self, BoxFuture, FutureExt};

    pub(crate) struct FakeGeocoder;

    impl Geocoder for FakeGeocoder {
        fn geocode<'a>(&'a self, address: &'a str) -> BoxFuture<'a, FareResult<Coordinates>> {
            let result = match address {
                "Bandra Station" => Ok(Coordinates::new(19.0544, 72.8402)),
                "Juhu Beach" => Ok(Coordinates::new(19.0988, 72.8267)),
                other => Err(FareError::Geocoding(format!("Address not found: {}", other))),
            };
            future::ready(result).boxed()
        }
    }

    pub(crate) struct FakeRouter {
        pub(crate) result: fn() -> FareResult<RouteSummary>,
    }

    impl Router for FakeRouter {
        fn route<'a>(&'a self, _: Coordinates, _: Coordinates) -> BoxFuture<'a, FareResult<RouteSummary>> {
            future::ready((self.result)()).boxed()
        }
    }

    struct FakeTraffic(Result<f64, ()>);

    impl TrafficProvider for FakeTraffic {
        fn travel_time<'a>(&'a self, _: Coordinates, _: Coordinates) -> BoxFuture<'a, Result<f64, TrafficError>> {
            let result = self
                .0
                .map_err(|_| TrafficError::Unavailable("503 Service Unavailable".to_string()));
            future::ready(result).boxed()
        }
    }

    struct StalledTraffic;

    impl TrafficProvider for StalledTraffic {
        fn travel_time<'a>(&'a self, _: Coordinates, _: Coordinates) -> BoxFuture<'a, Result<f64, TrafficError>> {
            future::pending().boxed()
        }
    }

    pub(crate) fn five_km_route() -> FareResult<RouteSummary> {
        RouteSummary::new(5000.0, 1200.0)
    }

    pub(crate) fn services(traffic: Option<Arc<dyn TrafficProvider>>) -> TripServices {
        TripServices {
            geocoder: Arc::new(FakeGeocoder),
            router: Arc::new(FakeRouter { result: five_km_route }),
            traffic,
            fare_rules: FareRules::default(),
            timeout: Duration::from_millis(200),
        }
    }

    fn weekday_afternoon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 12)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
    }

    fn query() -> RouteQuery {
        RouteQuery::new("Bandra Station", "Juhu Beach")
    }

    #[tokio::test]
    async fn test_heuristic_estimate_end_to_end() {
        let estimate = estimate_trip(&services(None), &query(), weekday_afternoon())
            .await
            .unwrap();

        assert_eq!(estimate.route.traffic_source, TrafficSourceKind::Heuristic);
        assert_eq!(estimate.route.traffic_duration_min, 24);
        assert_eq!(estimate.fare.total_fare, 85);
        assert_eq!(estimate.fare.confidence_score, 85);
        assert_eq!(estimate.comparison.service_a, 129);
        assert!(estimate.route.coordinates.is_some());
        assert_eq!(estimate.map.features.len(), 3);
        assert!(estimate.share_text.contains("₹85"));
    }

    #[tokio::test]
    async fn test_real_time_traffic_is_used_when_available() {
        let traffic: Arc<dyn TrafficProvider> = Arc::new(FakeTraffic(Ok(1860.0)));
        let estimate = estimate_trip(&services(Some(traffic)), &query(), weekday_afternoon())
            .await
            .unwrap();

        // 31 min sobre 20 base -> retraso 11 > 10 -> heavy
        assert_eq!(estimate.route.traffic_source, TrafficSourceKind::RealTime);
        assert_eq!(estimate.route.traffic_duration_min, 31);
        assert_eq!(estimate.route.traffic_condition, TrafficCondition::Heavy);
    }

    #[tokio::test]
    async fn test_unavailable_traffic_falls_back() {
        let traffic: Arc<dyn TrafficProvider> = Arc::new(FakeTraffic(Err(())));
        let estimate = estimate_trip(&services(Some(traffic)), &query(), weekday_afternoon())
            .await
            .unwrap();
        assert_eq!(estimate.route.traffic_source, TrafficSourceKind::Heuristic);
        assert_eq!(estimate.fare.total_fare, 85);
    }

    #[tokio::test]
    async fn test_stalled_traffic_times_out_and_falls_back() {
        let traffic: Arc<dyn TrafficProvider> = Arc::new(StalledTraffic);
        let estimate = estimate_trip(&services(Some(traffic)), &query(), weekday_afternoon())
            .await
            .unwrap();
        assert_eq!(estimate.route.traffic_source, TrafficSourceKind::Heuristic);
    }

    #[tokio::test]
    async fn test_missing_address_is_invalid_input() {
        let result = estimate_trip(&services(None), &RouteQuery::new("  ", "Juhu Beach"), weekday_afternoon()).await;
        assert!(matches!(result, Err(FareError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_unknown_address_aborts() {
        let result = estimate_trip(&services(None), &RouteQuery::new("Bandra Station", "Atlantis"), weekday_afternoon()).await;
        assert!(matches!(result, Err(FareError::Geocoding(_))));
    }

    #[tokio::test]
    async fn test_routing_failure_aborts() {
        let mut services = services(None);
        services.router = Arc::new(FakeRouter {
            result: || Err(FareError::Routing("No route found".to_string())),
        });
        let result = estimate_trip(&services, &query(), weekday_afternoon()).await;
        assert!(matches!(result, Err(FareError::Routing(_))));
    }

    #[tokio::test]
    async fn test_zero_duration_route_is_rejected() {
        let mut services = services(None);
        services.router = Arc::new(FakeRouter {
            result: || RouteSummary::new(0.0, 0.0),
        });
        let result = estimate_trip(&services, &query(), weekday_afternoon()).await;
        assert!(matches!(result, Err(FareError::InvalidInput(_))));
    }
}
