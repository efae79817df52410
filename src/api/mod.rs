use crate::config::AppConfig;
use crate::error::FareResult;
use crate::functions::TripServices;
use crate::storage::{LocalStore, LocationStore, ReportStore, TripStore};
use actix_web::web;
use chrono::FixedOffset;
use std::sync::Arc;

pub mod handlers;
use handlers::{
    estimate,
    estimate_route,
    health,
    last_locations,
    list_history,
    list_reports,
    save_trip,
    submit_report,
};

/// Estado compartido por los handlers. Las estimaciones no comparten nada mutable;
/// solo los almacenes tienen estado interno.
pub struct AppState {
    pub services: TripServices,
    pub trips: Arc<dyn TripStore>,
    pub reports: Arc<dyn ReportStore>,
    pub locations: Arc<dyn LocationStore>,
    pub utc_offset: FixedOffset,
}

impl AppState {
    pub fn new(services: TripServices, store: Arc<LocalStore>, utc_offset: FixedOffset) -> Self {
        Self {
            services,
            trips: store.clone(),
            reports: store.clone(),
            locations: store,
            utc_offset,
        }
    }

    /// Inicialización de proveedores y almacenamiento a partir de la configuración
    pub fn from_config(config: &AppConfig) -> FareResult<Self> {
        let services = TripServices::from_config(config)?;
        let store = match &config.storage.data_dir {
            Some(dir) => LocalStore::open(dir, config.storage.history_capacity)?,
            None => LocalStore::in_memory(config.storage.history_capacity),
        };
        Ok(Self::new(services, Arc::new(store), config.utc_offset()?))
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health))
            .route("/estimate", web::post().to(estimate))
            .route("/estimate/route", web::post().to(estimate_route))
            .route("/history", web::get().to(list_history))
            .route("/history", web::post().to(save_trip))
            .route("/reports", web::get().to(list_reports))
            .route("/reports", web::post().to(submit_report))
            .route("/locations/last", web::get().to(last_locations)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::estimate_trip::tests::services;
    use crate::functions::RouteQuery;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    fn state() -> web::Data<AppState> {
        web::Data::new(AppState::new(
            services(None),
            Arc::new(LocalStore::in_memory(20)),
            FixedOffset::east_opt(330 * 60).unwrap(),
        ))
    }

    #[actix_web::test]
    async fn test_estimate_endpoint() {
        let state = state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/estimate")
            .set_json(json!({
                "pickup": "Bandra Station",
                "dropoff": "Juhu Beach",
                "at": "2024-06-12T14:00"
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["fare"]["total_fare"], 85);
        assert_eq!(body["route"]["traffic_condition"], "light");
        assert_eq!(body["route"]["traffic_source"], "heuristic");
        assert_eq!(body["map"]["type"], "FeatureCollection");
        assert_eq!(state.locations.last_used(), Some(RouteQuery::new("Bandra Station", "Juhu Beach")));
    }

    #[actix_web::test]
    async fn test_estimate_errors_map_to_status_codes() {
        let app = test::init_service(App::new().app_data(state()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/estimate")
            .set_json(json!({ "pickup": "", "dropoff": "Juhu Beach" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/estimate")
            .set_json(json!({ "pickup": "Atlantis", "dropoff": "Juhu Beach" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let req = test::TestRequest::post()
            .uri("/api/estimate")
            .set_json(json!({ "pickup": "Bandra Station", "dropoff": "Juhu Beach", "at": "someday" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_route_estimate_endpoint() {
        let app = test::init_service(App::new().app_data(state()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/estimate/route")
            .set_json(json!({ "distance_km": 5.0, "base_duration_min": 20, "at": "2024-06-15T19:00" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        // sábado 19:00 -> x1.3, moderate
        assert_eq!(body["route"]["traffic_duration_min"], 26);
        assert_eq!(body["route"]["traffic_condition"], "moderate");

        let req = test::TestRequest::post()
            .uri("/api/estimate/route")
            .set_json(json!({ "distance_km": 0.0, "base_duration_min": 0 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        for oversized in [
            json!({ "distance_km": 268_435_460.0, "base_duration_min": 10 }),
            json!({ "distance_km": 5.0, "base_duration_min": 3_000_000_000u64 }),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/estimate/route")
                .set_json(oversized)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_web::test]
    async fn test_history_and_reports_endpoints() {
        let app = test::init_service(App::new().app_data(state()).configure(config)).await;

        let req = test::TestRequest::post()
            .uri("/api/history")
            .set_json(json!({
                "pickup": "Bandra Station",
                "dropoff": "Juhu Beach",
                "distance_km": 5.0,
                "duration_min": 24,
                "fare": 85
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/api/history").to_request();
        let history: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(history.as_array().map(Vec::len), Some(1));

        let req = test::TestRequest::post()
            .uri("/api/reports")
            .set_json(json!({
                "pickup": "Bandra Station",
                "dropoff": "Juhu Beach",
                "distance_km": 5.0,
                "estimated_fare": 85,
                "actual_fare": 100,
                "issues": ["refused_meter"]
            }))
            .to_request();
        let report: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report["difference_pct"], 17.6);

        let req = test::TestRequest::post()
            .uri("/api/reports")
            .set_json(json!({
                "pickup": "Bandra Station",
                "dropoff": "Juhu Beach",
                "distance_km": 5.0,
                "estimated_fare": 85,
                "actual_fare": 0
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_last_locations_empty() {
        let app = test::init_service(App::new().app_data(state()).configure(config)).await;
        let req = test::TestRequest::get().uri("/api/locations/last").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
}
