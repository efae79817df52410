use super::AppState;
use crate::engine::*;
use crate::error::FareError;
use crate::functions::{estimate_trip, RouteQuery};
use crate::storage::{FareReport, ReportDraft, Trip};
use crate::utils::{local_now, resolve_fare_time};
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

#[derive(Deserialize)]
pub struct EstimateRequest {
    #[serde(flatten)]
    pub query: RouteQuery,
    /// Hora programada; vacía = ahora
    pub at: Option<String>,
}

#[derive(Deserialize)]
pub struct RouteEstimateRequest {
    pub distance_km: f64,
    pub base_duration_min: u32,
    pub at: Option<String>,
    /// Duración con tráfico en vivo, si la capa de presentación ya la tiene
    pub traffic_duration_min: Option<u32>,
}

#[derive(Serialize)]
pub struct RouteEstimateResponse {
    pub route: RouteInfo,
    pub fare: FareBreakdown,
    pub comparison: ReferenceFares,
}

#[derive(Deserialize)]
pub struct SaveTripRequest {
    pub pickup: String,
    pub dropoff: String,
    pub distance_km: f64,
    pub duration_min: u32,
    pub fare: u32,
}

/// Traduce un error del dominio a una respuesta con un único mensaje para el usuario.
fn error_response(err: &FareError) -> HttpResponse {
    let body = json!({ "error": err.user_message() });
    match err {
        FareError::InvalidInput(_) => HttpResponse::BadRequest().json(body),
        FareError::Geocoding(_) | FareError::Routing(_) => {
            HttpResponse::UnprocessableEntity().json(body)
        }
        _ => {
            error!("Internal error: {}", err);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

pub async fn estimate(state: web::Data<AppState>, body: web::Json<EstimateRequest>) -> impl Responder {
    let at = match resolve_fare_time(body.at.as_deref(), state.utc_offset, local_now(state.utc_offset)) {
        Ok(at) => at,
        Err(e) => return error_response(&e),
    };

    match estimate_trip(&state.services, &body.query, at).await {
        Ok(estimate) => {
            if let Err(e) = state.locations.remember(&estimate.query) {
                warn!("Could not remember last used locations: {}", e);
            }
            HttpResponse::Ok().json(estimate)
        }
        Err(e) => {
            warn!("Fare estimation failed: {}", e);
            error_response(&e)
        }
    }
}

pub async fn estimate_route(
    state: web::Data<AppState>,
    body: web::Json<RouteEstimateRequest>,
) -> impl Responder {
    let at = match resolve_fare_time(body.at.as_deref(), state.utc_offset, local_now(state.utc_offset)) {
        Ok(at) => at,
        Err(e) => return error_response(&e),
    };

    let source = match body.traffic_duration_min {
        Some(travel_time_min) => TrafficSource::RealTime { travel_time_min },
        None => TrafficSource::HeuristicFallback,
    };

    match estimate_traffic(body.distance_km, body.base_duration_min, at, source) {
        Ok(route) => {
            let fare = compute_fare_with(&state.services.fare_rules, &route, at);
            let comparison = estimate_reference_fares(&route, at);
            HttpResponse::Ok().json(RouteEstimateResponse {
                route,
                fare,
                comparison,
            })
        }
        Err(e) => error_response(&e),
    }
}

pub async fn list_history(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.trips.list())
}

pub async fn save_trip(state: web::Data<AppState>, body: web::Json<SaveTripRequest>) -> impl Responder {
    let trip = match Trip::new(
        &body.pickup,
        &body.dropoff,
        body.distance_km,
        body.duration_min,
        body.fare,
        Utc::now(),
    ) {
        Ok(trip) => trip,
        Err(e) => return error_response(&e),
    };

    match state.trips.save(trip.clone()) {
        Ok(()) => HttpResponse::Created().json(trip),
        Err(e) => error_response(&e),
    }
}

pub async fn list_reports(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.reports.list_reports())
}

pub async fn submit_report(state: web::Data<AppState>, body: web::Json<ReportDraft>) -> impl Responder {
    let report = match FareReport::new(body.into_inner(), Utc::now()) {
        Ok(report) => report,
        Err(e) => return error_response(&e),
    };

    match state.reports.submit(report.clone()) {
        Ok(()) => HttpResponse::Created().json(report),
        Err(e) => error_response(&e),
    }
}

pub async fn last_locations(state: web::Data<AppState>) -> impl Responder {
    match state.locations.last_used() {
        Some(query) => HttpResponse::Ok().json(query),
        None => HttpResponse::NoContent().finish(),
    }
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
