use crate::error::{FareError, FareResult};
use crate::functions::TripEstimate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Viaje guardado en el historial. Nunca se modifica después de creado.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trip {
    /// Marca de tiempo en milisegundos
    pub id: i64,
    pub pickup: String,
    pub dropoff: String,
    pub distance_km: f64,
    pub duration_min: u32,
    pub fare: u32,
    #[serde(alias = "date")]
    pub timestamp: DateTime<Utc>,
}

impl Trip {
    pub fn new(
        pickup: &str,
        dropoff: &str,
        distance_km: f64,
        duration_min: u32,
        fare: u32,
        now: DateTime<Utc>,
    ) -> FareResult<Self> {
        let (pickup, dropoff) = (pickup.trim(), dropoff.trim());
        if pickup.is_empty() || dropoff.is_empty() {
            return Err(FareError::InvalidInput(
                "A saved trip needs both pickup and dropoff".to_string(),
            ));
        }
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(FareError::InvalidInput(format!(
                "Invalid trip distance: {}",
                distance_km
            )));
        }
        Ok(Self {
            id: now.timestamp_millis(),
            pickup: pickup.to_string(),
            dropoff: dropoff.to_string(),
            distance_km,
            duration_min,
            fare,
            timestamp: now,
        })
    }

    pub fn from_estimate(estimate: &TripEstimate, now: DateTime<Utc>) -> FareResult<Self> {
        Self::new(
            &estimate.query.pickup,
            &estimate.query.dropoff,
            estimate.route.distance_km,
            estimate.route.traffic_duration_min,
            estimate.fare.total_fare,
            now,
        )
    }
}

/// Datos enviados por el usuario al reportar una tarifa real.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportDraft {
    pub pickup: String,
    pub dropoff: String,
    pub distance_km: f64,
    pub estimated_fare: u32,
    pub actual_fare: u32,
    #[serde(default)]
    pub issues: BTreeSet<String>,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FareReport {
    pub pickup: String,
    pub dropoff: String,
    pub distance_km: f64,
    pub estimated_fare: u32,
    pub actual_fare: u32,
    pub issues: BTreeSet<String>,
    pub comments: String,
    pub reported_at: DateTime<Utc>,
    /// Diferencia porcentual real vs estimada, un decimal
    pub difference_pct: f64,
}

impl FareReport {
    pub fn new(draft: ReportDraft, now: DateTime<Utc>) -> FareResult<Self> {
        if draft.actual_fare == 0 {
            return Err(FareError::InvalidInput(
                "Please enter a valid fare amount".to_string(),
            ));
        }
        if draft.estimated_fare == 0 {
            return Err(FareError::InvalidInput(
                "A report needs the estimated fare it refers to".to_string(),
            ));
        }

        let estimated = draft.estimated_fare as f64;
        let difference = (draft.actual_fare as f64 - estimated) / estimated * 100.0;

        Ok(Self {
            pickup: draft.pickup.trim().to_string(),
            dropoff: draft.dropoff.trim().to_string(),
            distance_km: draft.distance_km,
            estimated_fare: draft.estimated_fare,
            actual_fare: draft.actual_fare,
            issues: draft
                .issues
                .into_iter()
                .map(|issue| issue.trim().to_string())
                .filter(|issue| !issue.is_empty())
                .collect(),
            comments: draft.comments.trim().to_string(),
            reported_at: now,
            difference_pct: (difference * 10.0).round() / 10.0,
        })
    }
}
