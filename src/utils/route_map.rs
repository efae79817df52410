use crate::engine::{Coordinates, RouteCoordinates};
use geo::HaversineDistance;
use geo_types::{LineString, Point};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

impl From<Coordinates> for Point<f64> {
    fn from(coords: Coordinates) -> Self {
        Point::new(coords.lon, coords.lat)
    }
}

/// Distancia en línea recta (km) entre recogida y destino.
pub fn straight_line_km(coordinates: &RouteCoordinates) -> f64 {
    let pickup: Point<f64> = coordinates.pickup.into();
    let dropoff: Point<f64> = coordinates.dropoff.into();
    pickup.haversine_distance(&dropoff) / 1000.0
}

fn feature(geometry: Value, properties: serde_json::Value) -> Feature {
    let properties: Option<JsonObject> = match properties {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    };
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: None,
        properties,
        foreign_members: None,
    }
}

/// Mapa mínimo del viaje para la miniatura: punto A, punto B y la línea entre ambos.
pub fn route_map(coordinates: &RouteCoordinates) -> FeatureCollection {
    let pickup: Point<f64> = coordinates.pickup.into();
    let dropoff: Point<f64> = coordinates.dropoff.into();
    let line = LineString::from(vec![pickup.0, dropoff.0]);

    FeatureCollection {
        bbox: None,
        features: vec![
            feature(Value::from(&pickup), json!({ "role": "pickup", "label": "A" })),
            feature(Value::from(&dropoff), json!({ "role": "dropoff", "label": "B" })),
            feature(
                Value::from(&line),
                json!({
                    "role": "route",
                    "straight_line_km": (straight_line_km(coordinates) * 10.0).round() / 10.0,
                }),
            ),
        ],
        foreign_members: None,
    }
}
