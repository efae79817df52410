pub mod route_map;
pub mod time;

pub use route_map::{route_map, straight_line_km};
pub use time::{local_now, resolve_fare_time};
