pub mod estimate_trip;
pub mod share;

pub use estimate_trip::{estimate_trip, RouteQuery, TripEstimate, TripServices};
pub use share::share_text;
