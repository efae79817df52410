pub mod _structs;
pub mod comparison;
pub mod fare;
pub mod traffic;

pub use _structs::*;
pub use comparison::estimate_reference_fares;
pub use fare::{compute_fare, compute_fare_with, FareRules};
pub use traffic::{estimate_traffic, TrafficSource};
