pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod functions;
pub mod middlewares;
pub mod providers;
pub mod storage;
pub mod utils;

pub use config::AppConfig;
pub use engine::*;
pub use error::{FareError, FareResult, TrafficError};
pub use functions::*;
