/// Errores fatales de una estimación de tarifa.
///
/// Cualquiera de estas variantes aborta el cálculo completo del viaje: no se
/// entregan resultados parciales a la calculadora.
#[derive(Debug, thiserror::Error)]
pub enum FareError {
    #[error("Could not geocode address: {0}")]
    Geocoding(String),
    #[error("Could not calculate route: {0}")]
    Routing(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FareError {
    /// Mensaje único que se muestra al usuario final.
    pub fn user_message(&self) -> String {
        match self {
            FareError::Geocoding(_) | FareError::Routing(_) => {
                "Could not calculate route. Please check the addresses and try again.".to_string()
            }
            FareError::InvalidInput(reason) => reason.clone(),
            _ => "Something went wrong while estimating the fare.".to_string(),
        }
    }
}

/// Fallo del proveedor de tráfico en tiempo real. Nunca es fatal: el
/// estimador cae al modelo heurístico.
#[derive(Debug, thiserror::Error)]
pub enum TrafficError {
    #[error("Traffic provider unavailable: {0}")]
    Unavailable(String),
    #[error("Traffic provider timed out")]
    Timeout,
}

pub type FareResult<T> = Result<T, FareError>;
