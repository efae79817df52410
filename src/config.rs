use crate::engine::FareRules;
use crate::error::{FareError, FareResult};
use chrono::FixedOffset;
use dotenv::dotenv;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProvidersConfig {
    pub geocoding_url: String,
    pub routing_url: String,
    pub traffic_url: String,
    /// Sin clave no se instala proveedor de tráfico en vivo
    pub traffic_api_key: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            geocoding_url: "https://nominatim.openstreetmap.org".to_string(),
            routing_url: "https://router.project-osrm.org".to_string(),
            traffic_url: "https://api.tomtom.com".to_string(),
            traffic_api_key: None,
            user_agent: concat!("fare-friend/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

impl ProvidersConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directorio de los archivos JSON; `None` deja todo en memoria
    pub data_dir: Option<PathBuf>,
    pub history_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: Some(PathBuf::from("data")),
            history_capacity: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
    pub storage: StorageConfig,
    pub fare: FareRules,
    /// Zona horaria local de las tarifas (330 = IST)
    pub utc_offset_minutes: i32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            providers: ProvidersConfig::default(),
            storage: StorageConfig::default(),
            fare: FareRules::default(),
            utc_offset_minutes: 330,
        }
    }
}

impl AppConfig {
    pub fn from_toml(source: &str) -> FareResult<Self> {
        let config: AppConfig =
            toml::from_str(source).map_err(|e| FareError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Carga la configuración desde un archivo TOML; si no existe se usan los valores por defecto.
    pub fn load<P: AsRef<Path>>(path: P) -> FareResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        info!("Loading configuration from {}", path.display());
        let source = std::fs::read_to_string(path)?;
        Self::from_toml(&source)
    }

    /// Carga `.env`, el archivo indicado por `FARE_FRIEND_CONFIG` y aplica overrides del entorno.
    pub fn from_env() -> FareResult<Self> {
        dotenv().ok();
        let path = env::var("FARE_FRIEND_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        let mut config = Self::load(path)?;

        if let Ok(key) = env::var("TRAFFIC_API_KEY") {
            config.providers.traffic_api_key = Some(key);
        }
        if let Ok(host) = env::var("FARE_FRIEND_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = env::var("FARE_FRIEND_PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| FareError::Config(format!("Invalid FARE_FRIEND_PORT: {}", port)))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn utc_offset(&self) -> FareResult<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            FareError::Config(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ))
        })
    }

    /// Clave de tráfico utilizable (no vacía).
    pub fn traffic_api_key(&self) -> Option<&str> {
        self.providers
            .traffic_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    fn validate(&self) -> FareResult<()> {
        if self.providers.timeout_secs == 0 {
            return Err(FareError::Config("providers.timeout_secs must be positive".into()));
        }
        if self.storage.history_capacity == 0 {
            return Err(FareError::Config("storage.history_capacity must be positive".into()));
        }
        if self.fare.night_start_hour > 23 || self.fare.night_end_hour > 23 {
            return Err(FareError::Config("night hours must be in 0..=23".into()));
        }
        if self.fare.min_distance_km < 0.0 || self.fare.waiting_charge_per_min < 0.0 {
            return Err(FareError::Config("fare amounts must be non-negative".into()));
        }
        self.utc_offset()?;
        Ok(())
    }
}
