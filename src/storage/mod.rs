use crate::error::{FareError, FareResult};
use crate::functions::RouteQuery;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

pub mod records;

pub use records::{FareReport, ReportDraft, Trip};

const HISTORY_FILE: &str = "trip_history.json";
const REPORTS_FILE: &str = "fare_reports.json";
const LOCATIONS_FILE: &str = "last_locations.json";

/// Historial de viajes: el más reciente primero, con capacidad acotada.
pub trait TripStore: Send + Sync {
    /// Vuelve a leer el historial desde su respaldo.
    fn load(&self) -> FareResult<Vec<Trip>>;
    fn save(&self, trip: Trip) -> FareResult<()>;
    fn list(&self) -> Vec<Trip>;
}

/// Reportes de tarifa, solo se agregan.
pub trait ReportStore: Send + Sync {
    fn submit(&self, report: FareReport) -> FareResult<()>;
    fn list_reports(&self) -> Vec<FareReport>;
}

/// Últimas direcciones usadas.
pub trait LocationStore: Send + Sync {
    fn remember(&self, query: &RouteQuery) -> FareResult<()>;
    fn last_used(&self) -> Option<RouteQuery>;
}

#[derive(Debug, Default)]
struct StoreState {
    history: Vec<Trip>,
    reports: Vec<FareReport>,
    last_locations: Option<RouteQuery>,
}

/// Almacenamiento local en archivos JSON, o en memoria si no hay directorio.
pub struct LocalStore {
    data_dir: Option<PathBuf>,
    capacity: usize,
    state: Mutex<StoreState>,
}

impl LocalStore {
    pub fn in_memory(capacity: usize) -> Self {
        Self {
            data_dir: None,
            capacity,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Abre (o crea) el directorio de datos y carga lo que haya guardado.
    pub fn open<P: AsRef<Path>>(data_dir: P, capacity: usize) -> FareResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;

        let mut history: Vec<Trip> = read_json(&data_dir.join(HISTORY_FILE))?.unwrap_or_default();
        history.truncate(capacity);
        let reports: Vec<FareReport> = read_json(&data_dir.join(REPORTS_FILE))?.unwrap_or_default();
        let last_locations = read_json(&data_dir.join(LOCATIONS_FILE))?;

        info!(
            "Opened store at {} ({} trips, {} reports)",
            data_dir.display(),
            history.len(),
            reports.len()
        );

        Ok(Self {
            data_dir: Some(data_dir),
            capacity,
            state: Mutex::new(StoreState {
                history,
                reports,
                last_locations,
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist<T: Serialize>(&self, file_name: &str, value: &T) -> FareResult<()> {
        match &self.data_dir {
            Some(dir) => write_json(&dir.join(file_name), value),
            None => Ok(()),
        }
    }
}

impl TripStore for LocalStore {
    fn load(&self) -> FareResult<Vec<Trip>> {
        if let Some(dir) = &self.data_dir {
            let mut history: Vec<Trip> = read_json(&dir.join(HISTORY_FILE))?.unwrap_or_default();
            history.truncate(self.capacity);
            self.state().history = history;
        }
        Ok(self.list())
    }

    fn save(&self, trip: Trip) -> FareResult<()> {
        let mut state = self.state();
        let mut history = Vec::with_capacity(self.capacity);
        history.push(trip);
        history.extend(state.history.iter().cloned());
        history.truncate(self.capacity);

        self.persist(HISTORY_FILE, &history)?;
        debug!("Saved trip, history now has {} entries", history.len());
        state.history = history;
        Ok(())
    }

    fn list(&self) -> Vec<Trip> {
        self.state().history.clone()
    }
}

impl ReportStore for LocalStore {
    fn submit(&self, report: FareReport) -> FareResult<()> {
        let mut state = self.state();
        let mut reports = state.reports.clone();
        reports.push(report);

        self.persist(REPORTS_FILE, &reports)?;
        state.reports = reports;
        Ok(())
    }

    fn list_reports(&self) -> Vec<FareReport> {
        self.state().reports.clone()
    }
}

impl LocationStore for LocalStore {
    fn remember(&self, query: &RouteQuery) -> FareResult<()> {
        let mut state = self.state();
        self.persist(LOCATIONS_FILE, query)?;
        state.last_locations = Some(query.clone());
        Ok(())
    }

    fn last_used(&self) -> Option<RouteQuery> {
        self.state().last_locations.clone()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> FareResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let reader = BufReader::new(File::open(path)?);
    let value = serde_json::from_reader(reader)
        .map_err(|e| FareError::Storage(format!("{}: {}", path.display(), e)))?;
    Ok(Some(value))
}

// Se escribe a un temporal y se renombra para no dejar archivos a medias
fn write_json<T: Serialize>(path: &Path, value: &T) -> FareResult<()> {
    let tmp = path.with_extension("json.tmp");
    {
        let writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(writer, value)?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}
