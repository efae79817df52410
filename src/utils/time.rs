use crate::error::{FareError, FareResult};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Hora local (reloj de pared) en la zona configurada.
pub fn local_now(offset: FixedOffset) -> NaiveDateTime {
    Utc::now().with_timezone(&offset).naive_local()
}

/// Resuelve la hora del viaje: ahora, o la hora programada por el usuario.
///
/// Acepta RFC 3339 (convertido a la zona configurada) o el formato de
/// `datetime-local` (`YYYY-MM-DDTHH:MM`), que ya es hora local.
pub fn resolve_fare_time(
    input: Option<&str>,
    offset: FixedOffset,
    now: NaiveDateTime,
) -> FareResult<NaiveDateTime> {
    let raw = match input.map(str::trim) {
        None | Some("") => return Ok(now),
        Some(raw) => raw,
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&offset).naive_local());
    }

    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| FareError::InvalidInput(format!("Invalid journey time: {}", raw)))
}
