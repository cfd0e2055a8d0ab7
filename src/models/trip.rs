//! Modelo de Trip
//!
//! Viajes existentes, candidatos a validar y su ventana horaria.

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Estado del viaje - mapea a la columna trips.status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl TripStatus {
    /// Los viajes cancelados o completados no ocupan al conductor
    pub fn occupies_schedule(self) -> bool {
        matches!(self, TripStatus::Scheduled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TripStatus::Scheduled => "scheduled",
            TripStatus::Completed => "completed",
            TripStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for TripStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(TripStatus::Scheduled),
            "completed" => Ok(TripStatus::Completed),
            "cancelled" | "canceled" => Ok(TripStatus::Cancelled),
            other => Err(format!("unknown trip status '{}'", other)),
        }
    }
}

/// Ventana horaria semiabierta `[start, end)` en minutos desde medianoche
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_minute: i64,
    pub end_minute: i64,
}

impl TimeWindow {
    /// Sin hora de regreso (o regreso no posterior a la recogida) se usa la duración por defecto
    pub fn from_times(pickup: NaiveTime, return_time: Option<NaiveTime>, default_duration: Duration) -> Self {
        let start = minute_of_day(pickup);
        let end = match return_time.map(minute_of_day) {
            Some(end) if end > start => end,
            _ => start + default_duration.num_minutes(),
        };
        Self {
            start_minute: start,
            end_minute: end,
        }
    }

    /// Dos ventanas que sólo se tocan no se solapan
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start_minute < other.end_minute && other.start_minute < self.end_minute
    }

    pub fn duration_hours(&self) -> f64 {
        (self.end_minute - self.start_minute) as f64 / 60.0
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start_minute / 60,
            self.start_minute % 60,
            self.end_minute / 60,
            self.end_minute % 60
        )
    }
}

fn minute_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// Viaje existente tal como lo devuelve el repositorio
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripSnapshot {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub trip_date: NaiveDate,
    /// Puede faltar en datos mal formados
    pub pickup_time: Option<NaiveTime>,
    pub return_time: Option<NaiveTime>,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub customer_name: Option<String>,
    #[serde(default)]
    pub requires_wheelchair: bool,
    pub passenger_count: Option<u32>,
    pub status: TripStatus,
    /// Versión para escrituras con control optimista
    #[serde(default)]
    pub version: i32,
}

impl TripSnapshot {
    pub fn window(&self, default_duration: Duration) -> Option<TimeWindow> {
        self.pickup_time
            .map(|pickup| TimeWindow::from_times(pickup, self.return_time, default_duration))
    }

    /// Horas estimadas: diferencia explícita de regreso o la estimación fija
    pub fn estimated_hours(&self, default_duration: Duration) -> f64 {
        self.window(default_duration)
            .map(|w| w.duration_hours())
            .unwrap_or_else(|| default_duration.num_minutes() as f64 / 60.0)
    }

    pub fn label(&self) -> String {
        self.customer_name
            .clone()
            .unwrap_or_else(|| format!("customer {}", self.customer_id))
    }

    /// Candidato equivalente para revalidar un viaje ya guardado
    pub fn to_candidate(&self) -> Option<TripCandidate> {
        Some(TripCandidate {
            trip_id: Some(self.id),
            driver_id: self.driver_id,
            vehicle_id: self.vehicle_id,
            customer_id: self.customer_id,
            trip_date: self.trip_date,
            pickup_time: self.pickup_time?,
            return_time: self.return_time,
            requires_wheelchair: self.requires_wheelchair,
            passenger_count: self.passenger_count,
        })
    }
}

/// Combinación conductor/vehículo/cliente que se quiere validar antes de guardar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripCandidate {
    /// Presente al revalidar un viaje existente; se excluye de sus propios hermanos
    pub trip_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub trip_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub return_time: Option<NaiveTime>,
    #[serde(default)]
    pub requires_wheelchair: bool,
    pub passenger_count: Option<u32>,
}

impl TripCandidate {
    pub fn window(&self, default_duration: Duration) -> TimeWindow {
        TimeWindow::from_times(self.pickup_time, self.return_time, default_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_window_defaults_to_two_hours() {
        let w = TimeWindow::from_times(t(9, 0), None, Duration::minutes(120));
        assert_eq!(w.start_minute, 540);
        assert_eq!(w.end_minute, 660);
        assert_eq!(w.to_string(), "09:00-11:00");
    }

    #[test]
    fn test_return_before_pickup_uses_default() {
        let w = TimeWindow::from_times(t(9, 0), Some(t(8, 0)), Duration::minutes(120));
        assert_eq!(w.end_minute, 660);
    }

    #[test]
    fn test_touching_windows_do_not_overlap() {
        let d = Duration::minutes(120);
        let a = TimeWindow::from_times(t(9, 0), Some(t(10, 0)), d);
        let b = TimeWindow::from_times(t(10, 0), Some(t(11, 0)), d);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));

        let c = TimeWindow::from_times(t(9, 30), Some(t(10, 30)), d);
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Cancelled".parse::<TripStatus>(), Ok(TripStatus::Cancelled));
        assert_eq!("canceled".parse::<TripStatus>(), Ok(TripStatus::Cancelled));
        assert!("lost".parse::<TripStatus>().is_err());
        assert!(TripStatus::Scheduled.occupies_schedule());
        assert!(!TripStatus::Completed.occupies_schedule());
    }
}
