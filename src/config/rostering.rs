//! Política de asignación
//!
//! Valores de política del motor de conflictos y del optimizador.
//! Son política, no mecanismo: todos se pueden sobreescribir por entorno.

use anyhow::Result;
use chrono::Duration;

use super::environment::env_or;

const MAX_TRIP_MINUTES: i64 = 24 * 60;
const MAX_WARNING_DAYS: i64 = 3650;
const MAX_BALANCE_WINDOW_DAYS: i64 = 366;

/// Umbrales y duraciones usados por las reglas, la carga de trabajo y el optimizador
#[derive(Debug, Clone, PartialEq)]
pub struct RosteringPolicy {
    /// Duración asumida cuando un viaje no tiene hora de regreso
    pub default_trip_minutes: i64,
    /// Días antes del vencimiento de la ITV en que se avisa
    pub mot_warning_days: i64,
    /// Días antes del vencimiento de una certificación en que se avisa
    pub certification_warning_days: i64,
    pub recommended_daily_hours: f64,
    pub max_daily_hours: f64,
    /// Turno completo de referencia para la utilización
    pub reference_shift_hours: f64,
    pub underutilized_percent: f64,
    pub overutilized_percent: f64,
    /// Ventana histórica (días) que pondera el balanceo del optimizador
    pub balance_window_days: i64,
}

impl Default for RosteringPolicy {
    fn default() -> Self {
        Self {
            default_trip_minutes: 120,
            mot_warning_days: 7,
            certification_warning_days: 30,
            recommended_daily_hours: 8.0,
            max_daily_hours: 10.0,
            reference_shift_hours: 8.0,
            underutilized_percent: 50.0,
            overutilized_percent: 90.0,
            balance_window_days: 7,
        }
    }
}

impl RosteringPolicy {
    /// Cargar la política desde variables de entorno `ROSTER_*`
    pub fn from_env() -> Result<Self> {
        let d = Self::default();

        let policy = Self {
            default_trip_minutes: env_or("ROSTER_DEFAULT_TRIP_MINUTES", d.default_trip_minutes)?,
            mot_warning_days: env_or("ROSTER_MOT_WARNING_DAYS", d.mot_warning_days)?,
            certification_warning_days: env_or(
                "ROSTER_CERTIFICATION_WARNING_DAYS",
                d.certification_warning_days,
            )?,
            recommended_daily_hours: env_or("ROSTER_RECOMMENDED_DAILY_HOURS", d.recommended_daily_hours)?,
            max_daily_hours: env_or("ROSTER_MAX_DAILY_HOURS", d.max_daily_hours)?,
            reference_shift_hours: env_or("ROSTER_REFERENCE_SHIFT_HOURS", d.reference_shift_hours)?,
            underutilized_percent: env_or("ROSTER_UNDERUTILIZED_PERCENT", d.underutilized_percent)?,
            overutilized_percent: env_or("ROSTER_OVERUTILIZED_PERCENT", d.overutilized_percent)?,
            balance_window_days: env_or("ROSTER_BALANCE_WINDOW_DAYS", d.balance_window_days)?,
        };

        policy.validate()?;
        Ok(policy)
    }

    /// Rechazar valores fuera de rango al arrancar, no a mitad de un request
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TRIP_MINUTES).contains(&self.default_trip_minutes) {
            anyhow::bail!("ROSTER_DEFAULT_TRIP_MINUTES must be between 1 and {}", MAX_TRIP_MINUTES);
        }
        if !(0..=MAX_WARNING_DAYS).contains(&self.mot_warning_days) {
            anyhow::bail!("ROSTER_MOT_WARNING_DAYS must be between 0 and {}", MAX_WARNING_DAYS);
        }
        if !(0..=MAX_WARNING_DAYS).contains(&self.certification_warning_days) {
            anyhow::bail!("ROSTER_CERTIFICATION_WARNING_DAYS must be between 0 and {}", MAX_WARNING_DAYS);
        }
        if !(1..=MAX_BALANCE_WINDOW_DAYS).contains(&self.balance_window_days) {
            anyhow::bail!("ROSTER_BALANCE_WINDOW_DAYS must be between 1 and {}", MAX_BALANCE_WINDOW_DAYS);
        }
        for (name, hours) in [
            ("ROSTER_RECOMMENDED_DAILY_HOURS", self.recommended_daily_hours),
            ("ROSTER_MAX_DAILY_HOURS", self.max_daily_hours),
            ("ROSTER_REFERENCE_SHIFT_HOURS", self.reference_shift_hours),
        ] {
            if !hours.is_finite() || hours <= 0.0 || hours > 24.0 {
                anyhow::bail!("{} must be greater than 0 and at most 24", name);
            }
        }
        if self.recommended_daily_hours > self.max_daily_hours {
            anyhow::bail!("ROSTER_RECOMMENDED_DAILY_HOURS cannot exceed ROSTER_MAX_DAILY_HOURS");
        }
        for (name, percent) in [
            ("ROSTER_UNDERUTILIZED_PERCENT", self.underutilized_percent),
            ("ROSTER_OVERUTILIZED_PERCENT", self.overutilized_percent),
        ] {
            if !percent.is_finite() || percent < 0.0 {
                anyhow::bail!("{} must be a non-negative number", name);
            }
        }
        if self.underutilized_percent > self.overutilized_percent {
            anyhow::bail!("ROSTER_UNDERUTILIZED_PERCENT cannot exceed ROSTER_OVERUTILIZED_PERCENT");
        }
        Ok(())
    }

    pub fn default_trip_duration(&self) -> Duration {
        Duration::minutes(self.default_trip_minutes.clamp(1, MAX_TRIP_MINUTES))
    }
}
