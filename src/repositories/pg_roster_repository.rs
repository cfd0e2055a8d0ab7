//! Repositorio PostgreSQL
//!
//! Implementación de `RosterRepository` con SQLx. Todas las consultas
//! filtran por `tenant_id`.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use super::RosterRepository;
use crate::models::{Certification, CustomerSnapshot, DriverSnapshot, TripSnapshot, TripStatus, VehicleSnapshot};
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct DriverRow {
    id: Uuid,
    full_name: String,
    is_active: bool,
    license_expiry: Option<NaiveDate>,
    usual_vehicle_id: Option<Uuid>,
}

#[derive(Debug, sqlx::FromRow)]
struct CertificationRow {
    driver_id: Uuid,
    name: String,
    expires_on: NaiveDate,
}

#[derive(Debug, sqlx::FromRow)]
struct VehicleRow {
    id: Uuid,
    registration: String,
    is_active: bool,
    mot_expiry: Option<NaiveDate>,
    insurance_expiry: Option<NaiveDate>,
    wheelchair_accessible: bool,
    seating_capacity: Option<i32>,
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    full_name: String,
    mobility_requirements: Option<String>,
    wheelchair_user: bool,
    preferred_driver_id: Option<Uuid>,
    blocked_driver_ids: Vec<Uuid>,
}

#[derive(Debug, sqlx::FromRow)]
struct TripRow {
    id: Uuid,
    tenant_id: Uuid,
    trip_date: NaiveDate,
    pickup_time: Option<NaiveTime>,
    return_time: Option<NaiveTime>,
    driver_id: Option<Uuid>,
    vehicle_id: Option<Uuid>,
    customer_id: Uuid,
    customer_name: Option<String>,
    requires_wheelchair: bool,
    passenger_count: Option<i32>,
    status: String,
    version: i32,
}

impl DriverRow {
    fn into_snapshot(self, certifications: Vec<Certification>) -> DriverSnapshot {
        DriverSnapshot {
            id: self.id,
            name: self.full_name,
            is_active: self.is_active,
            license_expiry: self.license_expiry,
            certifications,
            usual_vehicle_id: self.usual_vehicle_id,
        }
    }
}

impl From<VehicleRow> for VehicleSnapshot {
    fn from(row: VehicleRow) -> Self {
        Self {
            id: row.id,
            registration: row.registration,
            is_active: row.is_active,
            mot_expiry: row.mot_expiry,
            insurance_expiry: row.insurance_expiry,
            wheelchair_accessible: row.wheelchair_accessible,
            seating_capacity: row.seating_capacity.and_then(|c| u32::try_from(c).ok()),
        }
    }
}

impl From<CustomerRow> for CustomerSnapshot {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            name: row.full_name,
            mobility_requirements: row.mobility_requirements,
            wheelchair_user: row.wheelchair_user,
            preferred_driver_id: row.preferred_driver_id,
            blocked_driver_ids: row.blocked_driver_ids,
        }
    }
}

impl TryFrom<TripRow> for TripSnapshot {
    type Error = AppError;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<TripStatus>()
            .map_err(|e| AppError::Internal(format!("trip {}: {}", row.id, e)))?;

        Ok(Self {
            id: row.id,
            tenant_id: row.tenant_id,
            trip_date: row.trip_date,
            pickup_time: row.pickup_time,
            return_time: row.return_time,
            driver_id: row.driver_id,
            vehicle_id: row.vehicle_id,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            requires_wheelchair: row.requires_wheelchair,
            passenger_count: row.passenger_count.and_then(|c| u32::try_from(c).ok()),
            status,
            version: row.version,
        })
    }
}

const TRIP_COLUMNS: &str = r#"
    t.id, t.tenant_id, t.trip_date, t.pickup_time, t.return_time,
    t.driver_id, t.vehicle_id, t.customer_id, c.full_name AS customer_name,
    t.requires_wheelchair, t.passenger_count, t.status, t.version
"#;

pub struct PgRosterRepository {
    pool: PgPool,
}

impl PgRosterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn trip_query(filter: &str) -> String {
        format!(
            "SELECT {} FROM trips t LEFT JOIN customers c ON c.id = t.customer_id AND c.tenant_id = t.tenant_id \
             WHERE t.tenant_id = $1 AND {} \
             ORDER BY t.trip_date, t.pickup_time NULLS LAST, t.id",
            TRIP_COLUMNS, filter
        )
    }

    fn into_trips(rows: Vec<TripRow>) -> AppResult<Vec<TripSnapshot>> {
        rows.into_iter().map(TripSnapshot::try_from).collect()
    }

    async fn certifications_for(&self, tenant_id: Uuid, driver_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<Certification>>> {
        let rows = sqlx::query_as::<_, CertificationRow>(
            r#"
            SELECT driver_id, name, expires_on
            FROM driver_certifications
            WHERE tenant_id = $1 AND driver_id = ANY($2)
            ORDER BY driver_id, name
            "#,
        )
        .bind(tenant_id)
        .bind(driver_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_driver: HashMap<Uuid, Vec<Certification>> = HashMap::new();
        for row in rows {
            by_driver.entry(row.driver_id).or_default().push(Certification {
                name: row.name,
                expires_on: row.expires_on,
            });
        }
        Ok(by_driver)
    }
}

#[async_trait]
impl RosterRepository for PgRosterRepository {
    async fn find_driver(&self, tenant_id: Uuid, driver_id: Uuid) -> AppResult<Option<DriverSnapshot>> {
        let row = sqlx::query_as::<_, DriverRow>(
            r#"
            SELECT id, full_name, is_active, license_expiry, usual_vehicle_id
            FROM drivers
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(driver_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut certifications = self.certifications_for(tenant_id, &[row.id]).await?;
        let certs = certifications.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_snapshot(certs)))
    }

    async fn find_vehicle(&self, tenant_id: Uuid, vehicle_id: Uuid) -> AppResult<Option<VehicleSnapshot>> {
        let row = sqlx::query_as::<_, VehicleRow>(
            r#"
            SELECT id, registration, is_active, mot_expiry, insurance_expiry,
                   wheelchair_accessible, seating_capacity
            FROM vehicles
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(VehicleSnapshot::from))
    }

    async fn find_customer(&self, tenant_id: Uuid, customer_id: Uuid) -> AppResult<Option<CustomerSnapshot>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT id, full_name, mobility_requirements, wheelchair_user,
                   preferred_driver_id, blocked_driver_ids
            FROM customers
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CustomerSnapshot::from))
    }

    async fn list_drivers(&self, tenant_id: Uuid) -> AppResult<Vec<DriverSnapshot>> {
        let rows = sqlx::query_as::<_, DriverRow>(
            r#"
            SELECT id, full_name, is_active, license_expiry, usual_vehicle_id
            FROM drivers
            WHERE tenant_id = $1
            ORDER BY full_name, id
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut certifications = self.certifications_for(tenant_id, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let certs = certifications.remove(&row.id).unwrap_or_default();
                row.into_snapshot(certs)
            })
            .collect())
    }

    async fn find_trip(&self, tenant_id: Uuid, trip_id: Uuid) -> AppResult<Option<TripSnapshot>> {
        let row = sqlx::query_as::<_, TripRow>(&Self::trip_query("t.id = $2"))
            .bind(tenant_id)
            .bind(trip_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TripSnapshot::try_from).transpose()
    }

    async fn trips_for_driver(&self, tenant_id: Uuid, driver_id: Uuid, date: NaiveDate) -> AppResult<Vec<TripSnapshot>> {
        let rows = sqlx::query_as::<_, TripRow>(&Self::trip_query("t.driver_id = $2 AND t.trip_date = $3"))
            .bind(tenant_id)
            .bind(driver_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        Self::into_trips(rows)
    }

    async fn trips_for_customer(&self, tenant_id: Uuid, customer_id: Uuid, date: NaiveDate) -> AppResult<Vec<TripSnapshot>> {
        let rows = sqlx::query_as::<_, TripRow>(&Self::trip_query("t.customer_id = $2 AND t.trip_date = $3"))
            .bind(tenant_id)
            .bind(customer_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        Self::into_trips(rows)
    }

    async fn trips_on_date(&self, tenant_id: Uuid, date: NaiveDate) -> AppResult<Vec<TripSnapshot>> {
        let rows = sqlx::query_as::<_, TripRow>(&Self::trip_query("t.trip_date = $2"))
            .bind(tenant_id)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        Self::into_trips(rows)
    }

    async fn trips_in_range(&self, tenant_id: Uuid, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<TripSnapshot>> {
        let rows = sqlx::query_as::<_, TripRow>(&Self::trip_query("t.trip_date BETWEEN $2 AND $3"))
            .bind(tenant_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Self::into_trips(rows)
    }

    async fn assign_trip(
        &self,
        tenant_id: Uuid,
        trip_id: Uuid,
        driver_id: Uuid,
        vehicle_id: Option<Uuid>,
        expected_version: i32,
    ) -> AppResult<bool> {
        let updated: Option<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE trips
            SET driver_id = $3,
                vehicle_id = COALESCE($4, vehicle_id),
                version = version + 1
            WHERE tenant_id = $1 AND id = $2 AND version = $5 AND status = 'scheduled'
            RETURNING id
            "#,
        )
        .bind(tenant_id)
        .bind(trip_id)
        .bind(driver_id)
        .bind(vehicle_id)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated.is_some())
    }
}
