use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, FromRow, PgPool, Row};

use crate::domain::{
    entity::{Booking, BookingStatus, Equipment, EquipmentStatus, Priority},
    repository::{BookingRepository, EquipmentRepository},
};

#[derive(Clone, Debug)]
pub struct PgEquipmentRepository {
    pool: PgPool,
}

impl PgEquipmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EquipmentRepository for PgEquipmentRepository {
    async fn load(&self, id: &str) -> Result<Option<Equipment>> {
        let equipment: Option<Equipment> =
            sqlx::query_as("SELECT * FROM hospital.equipment WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .context("EquipmentRepository::load")?;

        Ok(equipment)
    }

    async fn load_all(&self) -> Result<Vec<Equipment>> {
        let equipment: Vec<Equipment> = sqlx::query_as("SELECT * FROM hospital.equipment")
            .fetch_all(&self.pool)
            .await
            .context("EquipmentRepository::load_all")?;

        Ok(equipment)
    }

    async fn store(&self, equipment: &Equipment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO hospital.equipment (id, name, category, status, service_duration_mins)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = $2,
                category = $3,
                status = $4,
                service_duration_mins = $5
            "#,
        )
        .bind(&equipment.id)
        .bind(&equipment.name)
        .bind(&equipment.category)
        .bind(equipment.status.as_str())
        .bind(equipment.service_duration_mins)
        .execute(&self.pool)
        .await
        .context("EquipmentRepository::store")?;

        Ok(())
    }
}

impl FromRow<'_, PgRow> for Equipment {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let category: String = row.try_get("category")?;
        let status: String = row.try_get("status")?;
        let service_duration_mins: i32 = row.try_get("service_duration_mins")?;

        let status = EquipmentStatus::parse(&status).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".into(),
            source: format!("unknown equipment status: {status}").into(),
        })?;

        Ok(Self {
            id,
            name,
            category,
            status,
            service_duration_mins,
        })
    }
}

#[derive(Clone, Debug)]
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl BookingRepository for PgBookingRepository {
    async fn load(&self, id: &str) -> Result<Option<Booking>> {
        let booking: Option<Booking> =
            sqlx::query_as("SELECT * FROM hospital.bookings WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .context("BookingRepository::load")?;

        Ok(booking)
    }

    async fn store(&self, booking: &Booking) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO hospital.bookings (id, patient_name, equipment_id, priority, slot_time, status, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                patient_name = $2,
                equipment_id = $3,
                priority = $4,
                slot_time = $5,
                status = $6,
                submitted_at = $7
            "#,
        )
        .bind(&booking.id)
        .bind(&booking.patient_name)
        .bind(&booking.equipment_id)
        .bind(booking.priority.as_str())
        .bind(&booking.slot_time)
        .bind(booking.status.as_str())
        .bind(booking.submitted_at)
        .execute(&self.pool)
        .await
        .context("BookingRepository::store")?;

        Ok(())
    }

    async fn find_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>> {
        let bookings: Vec<Booking> =
            sqlx::query_as("SELECT * FROM hospital.bookings WHERE status = $1")
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
                .context("BookingRepository::find_by_status")?;

        Ok(bookings)
    }

    async fn find_by_equipment_and_status(
        &self,
        equipment_id: &str,
        status: BookingStatus,
    ) -> Result<Vec<Booking>> {
        let bookings: Vec<Booking> = sqlx::query_as(
            "SELECT * FROM hospital.bookings WHERE equipment_id = $1 AND status = $2",
        )
        .bind(equipment_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .context("BookingRepository::find_by_equipment_and_status")?;

        Ok(bookings)
    }
}

impl FromRow<'_, PgRow> for Booking {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let patient_name: String = row.try_get("patient_name")?;
        let equipment_id: String = row.try_get("equipment_id")?;
        let priority: String = row.try_get("priority")?;
        let slot_time: Option<String> = row.try_get("slot_time")?;
        let status: String = row.try_get("status")?;
        let submitted_at: DateTime<Utc> = row.try_get("submitted_at")?;

        let priority = Priority::parse(&priority).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "priority".into(),
            source: format!("unknown priority: {priority}").into(),
        })?;
        let status = BookingStatus::parse(&status).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "status".into(),
            source: format!("unknown booking status: {status}").into(),
        })?;

        Ok(Self {
            id,
            patient_name,
            equipment_id,
            priority,
            slot_time,
            status,
            submitted_at,
        })
    }
}
