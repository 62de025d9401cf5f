//! In-memory repositories, the durable store's test-and-demo sibling.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;

use crate::domain::{
    entity::{Booking, BookingStatus, Equipment},
    repository::{BookingRepository, EquipmentRepository},
};

#[derive(Clone, Debug, Default)]
pub struct InMemoryEquipmentRepository {
    rows: Arc<Mutex<HashMap<String, Equipment>>>,
}

impl InMemoryEquipmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl EquipmentRepository for InMemoryEquipmentRepository {
    async fn load(&self, id: &str) -> Result<Option<Equipment>> {
        Ok(self.rows.lock().await.get(id).cloned())
    }

    async fn load_all(&self) -> Result<Vec<Equipment>> {
        Ok(self.rows.lock().await.values().cloned().collect())
    }

    async fn store(&self, equipment: &Equipment) -> Result<()> {
        self.rows
            .lock()
            .await
            .insert(equipment.id.clone(), equipment.clone());
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryBookingRepository {
    rows: Arc<Mutex<HashMap<String, Booking>>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn load(&self, id: &str) -> Result<Option<Booking>> {
        Ok(self.rows.lock().await.get(id).cloned())
    }

    async fn store(&self, booking: &Booking) -> Result<()> {
        self.rows
            .lock()
            .await
            .insert(booking.id.clone(), booking.clone());
        Ok(())
    }

    async fn find_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>> {
        Ok(self
            .rows
            .lock()
            .await
            .values()
            .filter(|b| b.status == status)
            .cloned()
            .collect())
    }

    async fn find_by_equipment_and_status(
        &self,
        equipment_id: &str,
        status: BookingStatus,
    ) -> Result<Vec<Booking>> {
        Ok(self
            .rows
            .lock()
            .await
            .values()
            .filter(|b| b.equipment_id == equipment_id && b.status == status)
            .cloned()
            .collect())
    }
}
