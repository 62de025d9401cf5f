use anyhow::Result;

use super::entity::{Booking, BookingStatus, Equipment};

#[async_trait::async_trait]
pub trait EquipmentRepository: Clone + Send + Sync {
    async fn load(&self, id: &str) -> Result<Option<Equipment>>;

    async fn load_all(&self) -> Result<Vec<Equipment>>;

    async fn store(&self, equipment: &Equipment) -> Result<()>;
}

#[async_trait::async_trait]
pub trait BookingRepository: Clone + Send + Sync {
    async fn load(&self, id: &str) -> Result<Option<Booking>>;

    async fn store(&self, booking: &Booking) -> Result<()>;

    async fn find_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>>;

    async fn find_by_equipment_and_status(
        &self,
        equipment_id: &str,
        status: BookingStatus,
    ) -> Result<Vec<Booking>>;
}
