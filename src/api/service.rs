use std::collections::HashMap;
use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info};

use crate::domain::{
    entity::{
        parse_slot_time, Booking, BookingStatus, EquipmentStatus, EquipmentView, NextSlot,
        Priority,
    },
    error::QueueError,
    ordering,
    repository::{BookingRepository, EquipmentRepository},
};
use crate::release::ReleaseScheduler;

/// Booking fields accepted at admission, before the engine fills in the
/// server-assigned ones.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub patient_name: String,
    pub equipment_id: String,
    pub slot_time: Option<String>,
    pub requested_priority: Option<String>,
}

/// The queue engine. Short read/mutate sequences over the two stores; the
/// only long-lived state is the per-equipment lock registry that serializes
/// `call_next`.
#[derive(Clone, Debug)]
pub struct QueueService<ER, BR>
where
    ER: EquipmentRepository,
    BR: BookingRepository,
{
    equipment: ER,
    bookings: BR,
    release: ReleaseScheduler<ER, BR>,
    call_locks: Arc<tokio::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl<ER, BR> QueueService<ER, BR>
where
    ER: EquipmentRepository + 'static,
    BR: BookingRepository + 'static,
{
    pub fn new(equipment: ER, bookings: BR, release: ReleaseScheduler<ER, BR>) -> Self {
        Self {
            equipment,
            bookings,
            release,
            call_locks: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
        }
    }

    /// Admit a booking as PENDING after validating the target equipment and
    /// the requested slot. An unrecognized priority string normalizes to
    /// NORMAL; a slot we cannot parse is accepted unchecked.
    pub async fn admit(&self, request: BookingRequest) -> Result<Booking, QueueError> {
        let equipment = self
            .equipment
            .load(&request.equipment_id)
            .await?
            .ok_or_else(|| QueueError::EquipmentNotFound(request.equipment_id.clone()))?;

        if equipment.is_under_maintenance() {
            return Err(QueueError::EquipmentUnderMaintenance {
                name: equipment.name,
            });
        }

        if let Some(slot) = request.slot_time.as_deref() {
            if let Some(selected) = parse_slot_time(slot) {
                if selected < Local::now().naive_local() {
                    return Err(QueueError::SlotInPast(slot.to_string()));
                }
            }
        }

        let priority = match request.requested_priority.as_deref() {
            Some(value) => {
                let priority = Priority::parse_or_normal(value);
                if priority.as_str() != value {
                    debug!(requested = %value, "unrecognized priority, admitting as NORMAL");
                }
                priority
            }
            None => Priority::Normal,
        };

        let booking = Booking::new(
            request.patient_name,
            request.equipment_id,
            request.slot_time,
            priority,
        );
        self.bookings.store(&booking).await?;

        info!(
            booking_id = %booking.id,
            equipment_id = %booking.equipment_id,
            priority = %priority.as_str(),
            "booking admitted"
        );
        Ok(booking)
    }

    /// Bookings awaiting an admin priority decision, in no particular order.
    pub async fn list_pending(&self) -> Result<Vec<Booking>, QueueError> {
        Ok(self
            .bookings
            .find_by_status(BookingStatus::Pending)
            .await?)
    }

    /// Assign the final priority and move the booking into the live queue.
    /// Equipment availability is not re-checked here.
    pub async fn confirm(
        &self,
        booking_id: &str,
        priority: Priority,
    ) -> Result<Booking, QueueError> {
        let mut booking = self
            .bookings
            .load(booking_id)
            .await?
            .ok_or_else(|| QueueError::BookingNotFound(booking_id.to_string()))?;

        booking.priority = priority;
        booking.advance_to(BookingStatus::Confirmed)?;
        self.bookings.store(&booking).await?;

        info!(
            booking_id = %booking.id,
            priority = %priority.as_str(),
            "booking confirmed"
        );
        Ok(booking)
    }

    /// The live queue for one equipment, derived fresh from store state on
    /// every call.
    pub async fn queue_for(&self, equipment_id: &str) -> Result<Vec<Booking>, QueueError> {
        let confirmed = self
            .bookings
            .find_by_equipment_and_status(equipment_id, BookingStatus::Confirmed)
            .await?;
        Ok(ordering::sort_queue(confirmed))
    }

    /// Take the head of the queue into service and schedule its deferred
    /// release. An empty queue is an explicit `None`, not an error.
    pub async fn call_next(&self, equipment_id: &str) -> Result<Option<Booking>, QueueError> {
        // Serialize per equipment so two callers cannot pick the same head.
        let lock = self.call_lock(equipment_id).await;
        let _guard = lock.lock().await;

        let queue = self.queue_for(equipment_id).await?;
        let Some(mut next) = queue.into_iter().next() else {
            return Ok(None);
        };

        let mut equipment = self
            .equipment
            .load(equipment_id)
            .await?
            .ok_or_else(|| QueueError::EquipmentNotFound(equipment_id.to_string()))?;
        equipment.status = EquipmentStatus::InService;
        self.equipment.store(&equipment).await?;

        next.advance_to(BookingStatus::InService)?;
        self.bookings.store(&next).await?;

        self.release
            .schedule_release(equipment_id.to_string(), next.id.clone())
            .await;

        info!(
            booking_id = %next.id,
            patient = %next.patient_name,
            equipment = %equipment.name,
            "patient called to equipment"
        );
        Ok(Some(next))
    }

    /// Manual completion: the booking goes terminal and its equipment frees
    /// up immediately. The deferred release for the pair then finds nothing
    /// left to do.
    pub async fn mark_served(&self, booking_id: &str) -> Result<(), QueueError> {
        let mut booking = self
            .bookings
            .load(booking_id)
            .await?
            .ok_or_else(|| QueueError::BookingNotFound(booking_id.to_string()))?;

        booking.advance_to(BookingStatus::Served)?;
        self.bookings.store(&booking).await?;

        if let Some(mut equipment) = self.equipment.load(&booking.equipment_id).await? {
            equipment.status = EquipmentStatus::Available;
            self.equipment.store(&equipment).await?;
        }

        info!(booking_id = %booking.id, "booking marked served");
        Ok(())
    }

    /// Pure read. Missing equipment yields the `Unknown` sentinel rather
    /// than an error.
    pub async fn estimate_next_slot(&self, equipment_id: &str) -> Result<NextSlot, QueueError> {
        let Some(equipment) = self.equipment.load(equipment_id).await? else {
            return Ok(NextSlot::Unknown);
        };
        if equipment.is_under_maintenance() {
            return Ok(NextSlot::UnderRepair);
        }

        let queue = self.queue_for(equipment_id).await?;
        if queue.is_empty() {
            return Ok(NextSlot::Now);
        }

        let wait =
            chrono::Duration::minutes(queue.len() as i64 * i64::from(equipment.service_duration_mins));
        Ok(NextSlot::At(Local::now() + wait))
    }

    /// Every equipment row decorated with its derived queue length and
    /// next-slot estimate.
    pub async fn list_equipment(&self) -> Result<Vec<EquipmentView>, QueueError> {
        let all = self.equipment.load_all().await?;

        let mut views = Vec::with_capacity(all.len());
        for equipment in all {
            let queue_length = self.queue_for(&equipment.id).await?.len();
            let next_available = self.estimate_next_slot(&equipment.id).await?.to_string();
            views.push(EquipmentView {
                equipment,
                queue_length,
                next_available,
            });
        }
        Ok(views)
    }

    async fn call_lock(&self, equipment_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.call_locks.lock().await;
        locks
            .entry(equipment_id.to_string())
            .or_default()
            .clone()
    }
}
