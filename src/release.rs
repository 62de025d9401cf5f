//! Deferred release of equipment after a service window.
//!
//! `call_next` hands each assignment to this scheduler, which flips the
//! equipment and booking back to their idle states once the window elapses,
//! unless a manual serve got there first.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::domain::entity::{BookingStatus, EquipmentStatus};
use crate::domain::repository::{BookingRepository, EquipmentRepository};

/// Timing knobs for the release scheduler.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// How long an assignment holds the equipment before auto-release. Shared
    /// by all equipment, independent of the per-equipment procedure duration.
    pub window: Duration,
    /// How long shutdown waits for outstanding releases before discarding
    /// them.
    pub grace: Duration,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(8),
            grace: Duration::from_secs(5),
        }
    }
}

#[derive(Debug)]
struct Inner {
    accepting: bool,
    tasks: Vec<JoinHandle<()>>,
}

/// One-shot release tasks, one per (equipment, booking) assignment.
///
/// Owned by whoever wires the service. [`ReleaseScheduler::shutdown`] stops
/// admission of new tasks, then drains the outstanding ones within the grace
/// period; whatever has not fired by then is discarded.
#[derive(Clone, Debug)]
pub struct ReleaseScheduler<ER, BR>
where
    ER: EquipmentRepository,
    BR: BookingRepository,
{
    equipment: ER,
    bookings: BR,
    config: ReleaseConfig,
    discard: CancellationToken,
    inner: Arc<Mutex<Inner>>,
}

impl<ER, BR> ReleaseScheduler<ER, BR>
where
    ER: EquipmentRepository + 'static,
    BR: BookingRepository + 'static,
{
    pub fn new(equipment: ER, bookings: BR, config: ReleaseConfig) -> Self {
        Self {
            equipment,
            bookings,
            config,
            discard: CancellationToken::new(),
            inner: Arc::new(Mutex::new(Inner {
                accepting: true,
                tasks: Vec::new(),
            })),
        }
    }

    /// Queue one release for the assignment, due after the service window.
    /// Not cancelable by the caller; a manual serve in the interim makes the
    /// fired task a no-op via its status guards.
    pub async fn schedule_release(&self, equipment_id: String, booking_id: String) {
        let mut inner = self.inner.lock().await;
        if !inner.accepting {
            warn!(
                equipment_id = %equipment_id,
                booking_id = %booking_id,
                "release scheduler is shut down; dropping task"
            );
            return;
        }
        inner.tasks.retain(|task| !task.is_finished());

        let equipment = self.equipment.clone();
        let bookings = self.bookings.clone();
        let window = self.config.window;
        let discard = self.discard.clone();
        inner.tasks.push(tokio::spawn(async move {
            tokio::select! {
                _ = discard.cancelled() => return,
                _ = tokio::time::sleep(window) => {}
            }
            if let Err(err) = release(&equipment, &bookings, &equipment_id, &booking_id).await {
                error!(
                    error = ?err,
                    equipment_id = %equipment_id,
                    booking_id = %booking_id,
                    "deferred release failed"
                );
            }
        }));
    }

    /// Stop accepting tasks, then wait at most the grace period for the
    /// outstanding ones before discarding the rest.
    pub async fn shutdown(&self) {
        let tasks = {
            let mut inner = self.inner.lock().await;
            inner.accepting = false;
            std::mem::take(&mut inner.tasks)
        };
        if tasks.is_empty() {
            return;
        }

        info!(outstanding = tasks.len(), "release scheduler draining");
        if tokio::time::timeout(self.config.grace, join_all(tasks))
            .await
            .is_err()
        {
            self.discard.cancel();
            warn!("release scheduler grace period elapsed; discarding pending releases");
        }
    }
}

/// The guarded revert. Each flip only happens if the record is still
/// IN_SERVICE at firing time, so a release that lost the race against a
/// manual serve touches nothing.
async fn release<ER, BR>(
    equipment: &ER,
    bookings: &BR,
    equipment_id: &str,
    booking_id: &str,
) -> Result<()>
where
    ER: EquipmentRepository,
    BR: BookingRepository,
{
    if let Some(mut eq) = equipment.load(equipment_id).await? {
        if eq.status == EquipmentStatus::InService {
            eq.status = EquipmentStatus::Available;
            equipment.store(&eq).await?;
            info!(name = %eq.name, "equipment available again after service window");
        }
    }

    if let Some(mut booking) = bookings.load(booking_id).await? {
        if booking.status == BookingStatus::InService {
            booking.advance_to(BookingStatus::Served)?;
            bookings.store(&booking).await?;
            info!(patient = %booking.patient_name, "patient served by auto-release");
        }
    }

    Ok(())
}
