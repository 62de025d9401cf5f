use thiserror::Error;

use super::entity::BookingStatus;

/// Failures surfaced unchanged to the caller. Unrecognized priorities and
/// unparseable slot times are deliberately NOT here; admission normalizes
/// or ignores them instead of failing.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("equipment not found: {0}")]
    EquipmentNotFound(String),

    #[error("{name} is under maintenance and cannot be booked")]
    EquipmentUnderMaintenance { name: String },

    #[error("booking slot cannot be in the past: {0}")]
    SlotInPast(String),

    #[error("booking not found: {0}")]
    BookingNotFound(String),

    #[error("booking cannot move from {} to {}", .from.as_str(), .to.as_str())]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
