use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::QueueError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    Available,
    InService,
    Maintenance,
}

impl EquipmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EquipmentStatus::Available => "AVAILABLE",
            EquipmentStatus::InService => "IN_SERVICE",
            EquipmentStatus::Maintenance => "MAINTENANCE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "AVAILABLE" => Some(EquipmentStatus::Available),
            "IN_SERVICE" => Some(EquipmentStatus::InService),
            "MAINTENANCE" => Some(EquipmentStatus::Maintenance),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InService,
    Served,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::InService => "IN_SERVICE",
            BookingStatus::Served => "SERVED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(BookingStatus::Pending),
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "IN_SERVICE" => Some(BookingStatus::InService),
            "SERVED" => Some(BookingStatus::Served),
            _ => None,
        }
    }

    /// A booking only ever moves forward along
    /// PENDING -> CONFIRMED -> IN_SERVICE -> SERVED.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Confirmed, BookingStatus::InService)
                | (BookingStatus::InService, BookingStatus::Served)
        )
    }
}

/// Triage priority. The service order is defined by [`Priority::rank`], not
/// by declaration order, so adding a level cannot reshuffle existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Normal,
    Emergency,
}

impl Priority {
    /// Higher rank is served first. The gaps leave room for intermediate
    /// levels without renumbering.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Normal => 10,
            Priority::Emergency => 20,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Normal => "NORMAL",
            Priority::Emergency => "EMERGENCY",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "NORMAL" => Some(Priority::Normal),
            "EMERGENCY" => Some(Priority::Emergency),
            _ => None,
        }
    }

    /// Admission-time parse: anything unrecognized is treated as NORMAL
    /// rather than rejected.
    pub fn parse_or_normal(value: &str) -> Self {
        Self::parse(value).unwrap_or(Priority::Normal)
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,

    pub name: String,     // e.g. MRI-1
    pub category: String, // e.g. MRI

    pub status: EquipmentStatus,

    /// Nominal minutes one procedure occupies this equipment. Feeds the
    /// next-slot estimate only; the auto-release window is configured
    /// separately.
    pub service_duration_mins: i32,
}

impl Equipment {
    pub fn new(
        id: String,
        name: String,
        category: String,
        status: EquipmentStatus,
        service_duration_mins: i32,
    ) -> Self {
        Self {
            id,
            name,
            category,
            status,
            service_duration_mins,
        }
    }

    pub fn is_under_maintenance(&self) -> bool {
        self.status == EquipmentStatus::Maintenance
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,

    pub patient_name: String,
    pub equipment_id: String,

    pub priority: Priority,

    /// Requested slot as submitted, e.g. "2026-02-14T10:30". Checked against
    /// the clock at admission when it parses; never used for ordering.
    pub slot_time: Option<String>,

    pub status: BookingStatus,

    /// Server-assigned at admission; the FIFO tie-break inside a priority
    /// band.
    pub submitted_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        patient_name: String,
        equipment_id: String,
        slot_time: Option<String>,
        priority: Priority,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            patient_name,
            equipment_id,
            priority,
            slot_time,
            status: BookingStatus::Pending,
            submitted_at: Utc::now(),
        }
    }

    pub fn advance_to(&mut self, next: BookingStatus) -> Result<(), QueueError> {
        if !self.status.can_transition_to(next) {
            return Err(QueueError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// Accepts the two timestamp shapes the booking form has historically sent,
/// with and without seconds.
pub fn parse_slot_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .ok()
}

/// Estimated time the equipment next frees up, rendered as the fixed strings
/// the booking views expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextSlot {
    Unknown,
    UnderRepair,
    Now,
    At(DateTime<Local>),
}

impl fmt::Display for NextSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextSlot::Unknown => f.write_str("Unknown"),
            NextSlot::UnderRepair => f.write_str("Under Repair"),
            NextSlot::Now => f.write_str("Now"),
            NextSlot::At(at) => write!(f, "{}", at.format("%H:%M")),
        }
    }
}

/// Read model for the dashboard: equipment plus the two fields derived per
/// read and never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct EquipmentView {
    #[serde(flatten)]
    pub equipment: Equipment,
    pub queue_length: usize,
    pub next_available: String,
}
