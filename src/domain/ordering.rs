use super::entity::Booking;

/// Service order for one equipment queue: highest priority first, earliest
/// submission first within a priority band.
pub fn sort_queue(mut bookings: Vec<Booking>) -> Vec<Booking> {
    bookings.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.submitted_at.cmp(&b.submitted_at))
    });
    bookings
}
