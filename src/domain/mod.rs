// Queue policy and entities:
// - Which booking is served next, based on assigned priority and submission time.
// - Equipment and booking state machines with their legal transitions.

// Equipment and bookings live in the database behind a repository contract.

pub mod entity;
pub mod error;
pub mod ordering;
pub mod repository;
