//! Priority triage queue for shared diagnostic equipment.
//!
//! Bookings are admitted as PENDING, confirmed with a priority by an
//! administrator, and served per equipment in priority-then-FIFO order.
//! [`api::service::QueueService::call_next`] assigns the head of the queue
//! and hands the assignment to the [`release::ReleaseScheduler`], which frees
//! the equipment after a configured service window unless it was released
//! manually first.
//!
//! Transport is not this crate's concern: a request-handling layer binds
//! against [`api::service::QueueService`] with either the Postgres or the
//! in-memory repositories.

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod release;
