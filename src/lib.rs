//! aforo: reservation validation engine for shared bookable rooms.
//!
//! The core is a pure validator (business hours, slot shapes, overlap) over a
//! per-room snapshot of committed reservations; the [`engine::Engine`] wraps it
//! with an injected in-memory store, single-writer commit per room, and change
//! notification. Durable persistence and any user-facing surface are the
//! embedding application's concern.

pub mod engine;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
