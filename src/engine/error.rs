use ulid::Ulid;

use crate::model::RoomId;

/// Why the validator refused a proposal. Returned as a value, not raised:
/// callers surface a precise user-facing message per kind and never retry
/// or auto-correct on the engine's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Span outside the 08:00–19:00 same-day window, or start >= end.
    OutsideBusinessHours,
    /// Shape-constrained room booked with a disallowed start/end pair.
    InvalidSlotShape,
    /// A committed reservation on the same room occupies part of the span.
    Overlap { with: Ulid },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::OutsideBusinessHours => {
                write!(f, "outside business hours (08:00-19:00, same day)")
            }
            RejectReason::InvalidSlotShape => {
                write!(f, "slot does not match any permitted shape for this room")
            }
            RejectReason::Overlap { with } => {
                write!(f, "overlaps committed reservation {with}")
            }
        }
    }
}

#[derive(Debug)]
pub enum EngineError {
    UnknownRoom(RoomId),
    RoomExists(RoomId),
    RoomInUse(RoomId),
    NotFound(Ulid),
    Rejected(RejectReason),
    InvalidShapePolicy(&'static str),
    MissingField(&'static str),
    LimitExceeded(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::UnknownRoom(id) => write!(f, "unknown room: {id}"),
            EngineError::RoomExists(id) => write!(f, "room already exists: {id}"),
            EngineError::RoomInUse(id) => {
                write!(f, "cannot delete room {id}: committed reservations exist")
            }
            EngineError::NotFound(id) => write!(f, "reservation not found: {id}"),
            EngineError::Rejected(reason) => write!(f, "rejected: {reason}"),
            EngineError::InvalidShapePolicy(msg) => write!(f, "invalid shape policy: {msg}"),
            EngineError::MissingField(field) => write!(f, "missing field: {field}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<RejectReason> for EngineError {
    fn from(reason: RejectReason) -> Self {
        EngineError::Rejected(reason)
    }
}
