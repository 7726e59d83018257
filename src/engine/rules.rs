use chrono::NaiveTime;

use crate::model::{RoomState, Slot, SlotShape};

use super::error::RejectReason;
use ulid::Ulid;

/// Doors open at 08:00 and close at 19:00, wall clock.
pub const OPEN_HOUR: u32 = 8;
pub const CLOSE_HOUR: u32 = 19;

pub(crate) fn open_time() -> NaiveTime {
    NaiveTime::from_hms_opt(OPEN_HOUR, 0, 0).expect("static hh:mm")
}

pub(crate) fn close_time() -> NaiveTime {
    NaiveTime::from_hms_opt(CLOSE_HOUR, 0, 0).expect("static hh:mm")
}

/// A slot lies within operating hours iff it is well-formed (start < end),
/// stays inside one calendar day, starts at or after 08:00 and ends at or
/// before 19:00. The close bound is full precision: 19:00:00 sharp passes,
/// anything later the same day fails.
pub fn within_business_hours(slot: &Slot) -> bool {
    slot.start < slot.end
        && slot.start.date() == slot.end.date()
        && slot.start.time() >= open_time()
        && slot.end.time() <= close_time()
}

/// Shape rule: the slot must equal one of the permitted shapes exactly.
pub fn matches_shape(slot: &Slot, shapes: &[SlotShape]) -> bool {
    shapes.iter().any(|shape| shape.matches(slot))
}

/// Overlap rule, half-open semantics: a reservation ending exactly when the
/// candidate starts does not conflict. Different rooms never conflict; the
/// check runs against a single room's state. Returns the first conflicting id.
pub fn find_conflict(rs: &RoomState, slot: &Slot) -> Option<Ulid> {
    rs.overlapping(slot).next().map(|r| r.id)
}

/// The validator: business hours, then slot shape (if the room is
/// shape-constrained), then overlap, short-circuiting at the first failure.
/// Pure function of the room snapshot and the candidate, so re-validating
/// the same candidate against the same state always yields the same result.
pub fn validate(rs: &RoomState, candidate: &Slot) -> Result<(), RejectReason> {
    if !within_business_hours(candidate) {
        return Err(RejectReason::OutsideBusinessHours);
    }
    if let Some(shapes) = &rs.shapes
        && !matches_shape(candidate, shapes)
    {
        return Err(RejectReason::InvalidSlotShape);
    }
    if let Some(with) = find_conflict(rs, candidate) {
        return Err(RejectReason::Overlap { with });
    }
    Ok(())
}
