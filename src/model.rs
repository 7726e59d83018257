use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Room identifiers come from a fixed catalog ("meet1", "auditorio", ...).
pub type RoomId = String;

/// Half-open wall-clock interval `[start, end)`.
///
/// Times are local wall clock with no timezone normalization.
/// `start < end` is a validation concern, not a construction one:
/// ill-formed candidates must reach the validator so they can be rejected
/// with a reason instead of panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Slot {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Slot) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t < self.end
    }
}

/// A permitted `(start_hour, end_hour)` pair for shape-constrained rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotShape {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl SlotShape {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        Self { start_hour, end_hour }
    }

    /// The concrete slot this shape describes on the given day, or `None`
    /// when an hour is out of clock range (>= 24).
    pub fn on(&self, date: NaiveDate) -> Option<Slot> {
        let start = NaiveTime::from_hms_opt(self.start_hour, 0, 0)?;
        let end = NaiveTime::from_hms_opt(self.end_hour, 0, 0)?;
        Some(Slot::new(date.and_time(start), date.and_time(end)))
    }

    /// Exact match: the slot starts and ends on these hours sharp, same day.
    /// A shape with out-of-range hours matches nothing.
    pub fn matches(&self, slot: &Slot) -> bool {
        slot.start.date() == slot.end.date()
            && self.on(slot.start.date()).is_some_and(|s| *slot == s)
    }
}

/// A committed reservation. Never mutated in place for time/room fields;
/// cancellation removes it from the room's set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Ulid,
    pub room_id: RoomId,
    pub title: String,
    pub slot: Slot,
    pub owner_id: String,
    pub customer_id: Option<String>,
}

/// A reservation candidate: no identity until validation accepts and the
/// engine commits it. A rejected proposal is simply dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub room_id: RoomId,
    pub title: String,
    pub slot: Slot,
    pub owner_id: String,
    pub customer_id: Option<String>,
}

impl Proposal {
    pub fn new(
        room_id: impl Into<RoomId>,
        title: impl Into<String>,
        slot: Slot,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            room_id: room_id.into(),
            title: title.into(),
            slot,
            owner_id: owner_id.into(),
            customer_id: None,
        }
    }

    pub fn for_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub(crate) fn into_reservation(self, id: Ulid) -> Reservation {
        Reservation {
            id,
            room_id: self.room_id,
            title: self.title,
            slot: self.slot,
            owner_id: self.owner_id,
            customer_id: self.customer_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RoomState {
    pub id: RoomId,
    pub name: String,
    /// Permitted slot shapes; `None` means free-form booking.
    pub shapes: Option<Vec<SlotShape>>,
    /// Bumped on every mutation so collaborators can detect stale snapshots.
    pub version: u64,
    /// Committed reservations, sorted by `slot.start`.
    pub reservations: Vec<Reservation>,
}

impl RoomState {
    pub fn new(id: RoomId, name: String, shapes: Option<Vec<SlotShape>>) -> Self {
        Self {
            id,
            name,
            shapes,
            version: 0,
            reservations: Vec::new(),
        }
    }

    pub fn is_shape_constrained(&self) -> bool {
        self.shapes.is_some()
    }

    /// Insert maintaining sort order by slot.start.
    pub fn insert_reservation(&mut self, reservation: Reservation) {
        let pos = self
            .reservations
            .binary_search_by_key(&reservation.slot.start, |r| r.slot.start)
            .unwrap_or_else(|e| e);
        self.reservations.insert(pos, reservation);
        self.version += 1;
    }

    /// Remove by id. Bumps the version only on a hit.
    pub fn remove_reservation(&mut self, id: Ulid) -> Option<Reservation> {
        if let Some(pos) = self.reservations.iter().position(|r| r.id == id) {
            self.version += 1;
            Some(self.reservations.remove(pos))
        } else {
            None
        }
    }

    pub fn set_profile(&mut self, name: String, shapes: Option<Vec<SlotShape>>) {
        self.name = name;
        self.shapes = shapes;
        self.version += 1;
    }

    /// Only reservations whose slot overlaps the query window.
    /// Uses binary search to skip reservations starting at or after `query.end`.
    pub fn overlapping(&self, query: &Slot) -> impl Iterator<Item = &Reservation> {
        // Everything at index >= right_bound starts at or after query.end → can't overlap.
        let right_bound = self
            .reservations
            .partition_point(|r| r.slot.start < query.end);
        self.reservations[..right_bound]
            .iter()
            .filter(move |r| r.slot.end > query.start)
    }
}

/// Change feed record, broadcast per room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    RoomCreated {
        id: RoomId,
        name: String,
        shapes: Option<Vec<SlotShape>>,
    },
    RoomUpdated {
        id: RoomId,
        name: String,
        shapes: Option<Vec<SlotShape>>,
    },
    RoomDeleted {
        id: RoomId,
    },
    ReservationCommitted {
        reservation: Reservation,
    },
    ReservationCancelled {
        id: Ulid,
        room_id: RoomId,
    },
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub id: RoomId,
    pub name: String,
    pub shapes: Option<Vec<SlotShape>>,
    pub version: u64,
    pub reservations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 12)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn slot(sh: u32, sm: u32, eh: u32, em: u32) -> Slot {
        Slot::new(at(sh, sm), at(eh, em))
    }

    fn reservation(s: Slot) -> Reservation {
        Reservation {
            id: Ulid::new(),
            room_id: "meet1".into(),
            title: "standup".into(),
            slot: s,
            owner_id: "ana".into(),
            customer_id: None,
        }
    }

    #[test]
    fn slot_basics() {
        let s = slot(9, 0, 10, 30);
        assert_eq!(s.duration(), TimeDelta::minutes(90));
        assert!(s.contains_instant(at(9, 0)));
        assert!(s.contains_instant(at(10, 29)));
        assert!(!s.contains_instant(at(10, 30))); // half-open
    }

    #[test]
    fn slot_overlap() {
        let a = slot(9, 0, 10, 0);
        let b = slot(9, 30, 10, 30);
        let c = slot(10, 0, 11, 0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
    }

    #[test]
    fn shape_exact_match() {
        let morning = SlotShape::new(8, 13);
        assert!(morning.matches(&slot(8, 0, 13, 0)));
        assert!(!morning.matches(&slot(8, 30, 13, 0)));
        assert!(!morning.matches(&slot(8, 0, 12, 0)));
    }

    #[test]
    fn shape_with_out_of_range_hours_matches_nothing() {
        let bogus = SlotShape::new(24, 26);
        assert!(bogus.on(NaiveDate::from_ymd_opt(2026, 3, 12).unwrap()).is_none());
        assert!(!bogus.matches(&slot(9, 0, 10, 0)));
    }

    #[test]
    fn shape_rejects_cross_day() {
        let full = SlotShape::new(8, 19);
        let next_day = NaiveDate::from_ymd_opt(2026, 3, 13)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        assert!(!full.matches(&Slot::new(at(8, 0), next_day)));
    }

    #[test]
    fn reservation_ordering() {
        let mut rs = RoomState::new("meet1".into(), "Meeting 1".into(), None);
        rs.insert_reservation(reservation(slot(14, 0, 15, 0)));
        rs.insert_reservation(reservation(slot(9, 0, 10, 0)));
        rs.insert_reservation(reservation(slot(11, 0, 12, 0)));
        assert_eq!(rs.reservations[0].slot.start, at(9, 0));
        assert_eq!(rs.reservations[1].slot.start, at(11, 0));
        assert_eq!(rs.reservations[2].slot.start, at(14, 0));
    }

    #[test]
    fn remove_bumps_version_only_on_hit() {
        let mut rs = RoomState::new("meet1".into(), "Meeting 1".into(), None);
        let r = reservation(slot(9, 0, 10, 0));
        let id = r.id;
        rs.insert_reservation(r);
        assert_eq!(rs.version, 1);
        assert!(rs.remove_reservation(Ulid::new()).is_none());
        assert_eq!(rs.version, 1);
        assert!(rs.remove_reservation(id).is_some());
        assert_eq!(rs.version, 2);
        assert!(rs.reservations.is_empty());
    }

    #[test]
    fn overlapping_prunes_by_start() {
        let mut rs = RoomState::new("meet1".into(), "Meeting 1".into(), None);
        rs.insert_reservation(reservation(slot(8, 0, 9, 0)));
        rs.insert_reservation(reservation(slot(10, 0, 11, 0)));
        rs.insert_reservation(reservation(slot(15, 0, 16, 0)));

        let hits: Vec<_> = rs.overlapping(&slot(10, 30, 12, 0)).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slot, slot(10, 0, 11, 0));
    }

    #[test]
    fn overlapping_adjacent_not_included() {
        // A reservation ending exactly at query.start is NOT overlapping (half-open)
        let mut rs = RoomState::new("meet1".into(), "Meeting 1".into(), None);
        rs.insert_reservation(reservation(slot(9, 0, 10, 0)));
        let hits: Vec<_> = rs.overlapping(&slot(10, 0, 11, 0)).collect();
        assert!(hits.is_empty());
    }

    #[test]
    fn overlapping_empty_room() {
        let rs = RoomState::new("meet1".into(), "Meeting 1".into(), None);
        assert!(rs.overlapping(&slot(8, 0, 19, 0)).next().is_none());
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = Event::ReservationCommitted {
            reservation: reservation(slot(9, 0, 10, 0)),
        };
        let json = serde_json::to_string(&event).unwrap();
        let decoded: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, decoded);
    }
}
