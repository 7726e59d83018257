use chrono::NaiveDate;

use crate::model::{RoomState, Slot};

use super::rules::{close_time, open_time};

// ── Free-slot algebra ─────────────────────────────────────────────

/// The bookable window for one calendar day: 08:00–19:00.
pub fn day_window(date: NaiveDate) -> Slot {
    Slot::new(date.and_time(open_time()), date.and_time(close_time()))
}

/// Merge sorted overlapping/adjacent slots into disjoint slots.
pub fn merge_overlapping(sorted: &[Slot]) -> Vec<Slot> {
    let mut merged: Vec<Slot> = Vec::new();
    for &slot in sorted {
        if let Some(last) = merged.last_mut()
            && slot.start <= last.end
        {
            last.end = last.end.max(slot.end);
            continue;
        }
        merged.push(slot);
    }
    merged
}

/// Subtract a sorted set of slots from a sorted base set.
pub fn subtract_slots(base: &[Slot], to_remove: &[Slot]) -> Vec<Slot> {
    let mut result = Vec::new();
    let mut ri = 0;

    for &b in base {
        let mut current_start = b.start;
        let current_end = b.end;

        while ri < to_remove.len() && to_remove[ri].end <= current_start {
            ri += 1;
        }

        let mut j = ri;
        while j < to_remove.len() && to_remove[j].start < current_end {
            let r = &to_remove[j];
            if r.start > current_start {
                result.push(Slot::new(current_start, r.start));
            }
            current_start = current_start.max(r.end);
            j += 1;
        }

        if current_start < current_end {
            result.push(Slot::new(current_start, current_end));
        }
    }

    result
}

/// Free slots for one day. Free-form rooms get the open window minus
/// committed reservations; shape-constrained rooms get the subset of their
/// permitted shapes with no conflict on that date.
pub fn free_slots(rs: &RoomState, date: NaiveDate) -> Vec<Slot> {
    if let Some(shapes) = &rs.shapes {
        return shapes
            .iter()
            .filter_map(|shape| shape.on(date))
            .filter(|slot| rs.overlapping(slot).next().is_none())
            .collect();
    }

    let window = day_window(date);
    let mut taken: Vec<Slot> = rs
        .overlapping(&window)
        .map(|r| {
            Slot::new(
                r.slot.start.max(window.start),
                r.slot.end.min(window.end),
            )
        })
        .collect();
    taken.sort_by_key(|s| s.start);
    let taken = merge_overlapping(&taken);
    subtract_slots(&[window], &taken)
}
