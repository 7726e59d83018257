mod availability;
mod error;
mod mutations;
mod queries;
mod rules;
mod store;

pub use availability::{day_window, free_slots, merge_overlapping, subtract_slots};
pub use error::{EngineError, RejectReason};
pub use rules::{CLOSE_HOUR, OPEN_HOUR, find_conflict, matches_shape, validate, within_business_hours};
pub use store::{RoomStore, SharedRoomState};

use std::sync::Arc;

use ulid::Ulid;

use crate::model::*;
use crate::notify::NotifyHub;

/// Booking engine: the injected room store, the pure validator, and the
/// per-room change feed. Commit runs read-validate-write as one logical unit
/// under the room's write lock, so two callers racing for overlapping slots
/// serialize instead of committing against stale snapshots.
pub struct Engine {
    store: RoomStore,
    pub notify: Arc<NotifyHub>,
}

/// Apply an event directly to a RoomState. No locking: the caller holds the lock.
fn apply_to_room(rs: &mut RoomState, event: &Event, store: &RoomStore) {
    match event {
        Event::ReservationCommitted { reservation } => {
            store.index_reservation(reservation.id, reservation.room_id.clone());
            rs.insert_reservation(reservation.clone());
        }
        Event::ReservationCancelled { id, .. } => {
            rs.remove_reservation(*id);
            store.unindex_reservation(id);
        }
        Event::RoomUpdated { name, shapes, .. } => {
            rs.set_profile(name.clone(), shapes.clone());
        }
        // RoomCreated/Deleted are handled at the store level, not here
        Event::RoomCreated { .. } | Event::RoomDeleted { .. } => {}
    }
}

impl Engine {
    pub fn new(store: RoomStore, notify: Arc<NotifyHub>) -> Self {
        Self { store, notify }
    }

    pub(super) fn store(&self) -> &RoomStore {
        &self.store
    }

    pub fn get_room(&self, id: &str) -> Option<SharedRoomState> {
        self.store.get_room(id)
    }

    pub fn room_for_reservation(&self, reservation_id: &Ulid) -> Option<RoomId> {
        self.store.room_for_reservation(reservation_id)
    }

    /// Apply + index + notify in one call.
    pub(super) fn apply_and_notify(&self, room_id: &str, rs: &mut RoomState, event: &Event) {
        apply_to_room(rs, event, &self.store);
        self.notify.send(room_id, event);
    }

    /// Lookup reservation → room, get room, acquire write lock.
    pub(super) async fn resolve_reservation_write(
        &self,
        reservation_id: &Ulid,
    ) -> Result<(RoomId, tokio::sync::OwnedRwLockWriteGuard<RoomState>), EngineError> {
        let room_id = self
            .store
            .room_for_reservation(reservation_id)
            .ok_or(EngineError::NotFound(*reservation_id))?;
        let rs = self
            .store
            .get_room(&room_id)
            .ok_or(EngineError::NotFound(*reservation_id))?;
        let guard = rs.write_owned().await;
        Ok((room_id, guard))
    }
}
