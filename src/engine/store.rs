use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::RwLock;
use ulid::Ulid;

use crate::model::{RoomId, RoomState};

pub type SharedRoomState = Arc<RwLock<RoomState>>;

/// In-memory room store, injected into the engine. The store tracks which
/// rooms exist and which room owns each committed reservation; all slot-level
/// mutation goes through [`RoomState`] under the room's write lock.
pub struct RoomStore {
    rooms: DashMap<RoomId, SharedRoomState>,
    /// Reverse lookup: reservation id → room id.
    reservation_index: DashMap<Ulid, RoomId>,
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomStore {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
            reservation_index: DashMap::new(),
        }
    }

    // ── Room catalog ─────────────────────────────────────────

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn contains_room(&self, id: &str) -> bool {
        self.rooms.contains_key(id)
    }

    pub fn get_room(&self, id: &str) -> Option<SharedRoomState> {
        self.rooms.get(id).map(|e| e.value().clone())
    }

    /// Insert a room only if the id is free. Returns false on an occupied
    /// entry, leaving the existing room untouched. The check and the insert
    /// are one atomic operation on the map shard.
    pub fn insert_room_if_absent(&self, id: RoomId, state: SharedRoomState) -> bool {
        match self.rooms.entry(id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(state);
                true
            }
        }
    }

    pub fn remove_room(&self, id: &str) -> Option<(RoomId, SharedRoomState)> {
        self.rooms.remove(id)
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|e| e.key().clone()).collect()
    }

    // ── Reservation index ────────────────────────────────────

    pub fn room_for_reservation(&self, id: &Ulid) -> Option<RoomId> {
        self.reservation_index.get(id).map(|e| e.value().clone())
    }

    pub fn index_reservation(&self, id: Ulid, room_id: RoomId) {
        self.reservation_index.insert(id, room_id);
    }

    pub fn unindex_reservation(&self, id: &Ulid) {
        self.reservation_index.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(id: &str) -> SharedRoomState {
        Arc::new(RwLock::new(RoomState::new(
            id.to_string(),
            format!("Room {id}"),
            None,
        )))
    }

    #[test]
    fn room_catalog_roundtrip() {
        let store = RoomStore::new();
        assert_eq!(store.room_count(), 0);

        assert!(store.insert_room_if_absent("meet1".into(), shared("meet1")));
        assert!(store.insert_room_if_absent("meet2".into(), shared("meet2")));
        assert_eq!(store.room_count(), 2);
        assert!(store.contains_room("meet1"));
        assert!(store.get_room("meet2").is_some());
        assert!(store.get_room("auditorio").is_none());

        let mut ids = store.room_ids();
        ids.sort();
        assert_eq!(ids, vec!["meet1".to_string(), "meet2".to_string()]);

        store.remove_room("meet1");
        assert!(!store.contains_room("meet1"));
    }

    #[tokio::test]
    async fn duplicate_insert_keeps_first_room() {
        let store = RoomStore::new();
        assert!(store.insert_room_if_absent("meet1".into(), shared("meet1")));
        assert!(!store.insert_room_if_absent(
            "meet1".into(),
            Arc::new(RwLock::new(RoomState::new(
                "meet1".into(),
                "Impostor".into(),
                None,
            ))),
        ));
        assert_eq!(store.room_count(), 1);

        let rs = store.get_room("meet1").unwrap();
        assert_eq!(rs.read().await.name, "Room meet1");
    }

    #[test]
    fn reservation_index_roundtrip() {
        let store = RoomStore::new();
        let id = Ulid::new();
        assert!(store.room_for_reservation(&id).is_none());

        store.index_reservation(id, "meet1".into());
        assert_eq!(store.room_for_reservation(&id), Some("meet1".to_string()));

        store.unindex_reservation(&id);
        assert!(store.room_for_reservation(&id).is_none());
    }
}
