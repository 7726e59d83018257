use chrono::NaiveDate;

use crate::model::*;

use super::availability::free_slots;
use super::{Engine, EngineError};

impl Engine {
    pub async fn list_rooms(&self) -> Vec<RoomInfo> {
        let mut infos = Vec::new();
        for id in self.store().room_ids() {
            if let Some(rs) = self.store().get_room(&id) {
                let guard = rs.read().await;
                infos.push(RoomInfo {
                    id: guard.id.clone(),
                    name: guard.name.clone(),
                    shapes: guard.shapes.clone(),
                    version: guard.version,
                    reservations: guard.reservations.len(),
                });
            }
        }
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }

    pub async fn room_info(&self, id: &str) -> Option<RoomInfo> {
        let rs = self.store().get_room(id)?;
        let guard = rs.read().await;
        Some(RoomInfo {
            id: guard.id.clone(),
            name: guard.name.clone(),
            shapes: guard.shapes.clone(),
            version: guard.version,
            reservations: guard.reservations.len(),
        })
    }

    /// Committed reservations for a room, sorted by start. Unknown rooms
    /// yield an empty list (queries are lenient; mutations are strict).
    pub async fn list_reservations(&self, room_id: &str) -> Result<Vec<Reservation>, EngineError> {
        let rs = match self.store().get_room(room_id) {
            Some(rs) => rs,
            None => return Ok(vec![]),
        };
        let guard = rs.read().await;
        Ok(guard.reservations.clone())
    }

    /// Free slots for a room on one day: the open window minus committed
    /// reservations, or the unbooked permitted shapes for shaped rooms.
    pub async fn free_slots(&self, room_id: &str, date: NaiveDate) -> Result<Vec<Slot>, EngineError> {
        let rs = match self.store().get_room(room_id) {
            Some(rs) => rs,
            None => return Ok(vec![]),
        };
        let guard = rs.read().await;
        Ok(free_slots(&guard, date))
    }

    /// All reservations held by one owner, across rooms.
    pub async fn reservations_for_owner(&self, owner_id: &str) -> Vec<Reservation> {
        let mut found = Vec::new();
        for id in self.store().room_ids() {
            if let Some(rs) = self.store().get_room(&id) {
                let guard = rs.read().await;
                found.extend(
                    guard
                        .reservations
                        .iter()
                        .filter(|r| r.owner_id == owner_id)
                        .cloned(),
                );
            }
        }
        found.sort_by_key(|r| r.slot.start);
        found
    }
}
