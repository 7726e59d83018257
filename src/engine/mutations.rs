use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::rules::{CLOSE_HOUR, OPEN_HOUR, validate};
use super::{Engine, EngineError};

fn check_shape_policy(shapes: &[SlotShape]) -> Result<(), EngineError> {
    if shapes.is_empty() {
        return Err(EngineError::InvalidShapePolicy("empty shape list"));
    }
    if shapes.len() > MAX_SHAPES_PER_ROOM {
        return Err(EngineError::LimitExceeded("too many shapes on room"));
    }
    for shape in shapes {
        if shape.start_hour >= shape.end_hour {
            return Err(EngineError::InvalidShapePolicy("shape start must precede end"));
        }
        if shape.start_hour < OPEN_HOUR || shape.end_hour > CLOSE_HOUR {
            return Err(EngineError::InvalidShapePolicy("shape outside business hours"));
        }
    }
    Ok(())
}

impl Engine {
    pub async fn create_room(
        &self,
        id: impl Into<RoomId>,
        name: impl Into<String>,
        shapes: Option<Vec<SlotShape>>,
    ) -> Result<(), EngineError> {
        let id = id.into();
        let name = name.into();
        if id.is_empty() {
            return Err(EngineError::MissingField("room_id"));
        }
        if id.len() > MAX_ROOM_ID_LEN {
            return Err(EngineError::LimitExceeded("room id too long"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("room name too long"));
        }
        if let Some(ref shapes) = shapes {
            check_shape_policy(shapes)?;
        }
        if self.store().room_count() >= MAX_ROOMS {
            return Err(EngineError::LimitExceeded("too many rooms"));
        }

        let rs = RoomState::new(id.clone(), name.clone(), shapes.clone());
        if !self
            .store()
            .insert_room_if_absent(id.clone(), Arc::new(RwLock::new(rs)))
        {
            return Err(EngineError::RoomExists(id));
        }
        metrics::gauge!(observability::ROOMS_ACTIVE).set(self.store().room_count() as f64);
        let event = Event::RoomCreated { id: id.clone(), name, shapes };
        self.notify.send(&id, &event);
        info!("room {id} created");
        Ok(())
    }

    pub async fn update_room(
        &self,
        id: &str,
        name: impl Into<String>,
        shapes: Option<Vec<SlotShape>>,
    ) -> Result<(), EngineError> {
        let name = name.into();
        if name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("room name too long"));
        }
        if let Some(ref shapes) = shapes {
            check_shape_policy(shapes)?;
        }
        let rs = self
            .store()
            .get_room(id)
            .ok_or_else(|| EngineError::UnknownRoom(id.to_string()))?;
        let mut guard = rs.write().await;
        // The room may have been deleted between lookup and lock acquisition.
        if !self.store().contains_room(id) {
            return Err(EngineError::UnknownRoom(id.to_string()));
        }

        // Policy changes apply to future proposals only; committed
        // reservations are not re-validated.
        let event = Event::RoomUpdated { id: id.to_string(), name, shapes };
        self.apply_and_notify(id, &mut guard, &event);
        info!("room {id} updated");
        Ok(())
    }

    pub async fn delete_room(&self, id: &str) -> Result<(), EngineError> {
        let rs = self
            .store()
            .get_room(id)
            .ok_or_else(|| EngineError::UnknownRoom(id.to_string()))?;
        let guard = rs.write_owned().await;
        if !guard.reservations.is_empty() {
            return Err(EngineError::RoomInUse(id.to_string()));
        }
        self.store().remove_room(id);
        drop(guard);

        metrics::gauge!(observability::ROOMS_ACTIVE).set(self.store().room_count() as f64);
        let event = Event::RoomDeleted { id: id.to_string() };
        self.notify.send(id, &event);
        self.notify.remove(id);
        info!("room {id} deleted");
        Ok(())
    }

    /// The booking workflow: load the room, validate the proposal against the
    /// committed set under the room's write lock, and commit on acceptance.
    /// The rejection reason comes back as `EngineError::Rejected` so the
    /// caller can surface it verbatim.
    pub async fn reserve(&self, proposal: Proposal) -> Result<Reservation, EngineError> {
        if proposal.room_id.is_empty() {
            return Err(EngineError::MissingField("room_id"));
        }
        if proposal.owner_id.is_empty() {
            return Err(EngineError::MissingField("owner_id"));
        }
        if proposal.title.len() > MAX_TITLE_LEN {
            return Err(EngineError::LimitExceeded("reservation title too long"));
        }
        if proposal.owner_id.len() > MAX_OWNER_LEN {
            return Err(EngineError::LimitExceeded("owner id too long"));
        }

        let room_id = proposal.room_id.clone();
        let rs = self
            .store()
            .get_room(&room_id)
            .ok_or_else(|| EngineError::UnknownRoom(room_id.clone()))?;
        let mut guard = rs.write_owned().await;
        // The room may have been deleted between lookup and lock acquisition.
        if !self.store().contains_room(&room_id) {
            return Err(EngineError::UnknownRoom(room_id));
        }
        if guard.reservations.len() >= MAX_RESERVATIONS_PER_ROOM {
            return Err(EngineError::LimitExceeded("too many reservations on room"));
        }

        if let Err(reason) = validate(&guard, &proposal.slot) {
            metrics::counter!(
                observability::RESERVATIONS_REJECTED_TOTAL,
                "reason" => observability::reject_label(&reason)
            )
            .increment(1);
            debug!("proposal for {room_id} rejected: {reason}");
            return Err(EngineError::Rejected(reason));
        }

        let reservation = proposal.into_reservation(Ulid::new());
        let event = Event::ReservationCommitted {
            reservation: reservation.clone(),
        };
        self.apply_and_notify(&room_id, &mut guard, &event);

        metrics::counter!(observability::RESERVATIONS_COMMITTED_TOTAL).increment(1);
        info!(
            "reservation {} committed on {room_id} [{} – {}]",
            reservation.id, reservation.slot.start, reservation.slot.end
        );
        Ok(reservation)
    }

    pub async fn cancel(&self, reservation_id: Ulid) -> Result<RoomId, EngineError> {
        let (room_id, mut guard) = self.resolve_reservation_write(&reservation_id).await?;
        if !guard.reservations.iter().any(|r| r.id == reservation_id) {
            return Err(EngineError::NotFound(reservation_id));
        }
        let event = Event::ReservationCancelled {
            id: reservation_id,
            room_id: room_id.clone(),
        };
        self.apply_and_notify(&room_id, &mut guard, &event);

        metrics::counter!(observability::RESERVATIONS_CANCELLED_TOTAL).increment(1);
        info!("reservation {reservation_id} cancelled on {room_id}");
        Ok(room_id)
    }
}
