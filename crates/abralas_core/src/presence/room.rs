//! In-process room membership snapshot.
//!
//! A transport adapter feeds connection and peer events in; the counter reads
//! the snapshot. Safe to update from a transport thread.

use crate::presence::counter::PresenceSource;
use log::{info, warn};
use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

/// Connection id of one observer in the room.
pub type PeerId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Failed(String),
}

#[derive(Debug)]
struct RoomState {
    status: ConnectionStatus,
    peers: BTreeSet<PeerId>,
}

#[derive(Debug)]
pub struct RoomPresence {
    self_id: PeerId,
    state: RwLock<RoomState>,
}

impl RoomPresence {
    /// New room handle in `Connecting` state with no known peers.
    pub fn new(self_id: PeerId) -> Self {
        Self {
            self_id,
            state: RwLock::new(RoomState {
                status: ConnectionStatus::Connecting,
                peers: BTreeSet::new(),
            }),
        }
    }

    pub fn self_id(&self) -> PeerId {
        self.self_id
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status
            .clone()
    }

    pub fn connected(&self) {
        self.update(|state| state.status = ConnectionStatus::Connected);
        info!("event=room_status module=presence status=connected");
    }

    /// Marks the room disconnected and forgets known peers.
    pub fn disconnected(&self) {
        self.update(|state| {
            state.status = ConnectionStatus::Disconnected;
            state.peers.clear();
        });
        info!("event=room_status module=presence status=disconnected");
    }

    pub fn failed(&self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(
            "event=room_status module=presence status=failed error={}",
            reason
        );
        self.update(|state| {
            state.status = ConnectionStatus::Failed(reason);
            state.peers.clear();
        });
    }

    /// Records a peer. Our own connection id is ignored.
    pub fn peer_joined(&self, peer: PeerId) {
        if peer == self.self_id {
            return;
        }
        self.update(|state| {
            state.peers.insert(peer);
        });
    }

    pub fn peer_left(&self, peer: PeerId) {
        self.update(|state| {
            state.peers.remove(&peer);
        });
    }

    fn update(&self, apply: impl FnOnce(&mut RoomState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut state);
    }
}

impl PresenceSource for RoomPresence {
    fn other_observers(&self) -> Option<usize> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match state.status {
            ConnectionStatus::Connected => Some(state.peers.len()),
            ConnectionStatus::Connecting
            | ConnectionStatus::Disconnected
            | ConnectionStatus::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionStatus, RoomPresence};
    use crate::presence::counter::PresenceSource;
    use std::sync::Arc;
    use std::thread;
    use uuid::Uuid;

    #[test]
    fn poisoned_room_keeps_reporting_peers() {
        let room = Arc::new(RoomPresence::new(Uuid::new_v4()));
        room.connected();
        room.peer_joined(Uuid::new_v4());

        let writer = Arc::clone(&room);
        let crashed = thread::spawn(move || {
            let _guard = writer.state.write().unwrap();
            panic!("transport thread crashed while holding the room lock");
        })
        .join();
        assert!(crashed.is_err());
        assert!(room.state.is_poisoned());

        assert_eq!(room.status(), ConnectionStatus::Connected);
        assert_eq!(room.other_observers(), Some(1));
        room.peer_joined(Uuid::new_v4());
        assert_eq!(room.other_observers(), Some(2));
    }

    #[test]
    fn connecting_room_reports_no_signal() {
        let room = RoomPresence::new(Uuid::new_v4());
        room.peer_joined(Uuid::new_v4());
        assert_eq!(room.other_observers(), None);
    }

    #[test]
    fn self_join_is_not_counted() {
        let me = Uuid::new_v4();
        let room = RoomPresence::new(me);
        room.connected();
        room.peer_joined(me);
        assert_eq!(room.other_observers(), Some(0));
    }

    #[test]
    fn failure_clears_peers() {
        let room = RoomPresence::new(Uuid::new_v4());
        room.connected();
        room.peer_joined(Uuid::new_v4());
        room.failed("socket closed");
        assert_eq!(
            room.status(),
            ConnectionStatus::Failed("socket closed".to_string())
        );
        room.connected();
        assert_eq!(room.other_observers(), Some(0));
    }
}
