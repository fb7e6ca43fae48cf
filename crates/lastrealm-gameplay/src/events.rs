//! Run event bus.
//!
//! The run publishes what happened during a tick; the host drains the bus for
//! rendering, audio or logs. A full bus drops new events instead of blocking
//! the tick.

use crossbeam_channel::{bounded, Receiver, Sender};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use lastrealm_common::EntityId;

use crate::ai::LaserDirection;
use crate::enemy::EnemyKind;
use crate::progression::DifficultyStep;
use crate::session::{ChoiceOrigin, RunState};
use crate::summary::RunSummary;

/// Events published by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Enemy entered the map.
    EnemySpawned {
        /// Enemy ID
        entity_id: EntityId,
        /// Enemy variant
        kind: EnemyKind,
        /// Spawn point
        position: Vec2,
    },
    /// Enemy died and was credited.
    EnemyKilled {
        /// Enemy ID
        entity_id: EntityId,
        /// Enemy variant
        kind: EnemyKind,
        /// Experience granted
        experience: u32,
    },
    /// Player lost health.
    PlayerDamaged {
        /// Health lost this tick
        damage: f32,
        /// Health left
        health: f32,
    },
    /// Player reached a new level.
    LevelUp {
        /// New level
        level: u32,
    },
    /// Powerup appeared on the map.
    PowerupSpawned {
        /// Pickup ID
        entity_id: EntityId,
        /// Where
        position: Vec2,
    },
    /// Player touched a powerup.
    PowerupPickedUp {
        /// Pickup ID
        entity_id: EntityId,
    },
    /// Choice presented.
    ChoiceOffered {
        /// Why the choice was opened
        origin: ChoiceOrigin,
        /// Offered powerup ids
        options: Vec<String>,
    },
    /// Player chose a powerup.
    PowerupChosen {
        /// Powerup id
        powerup_id: String,
    },
    /// Player dismissed a choice.
    ChoiceCancelled,
    /// Difficulty escalated.
    DifficultyStep {
        /// Step kind
        step: DifficultyStep,
        /// Cycle index
        cycle: u32,
    },
    /// The designated boss arrived.
    BossSpawned {
        /// Boss ID
        entity_id: EntityId,
    },
    /// A boss started a laser telegraph.
    LaserTelegraph {
        /// Boss ID
        entity_id: EntityId,
        /// Beam direction
        direction: LaserDirection,
    },
    /// State machine transition.
    StateChanged {
        /// Previous state
        from: RunState,
        /// New state
        to: RunState,
    },
    /// Run reached victory or defeat.
    RunEnded {
        /// Final summary
        summary: RunSummary,
    },
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity: capacity.max(1),
        }
    }

    /// Publishes an event. Dropped if the bus is full.
    pub fn publish(&self, event: GameEvent) {
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<GameEvent> {
        self.sender.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(8);
        bus.publish(GameEvent::LevelUp { level: 2 });
        bus.publish(GameEvent::ChoiceCancelled);
        assert_eq!(bus.pending_count(), 2);

        let events = bus.drain();
        assert_eq!(events, vec![GameEvent::LevelUp { level: 2 }, GameEvent::ChoiceCancelled]);
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_full_bus_drops_events() {
        let bus = EventBus::new(2);
        for level in 0..5 {
            bus.publish(GameEvent::LevelUp { level });
        }
        assert_eq!(bus.capacity(), 2);
        assert_eq!(bus.drain().len(), 2);
    }

    #[test]
    fn test_sender_handle() {
        let bus = EventBus::default();
        let sender = bus.sender();
        sender.try_send(GameEvent::ChoiceCancelled).expect("bus has room");
        assert_eq!(bus.drain(), vec![GameEvent::ChoiceCancelled]);
    }
}
