//! Event types for the vitals core event system
//!
//! Provides the shared event definitions and EventBus the pipeline uses to
//! surface diagnostics to whatever subscribes (logging, dashboards, tests).
//! Emission is best-effort: no subscribers is a normal condition, not an
//! error, and the pipeline never blocks on delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// What started a drain cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrainTrigger {
    /// Fired by the fixed-cadence drain timer
    Scheduled,
    /// Fired because the pending buffer crossed the high-water mark
    Backpressure,
}

/// Vitals core event types
///
/// Events are broadcast via EventBus and can be serialized for transport
/// by an embedding service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VitalsEvent {
    /// A drain cycle began consuming the pending buffer
    DrainStarted {
        /// Identity of this drain cycle (shared by its follow-up events)
        drain_id: Uuid,
        /// Buffer length observed at drain start
        buffer_len: usize,
        /// What started the cycle
        trigger: DrainTrigger,
        /// When the cycle started
        timestamp: DateTime<Utc>,
    },

    /// One batch was analyzed and contained at least one anomalous record
    AnomalyBatch {
        /// Drain cycle this batch belongs to
        drain_id: Uuid,
        /// Records in the batch
        batch_size: usize,
        /// Records flagged anomalous
        anomaly_count: usize,
        /// When analysis finished
        timestamp: DateTime<Utc>,
    },

    /// A drain cycle finished and the pipeline returned to idle
    DrainCompleted {
        /// Identity of the completed cycle
        drain_id: Uuid,
        /// Batches processed this cycle
        batches: usize,
        /// Total records drained this cycle
        records: usize,
        /// Total records flagged anomalous this cycle
        anomalies: usize,
        /// When the cycle completed
        timestamp: DateTime<Utc>,
    },
}

/// Broadcast bus for [`VitalsEvent`]
///
/// Thin wrapper over `tokio::sync::broadcast`: subscribers only receive
/// events emitted after they subscribe, and slow subscribers drop the
/// oldest buffered events rather than backpressuring the emitter.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<VitalsEvent>,
}

impl EventBus {
    /// Create a new bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<VitalsEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all current subscribers
    ///
    /// Returns the number of subscribers the event was delivered to;
    /// zero subscribers is not an error.
    pub fn emit(&self, event: VitalsEvent) -> usize {
        match self.tx.send(event) {
            Ok(count) => count,
            Err(_) => 0,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_without_subscribers_is_ok() {
        let bus = EventBus::new(16);
        let delivered = bus.emit(VitalsEvent::DrainCompleted {
            drain_id: Uuid::new_v4(),
            batches: 0,
            records: 0,
            anomalies: 0,
            timestamp: Utc::now(),
        });
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn subscriber_receives_emitted_event() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let drain_id = Uuid::new_v4();
        bus.emit(VitalsEvent::DrainStarted {
            drain_id,
            buffer_len: 3,
            trigger: DrainTrigger::Scheduled,
            timestamp: Utc::now(),
        });

        match rx.recv().await.unwrap() {
            VitalsEvent::DrainStarted { drain_id: id, buffer_len, trigger, .. } => {
                assert_eq!(id, drain_id);
                assert_eq!(buffer_len, 3);
                assert_eq!(trigger, DrainTrigger::Scheduled);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = VitalsEvent::AnomalyBatch {
            drain_id: Uuid::nil(),
            batch_size: 10,
            anomaly_count: 2,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"AnomalyBatch\""));
    }
}
