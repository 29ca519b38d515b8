//! Event broadcaster: the outbox the store publishes to and the relay
//! drains. Uses tokio's broadcast channel for multi-producer,
//! multi-consumer messaging.

use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::ChangeEvent;

/// Default buffer size for the broadcast channel. Slow receivers past this
/// limit lose the oldest events.
const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Broadcaster for change events.
///
/// Thread-safe; clone or wrap in `Arc` to share across the application.
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventBroadcaster {
    /// Create a new broadcaster with the default buffer size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE)
    }

    /// Create a new broadcaster with a custom buffer size.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Create a new broadcaster wrapped in an Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Send an event to all subscribers.
    ///
    /// Returns the number of subscribers that received it; 0 when nobody is
    /// listening (the event is simply dropped, delivery is best-effort).
    pub fn send(&self, event: ChangeEvent) -> usize {
        self.sender.send(event).unwrap_or_default()
    }

    /// Subscribe to events broadcast after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBroadcaster")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EntityKind, InviteEntry};
    use crate::events::types::EntityRecord;
    use crate::time::now_utc;

    fn sample_event() -> ChangeEvent {
        ChangeEvent::created(
            EntityKind::Invite,
            EntityRecord::Invite(InviteEntry {
                name: "Ada Example".into(),
                email: "ada@example.com".into(),
                requested_at: now_utc(),
            }),
        )
    }

    #[test]
    fn test_broadcaster_creation() {
        let broadcaster = EventBroadcaster::new();
        assert_eq!(broadcaster.subscriber_count(), 0);
        assert!(!broadcaster.has_subscribers());
    }

    #[test]
    fn test_broadcaster_no_subscribers_drops_event() {
        let broadcaster = EventBroadcaster::new();
        assert_eq!(broadcaster.send(sample_event()), 0);
    }

    #[tokio::test]
    async fn test_broadcaster_send_receive() {
        let broadcaster = EventBroadcaster::new();
        let mut receiver = broadcaster.subscribe();

        let count = broadcaster.send(sample_event());
        assert_eq!(count, 1);

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.kind, EntityKind::Invite);
        assert_eq!(event.records[0].email(), "ada@example.com");
    }

    #[tokio::test]
    async fn test_broadcaster_multiple_subscribers() {
        let broadcaster = EventBroadcaster::new();
        let mut rx1 = broadcaster.subscribe();
        let mut rx2 = broadcaster.subscribe();

        assert_eq!(broadcaster.subscriber_count(), 2);
        assert_eq!(broadcaster.send(sample_event()), 2);

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[test]
    fn test_broadcaster_shared() {
        let broadcaster = EventBroadcaster::new_shared();
        let clone = broadcaster.clone();
        let _rx = broadcaster.subscribe();
        assert_eq!(clone.subscriber_count(), 1);
    }
}
