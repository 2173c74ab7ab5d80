//! Broadcast of synthesized-audio updates to browser listeners.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

/// Payload pushed to every WebSocket client: `{"updated": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AudioUpdate {
    pub updated: bool,
}

#[derive(Clone)]
pub struct AudioNotifier {
    tx: broadcast::Sender<AudioUpdate>,
}

impl AudioNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AudioUpdate> {
        self.tx.subscribe()
    }

    /// Tell every listener the audio file changed. Returns the number of listeners reached.
    pub fn notify(&self) -> usize {
        let reached = self.tx.send(AudioUpdate { updated: true }).unwrap_or(0);
        debug!("Audio update sent to {} listener(s)", reached);
        reached
    }
}

impl Default for AudioNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let json = serde_json::to_string(&AudioUpdate { updated: true }).unwrap();
        assert_eq!(json, r#"{"updated":true}"#);
    }

    #[tokio::test]
    async fn test_every_subscriber_is_notified() {
        let notifier = AudioNotifier::new();
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();

        assert_eq!(notifier.notify(), 2);
        assert_eq!(first.recv().await.unwrap(), AudioUpdate { updated: true });
        assert_eq!(second.recv().await.unwrap(), AudioUpdate { updated: true });
    }

    #[test]
    fn test_notify_without_listeners() {
        assert_eq!(AudioNotifier::new().notify(), 0);
    }
}
