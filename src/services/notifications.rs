//! Match-created events for the notification collaborator
//!
//! Delivery is fire-and-forget: the matching flow never waits on or fails
//! because of a notification.

use reqwest::Client;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::Result;
use crate::models::MatchCreatedEvent;

pub trait MatchNotifier: Send + Sync {
    fn match_created(&self, event: MatchCreatedEvent);
}

/// Writes events to the log only
#[derive(Debug, Default)]
pub struct LogNotifier;

impl MatchNotifier for LogNotifier {
    fn match_created(&self, event: MatchCreatedEvent) {
        tracing::info!(
            match_id = %event.match_id,
            user1_id = %event.user1_id,
            user2_id = %event.user2_id,
            "Match created"
        );
    }
}

/// POSTs events to a webhook on a spawned task
///
/// Must be used from within a tokio runtime.
pub struct WebhookNotifier {
    url: String,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { url, client })
    }
}

impl MatchNotifier for WebhookNotifier {
    fn match_created(&self, event: MatchCreatedEvent) {
        let client = self.client.clone();
        let url = self.url.clone();

        tokio::spawn(async move {
            let result = client.post(&url).json(&event).send().await;
            match result {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!("Delivered match-created event {}", event.match_id);
                }
                Ok(response) => {
                    tracing::warn!(
                        "Notification webhook rejected match {}: {}",
                        event.match_id,
                        response.status()
                    );
                }
                Err(e) => {
                    tracing::warn!("Failed to deliver match {} notification: {}", event.match_id, e);
                }
            }
        });
    }
}

/// Keeps events in memory for inspection
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<MatchCreatedEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MatchCreatedEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl MatchNotifier for RecordingNotifier {
    fn match_created(&self, event: MatchCreatedEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event() -> MatchCreatedEvent {
        MatchCreatedEvent {
            match_id: "m1".to_string(),
            user1_id: "alice".to_string(),
            user2_id: "bob".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_webhook_posts_event() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/events")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"matchId":"m1","user1Id":"alice","user2Id":"bob"}"#.to_string(),
            ))
            .with_status(202)
            .create_async()
            .await;

        let notifier =
            WebhookNotifier::new(format!("{}/events", server.url()), Duration::from_secs(5)).unwrap();
        notifier.match_created(event());

        // Delivery happens on a spawned task
        for _ in 0..50 {
            if mock.matched_async().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        mock.assert_async().await;
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.match_created(event());
        assert_eq!(notifier.events().len(), 1);
    }
}
