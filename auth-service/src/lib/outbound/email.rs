use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::domain::auth::errors::EmailDeliveryError;
use crate::domain::auth::ports::Clock;
use crate::domain::auth::ports::EmailDelivery;
use crate::domain::user::models::EmailAddress;

/// Password reset message queued for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetNotification {
    pub recipient: EmailAddress,
    pub token: String,
    pub queued_at: DateTime<Utc>,
}

/// Email delivery that keeps messages in an in-process outbox.
///
/// A mail relay drains the outbox with [`OutboxEmailDelivery::drain`]; tests
/// read it with [`OutboxEmailDelivery::sent`].
pub struct OutboxEmailDelivery {
    outbox: Mutex<Vec<PasswordResetNotification>>,
    clock: Arc<dyn Clock>,
}

impl OutboxEmailDelivery {
    /// Notifications are stamped with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            outbox: Mutex::new(Vec::new()),
            clock,
        }
    }

    /// Snapshot of every queued notification, oldest first.
    pub async fn sent(&self) -> Vec<PasswordResetNotification> {
        self.outbox.lock().await.clone()
    }

    /// Most recent token queued for `recipient`.
    pub async fn last_token_for(&self, recipient: &str) -> Option<String> {
        self.outbox
            .lock()
            .await
            .iter()
            .rev()
            .find(|notification| notification.recipient.as_str() == recipient)
            .map(|notification| notification.token.clone())
    }

    /// Remove and return every queued notification.
    pub async fn drain(&self) -> Vec<PasswordResetNotification> {
        std::mem::take(&mut *self.outbox.lock().await)
    }
}

#[async_trait]
impl EmailDelivery for OutboxEmailDelivery {
    async fn send_password_reset_notification(
        &self,
        email: &EmailAddress,
        token: &str,
    ) -> Result<(), EmailDeliveryError> {
        self.outbox.lock().await.push(PasswordResetNotification {
            recipient: email.clone(),
            token: token.to_string(),
            queued_at: self.clock.now(),
        });

        tracing::debug!(recipient = %email, "Password reset notification queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::outbound::clock::ManualClock;

    fn address(raw: &str) -> EmailAddress {
        EmailAddress::new(raw.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_outbox_records_and_drains() {
        let start = DateTime::parse_from_rfc3339("2024-02-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let clock = Arc::new(ManualClock::new(start));
        let outbox = OutboxEmailDelivery::new(clock.clone());

        outbox
            .send_password_reset_notification(&address("bob@example.com"), "first")
            .await
            .unwrap();
        clock.advance(Duration::minutes(5));
        outbox
            .send_password_reset_notification(&address("bob@example.com"), "second")
            .await
            .unwrap();

        let sent = outbox.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].queued_at, start);
        assert_eq!(sent[1].queued_at, start + Duration::minutes(5));
        assert_eq!(
            outbox.last_token_for("bob@example.com").await.as_deref(),
            Some("second")
        );
        assert_eq!(outbox.last_token_for("eve@example.com").await, None);

        assert_eq!(outbox.drain().await.len(), 2);
        assert!(outbox.sent().await.is_empty());
    }
}
