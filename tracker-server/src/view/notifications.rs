//! Transient, dismissible error notifications.
//!
//! Notifications expire on their own after a TTL; dismissing one removes it
//! immediately.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache as MokaCache;

/// Configuration for the notification store.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// How long a notification stays visible if not dismissed.
    pub ttl: Duration,

    /// Maximum number of notifications kept at once.
    pub max_capacity: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 100,
        }
    }
}

/// A user-facing error message.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    /// HTTP status of the failed request, if the server answered.
    pub status: Option<u16>,
    pub raised_at: DateTime<Utc>,
}

/// Store of active notifications.
pub struct Notifications {
    cache: MokaCache<u64, Arc<Notification>>,
    next_id: u64,
}

impl Notifications {
    /// Create an empty store.
    pub fn new(config: &NotificationConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { cache, next_id: 0 }
    }

    /// Raise a new notification and return its id.
    pub async fn raise(&mut self, message: impl Into<String>, status: Option<u16>) -> u64 {
        self.next_id += 1;
        let notification = Notification {
            id: self.next_id,
            message: message.into(),
            status,
            raised_at: Utc::now(),
        };
        self.cache
            .insert(notification.id, Arc::new(notification))
            .await;
        self.next_id
    }

    /// Dismiss a notification. Returns false if it was unknown or expired.
    pub async fn dismiss(&self, id: u64) -> bool {
        self.cache.remove(&id).await.is_some()
    }

    /// Look up an active notification.
    pub async fn get(&self, id: u64) -> Option<Arc<Notification>> {
        self.cache.get(&id).await
    }

    /// Active notifications, oldest first.
    pub fn active(&self) -> Vec<Arc<Notification>> {
        let mut active: Vec<_> = self.cache.iter().map(|(_, n)| n).collect();
        active.sort_by_key(|n| n.id);
        active
    }
}
