use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A bot that was accepted by the provisioning API and has not been stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotRecord {
    pub bot_id: String,
    pub bot_name: String,
    pub meeting_url: String,
    pub camera_url: String,
    pub page_id: String,
    pub asset_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct BotRegistry {
    inner: Arc<Mutex<HashMap<String, BotRecord>>>,
}

impl BotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `record`, returning any record previously stored under the
    /// same bot id.
    pub async fn insert(&self, record: BotRecord) -> Option<BotRecord> {
        self.inner
            .lock()
            .await
            .insert(record.bot_id.clone(), record)
    }

    /// All live bots, oldest first.
    pub async fn list(&self) -> Vec<BotRecord> {
        let mut bots: Vec<_> = self.inner.lock().await.values().cloned().collect();
        bots.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.bot_id.cmp(&b.bot_id))
        });
        bots
    }

    pub async fn get(&self, bot_id: &str) -> Option<BotRecord> {
        self.inner.lock().await.get(bot_id).cloned()
    }

    pub async fn remove(&self, bot_id: &str) -> Option<BotRecord> {
        self.inner.lock().await.remove(bot_id)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
