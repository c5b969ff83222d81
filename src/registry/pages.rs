use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Length of generated page ids, in hex characters.
pub const PAGE_ID_LEN: usize = 16;

/// Rendered camera pages keyed by an unguessable id.
#[derive(Clone, Default)]
pub struct PageRegistry {
    inner: Arc<Mutex<HashMap<String, Arc<str>>>>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `html` under a fresh id and returns the id.
    pub async fn register(&self, html: impl Into<Arc<str>>) -> String {
        let html = html.into();
        let mut pages = self.inner.lock().await;
        let id = loop {
            let candidate = generate_id();
            if !pages.contains_key(&candidate) {
                break candidate;
            }
        };
        debug!("Registered camera page {} ({} bytes)", id, html.len());
        pages.insert(id.clone(), html);
        id
    }

    pub async fn resolve(&self, id: &str) -> Option<Arc<str>> {
        self.inner.lock().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.inner.lock().await.remove(id).is_some();
        if removed {
            debug!("Removed camera page {}", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn generate_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(PAGE_ID_LEN);
    id
}
