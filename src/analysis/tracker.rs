//! Analysis document tracker

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AnalysisClient, AnalysisDocument, AnalysisSource};

/// Tracks the latest analysis document with periodic refresh.
///
/// A failed refresh keeps the previous document in place.
pub struct AnalysisTracker {
    client: AnalysisClient,
    current: Arc<RwLock<Option<AnalysisDocument>>>,
}

impl AnalysisTracker {
    /// Create a new tracker; empty until the first refresh
    pub fn new(client: AnalysisClient) -> Self {
        Self {
            client,
            current: Arc::new(RwLock::new(None)),
        }
    }
}

#[async_trait]
impl AnalysisSource for AnalysisTracker {
    async fn latest(&self) -> Option<AnalysisDocument> {
        self.current.read().await.clone()
    }

    async fn refresh(&self) -> anyhow::Result<()> {
        let document = self.client.fetch().await?;
        *self.current.write().await = Some(document);
        Ok(())
    }
}
