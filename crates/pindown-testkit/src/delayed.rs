//! A backend wrapper that answers late.
//!
//! The wrapped operation is spawned immediately and lands on its own
//! schedule; only the reply is held back. A caller that gives up waiting
//! therefore leaves a completed write behind, which is exactly what a slow
//! network does to a timed-out append.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pindown_core::{Record, StoreAddress};
use pindown_store::{AppendOutcome, Backend, CreateOutcome, Result, StoreError};

/// Delays applied per operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Delays {
    pub create: Duration,
    pub append: Duration,
    pub read: Duration,
}

/// Wraps a backend and delays its replies.
pub struct DelayedBackend<B> {
    inner: Arc<B>,
    delays: Delays,
}

impl<B: Backend + 'static> DelayedBackend<B> {
    pub fn new(inner: Arc<B>, delays: Delays) -> Self {
        Self { inner, delays }
    }

    /// Delay only appends.
    pub fn slow_appends(inner: Arc<B>, delay: Duration) -> Self {
        Self::new(
            inner,
            Delays {
                append: delay,
                ..Delays::default()
            },
        )
    }

    /// The wrapped backend, for inspecting what actually landed.
    pub fn inner(&self) -> &Arc<B> {
        &self.inner
    }
}

async fn reply_after<T>(delay: Duration, handle: tokio::task::JoinHandle<Result<T>>) -> Result<T> {
    let result = handle
        .await
        .map_err(|e| StoreError::Task(format!("delayed operation failed: {}", e)))?;
    tokio::time::sleep(delay).await;
    result
}

#[async_trait]
impl<B: Backend + 'static> Backend for DelayedBackend<B> {
    async fn create_if_absent(&self, address: &StoreAddress) -> Result<CreateOutcome> {
        let inner = Arc::clone(&self.inner);
        let address = *address;
        let handle = tokio::spawn(async move { inner.create_if_absent(&address).await });
        reply_after(self.delays.create, handle).await
    }

    async fn append(&self, address: &StoreAddress, record: &Record) -> Result<AppendOutcome> {
        let inner = Arc::clone(&self.inner);
        let address = *address;
        let record = record.clone();
        let handle = tokio::spawn(async move { inner.append(&address, &record).await });
        reply_after(self.delays.append, handle).await
    }

    async fn read(&self, address: &StoreAddress) -> Result<Option<Vec<Record>>> {
        let inner = Arc::clone(&self.inner);
        let address = *address;
        let handle = tokio::spawn(async move { inner.read(&address).await });
        reply_after(self.delays.read, handle).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pindown_store::MemoryBackend;

    #[tokio::test]
    async fn test_append_lands_even_if_caller_gives_up() {
        let inner = Arc::new(MemoryBackend::new());
        let backend = DelayedBackend::slow_appends(Arc::clone(&inner), Duration::from_secs(60));
        let address = StoreAddress::derive("test");
        backend.create_if_absent(&address).await.unwrap();

        let record = Record::new("U1", "U2", "doc.pdf").unwrap();
        let gave_up =
            tokio::time::timeout(Duration::from_millis(50), backend.append(&address, &record))
                .await;
        assert!(gave_up.is_err());

        // The spawned append finishes on its own.
        for _ in 0..100 {
            if inner.read(&address).await.unwrap().is_some_and(|r| !r.is_empty()) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("append never landed");
    }
}
