//! Domain event publishing.
//!
//! Publishing is best effort. Callers log failures and carry on.

use async_trait::async_trait;
use std::sync::Mutex;
use crate::domain::events::DomainEvent;
use crate::{MarketError, Result};

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &DomainEvent) -> Result<()>;
}

/// Publishes each event as JSON on its subject.
pub struct NatsPublisher { client: async_nats::Client }

impl NatsPublisher {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = async_nats::connect(url).await.map_err(|e| MarketError::StorageError(format!("nats connect: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl EventPublisher for NatsPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<()> {
        let payload = serde_json::to_vec(event).map_err(|e| MarketError::StorageError(e.to_string()))?;
        self.client
            .publish(event.subject().to_string(), payload.into())
            .await
            .map_err(|e| MarketError::StorageError(format!("nats publish: {e}")))
    }
}

/// Used when no broker is configured.
#[derive(Default)]
pub struct LogPublisher;

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<()> {
        tracing::debug!(subject = event.subject(), ?event, "Domain event");
        Ok(())
    }
}

/// Keeps every event in memory.
#[derive(Default)]
pub struct MemoryPublisher { events: Mutex<Vec<DomainEvent>> }

impl MemoryPublisher {
    pub fn new() -> Self { Self::default() }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EventPublisher for MemoryPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<()> {
        self.events.lock().map_err(|_| MarketError::StorageError("publisher poisoned".into()))?.push(event.clone());
        Ok(())
    }
}

/// Publishes `events` in order, logging rather than returning failures.
pub async fn publish_all(publisher: &dyn EventPublisher, events: Vec<DomainEvent>) {
    for event in events {
        if let Err(e) = publisher.publish(&event).await {
            tracing::warn!(subject = event.subject(), error = %e, "Failed to publish event");
        }
    }
}
