//! Notification adapters

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use core_kernel::{DomainPort, PortError};

use crate::events::ClaimEvent;
use crate::ports::ClaimNotifier;

/// Logs every claim event at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl DomainPort for TracingNotifier {}

#[async_trait]
impl ClaimNotifier for TracingNotifier {
    async fn notify(&self, event: &ClaimEvent) -> Result<(), PortError> {
        info!(
            event_type = event.event_type(),
            claim_id = %event.claim_id(),
            employee_id = %event.employee_id(),
            timestamp = %event.timestamp(),
            "Claim event"
        );
        Ok(())
    }
}

/// Keeps every event it receives; can be switched to fail
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<ClaimEvent>>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every delivery fails after recording the event
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub async fn events(&self) -> Vec<ClaimEvent> {
        self.events.lock().await.clone()
    }

    pub async fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().await.iter().map(ClaimEvent::event_type).collect()
    }
}

impl DomainPort for RecordingNotifier {}

#[async_trait]
impl ClaimNotifier for RecordingNotifier {
    async fn notify(&self, event: &ClaimEvent) -> Result<(), PortError> {
        self.events.lock().await.push(event.clone());
        if self.failing {
            return Err(PortError::connection("notification channel unavailable"));
        }
        Ok(())
    }
}
