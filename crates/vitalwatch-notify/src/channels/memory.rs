use crate::error::Result;
use crate::AlertSink;
use async_trait::async_trait;
use std::sync::Mutex;
use vitalwatch_common::types::Alert;

/// Keeps delivered alerts in memory, in delivery order.
#[derive(Debug, Default)]
pub struct MemorySink {
    alerts: Mutex<Vec<Alert>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far.
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Removes and returns everything delivered so far.
    pub fn drain(&self) -> Vec<Alert> {
        std::mem::take(
            &mut *self
                .alerts
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

#[async_trait]
impl AlertSink for MemorySink {
    async fn send(&self, alert: &Alert) -> Result<()> {
        self.alerts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(alert.clone());
        Ok(())
    }

    fn sink_name(&self) -> &str {
        "memory"
    }
}
