//! Alert delivery.
//!
//! The evaluation pass hands its alerts to a [`manager::NotificationManager`],
//! which forwards each one, in emission order, to every [`AlertSink`] whose
//! route accepts the alert's priority. Built-in sinks write to the tracing
//! log, append JSON lines to a file, or collect alerts in memory.

pub mod channels;
pub mod error;
pub mod manager;
pub mod routing;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use vitalwatch_common::types::Alert;

/// A consumer of emitted alerts (log, file, socket broadcast, ...).
///
/// All blocking work happens here, after evaluation has finished.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Delivers one alert.
    ///
    /// # Errors
    ///
    /// Returns an error if the alert could not be delivered. The manager logs
    /// the failure and continues with the remaining sinks.
    async fn send(&self, alert: &Alert) -> error::Result<()>;

    /// Returns the sink type name (e.g., `"log"`, `"file"`).
    fn sink_name(&self) -> &str;
}
