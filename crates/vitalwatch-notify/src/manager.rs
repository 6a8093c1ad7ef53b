use crate::routing::SinkRoute;
use crate::AlertSink;
use std::sync::Arc;
use vitalwatch_common::types::Alert;

/// Fans alerts out to the configured sinks.
pub struct NotificationManager {
    sinks: Vec<Arc<dyn AlertSink>>,
    routes: Vec<SinkRoute>,
}

impl NotificationManager {
    pub fn new(sinks: Vec<Arc<dyn AlertSink>>, routes: Vec<SinkRoute>) -> Self {
        Self { sinks, routes }
    }

    /// Routes every sink with no priority floor.
    pub fn broadcast(sinks: Vec<Arc<dyn AlertSink>>) -> Self {
        let routes = (0..sinks.len())
            .map(|sink_index| SinkRoute {
                min_priority: 0,
                sink_index,
            })
            .collect();
        Self::new(sinks, routes)
    }

    /// Delivers one alert. Sink failures are logged, never returned.
    pub async fn notify(&self, alert: &Alert) {
        for route in &self.routes {
            if !route.should_send(alert.priority) {
                continue;
            }

            if let Some(sink) = self.sinks.get(route.sink_index) {
                if let Err(e) = sink.send(alert).await {
                    tracing::error!(
                        sink = sink.sink_name(),
                        patient_id = alert.patient_id,
                        condition = %alert.condition,
                        error = %e,
                        "Failed to deliver alert"
                    );
                }
            }
        }
    }

    /// Delivers alerts one after another, preserving their order.
    pub async fn notify_all(&self, alerts: &[Alert]) {
        for alert in alerts {
            self.notify(alert).await;
        }
    }

    pub fn sinks(&self) -> &[Arc<dyn AlertSink>] {
        &self.sinks
    }
}
