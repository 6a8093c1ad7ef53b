use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{interval, Duration};
use vitalwatch_alert::engine::AlertEngine;
use vitalwatch_notify::manager::NotificationManager;
use vitalwatch_storage::DataStore;

/// Periodically evaluates every patient's most recent window and hands the
/// alerts to the notification manager.
pub struct EvaluationScheduler {
    store: Arc<DataStore>,
    engine: Arc<AlertEngine>,
    notifier: Arc<NotificationManager>,
    interval_secs: u64,
    window_ms: i64,
    max_concurrent: usize,
}

impl EvaluationScheduler {
    pub fn new(
        store: Arc<DataStore>,
        engine: Arc<AlertEngine>,
        notifier: Arc<NotificationManager>,
        interval_secs: u64,
        window_ms: i64,
        max_concurrent: usize,
    ) -> Self {
        Self {
            store,
            engine,
            notifier,
            interval_secs: interval_secs.max(1),
            window_ms,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub async fn run(&self) {
        tracing::info!(
            interval_secs = self.interval_secs,
            window_ms = self.window_ms,
            max_concurrent = self.max_concurrent,
            "Evaluation scheduler started"
        );

        let mut tick = interval(Duration::from_secs(self.interval_secs));
        loop {
            tick.tick().await;
            if let Err(e) = self.run_once().await {
                tracing::error!(error = %e, "Evaluation cycle failed");
            }
        }
    }

    /// Runs one evaluation pass over all patients and returns the number of
    /// alerts delivered.
    ///
    /// Patients are evaluated concurrently; alerts are then delivered patient
    /// by patient in ascending id order, each patient's alerts in emission
    /// order.
    pub async fn run_once(&self) -> Result<usize> {
        let patients = self.store.list_patients();
        if patients.is_empty() {
            return Ok(0);
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::with_capacity(patients.len());

        for patient_id in patients {
            let permit = semaphore.clone().acquire_owned().await?;
            let store = self.store.clone();
            let engine = self.engine.clone();
            let window_ms = self.window_ms;

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let Some(latest) = store.latest_timestamp(patient_id) else {
                    return Vec::new();
                };
                let start = latest.saturating_sub(window_ms);
                engine.evaluate(&store, patient_id, start, latest)
            });
            handles.push((patient_id, handle));
        }

        let mut delivered = 0;
        for (patient_id, handle) in handles {
            match handle.await {
                Ok(alerts) => {
                    if !alerts.is_empty() {
                        tracing::info!(patient_id, alerts = alerts.len(), "Alerts raised");
                    }
                    self.notifier.notify_all(&alerts).await;
                    delivered += alerts.len();
                }
                Err(e) => {
                    tracing::error!(patient_id, error = %e, "Evaluation task failed");
                }
            }
        }
        Ok(delivered)
    }
}
