use crate::channels::file::FileSink;
use crate::channels::log::LogSink;
use crate::channels::memory::MemorySink;
use crate::error::NotifyError;
use crate::manager::NotificationManager;
use crate::routing::SinkRoute;
use crate::AlertSink;
use async_trait::async_trait;
use std::sync::Arc;
use vitalwatch_common::types::{Alert, AlertCondition};

struct FailingSink;

#[async_trait]
impl AlertSink for FailingSink {
    async fn send(&self, _alert: &Alert) -> crate::error::Result<()> {
        Err(NotifyError::Other("sink offline".into()))
    }

    fn sink_name(&self) -> &str {
        "failing"
    }
}

fn alert(condition: AlertCondition, ts: i64, priority: u8) -> Alert {
    Alert::new(7, condition, ts).with_priority(priority)
}

#[test]
fn routing_priority_filter() {
    let urgent_only = SinkRoute {
        min_priority: 3,
        sink_index: 0,
    };
    let everything = SinkRoute {
        min_priority: 0,
        sink_index: 1,
    };

    assert!(!urgent_only.should_send(Some(2)));
    assert!(urgent_only.should_send(Some(3)));
    assert!(!urgent_only.should_send(None));

    assert!(everything.should_send(None));
    assert!(everything.should_send(Some(1)));
}

#[tokio::test]
async fn memory_sink_keeps_delivery_order() {
    let sink = MemorySink::new();
    sink.send(&alert(AlertCondition::LowBloodSaturation, 10, 2))
        .await
        .unwrap();
    sink.send(&alert(AlertCondition::AbnormalHeartRate, 20, 2))
        .await
        .unwrap();

    let delivered = sink.alerts();
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].condition, AlertCondition::LowBloodSaturation);
    assert_eq!(delivered[1].condition, AlertCondition::AbnormalHeartRate);

    assert_eq!(sink.drain().len(), 2);
    assert!(sink.alerts().is_empty());
}

#[tokio::test]
async fn manager_respects_routes() {
    let all = Arc::new(MemorySink::new());
    let urgent = Arc::new(MemorySink::new());
    let sinks: Vec<Arc<dyn AlertSink>> = vec![all.clone(), urgent.clone()];
    let manager = NotificationManager::new(
        sinks,
        vec![
            SinkRoute {
                min_priority: 0,
                sink_index: 0,
            },
            SinkRoute {
                min_priority: 3,
                sink_index: 1,
            },
        ],
    );

    manager
        .notify_all(&[
            alert(AlertCondition::IrregularHeartBeat, 1, 1),
            alert(AlertCondition::CriticalBloodPressureThreshold, 2, 3),
        ])
        .await;

    assert_eq!(all.alerts().len(), 2);
    let urgent = urgent.alerts();
    assert_eq!(urgent.len(), 1);
    assert_eq!(
        urgent[0].condition,
        AlertCondition::CriticalBloodPressureThreshold
    );
}

#[tokio::test]
async fn failing_sink_does_not_block_others() {
    let memory = Arc::new(MemorySink::new());
    let sinks: Vec<Arc<dyn AlertSink>> =
        vec![Arc::new(FailingSink), Arc::new(LogSink), memory.clone()];
    let manager = NotificationManager::broadcast(sinks);

    manager
        .notify(&alert(AlertCondition::HypotensiveHypoxemiaAlert, 5, 3))
        .await;

    assert_eq!(memory.alerts().len(), 1);
    assert_eq!(manager.sinks().len(), 3);
}

#[tokio::test]
async fn route_to_missing_sink_is_ignored() {
    let memory = Arc::new(MemorySink::new());
    let sinks: Vec<Arc<dyn AlertSink>> = vec![memory.clone()];
    let manager = NotificationManager::new(
        sinks,
        vec![SinkRoute {
            min_priority: 0,
            sink_index: 4,
        }],
    );
    manager
        .notify(&alert(AlertCondition::LowBloodSaturation, 1, 2))
        .await;
    assert!(memory.alerts().is_empty());
}

#[tokio::test]
async fn file_sink_appends_json_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alerts").join("out.jsonl");
    let sink = FileSink::new(&path).unwrap();

    sink.send(&alert(AlertCondition::LowBloodSaturation, 100, 2))
        .await
        .unwrap();
    sink.send(&Alert::new(7, AlertCondition::IrregularHeartBeat, 200).with_repeat_count(2))
        .await
        .unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: Alert = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first.condition, AlertCondition::LowBloodSaturation);
    assert_eq!(first.priority, Some(2));

    let second: Alert = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second.timestamp, 200);
    assert_eq!(second.repeat_count, Some(2));
    assert_eq!(second.priority, None);
}

#[test]
fn file_sink_rejects_empty_path() {
    assert!(matches!(
        FileSink::new(""),
        Err(NotifyError::InvalidConfig(_))
    ));
}
