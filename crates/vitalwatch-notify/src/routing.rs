/// Sends alerts with at least `min_priority` to the sink at `sink_index`.
/// Alerts without a priority annotation are treated as priority 0.
#[derive(Debug, Clone, Copy)]
pub struct SinkRoute {
    pub min_priority: u8,
    pub sink_index: usize,
}

impl SinkRoute {
    pub fn should_send(&self, priority: Option<u8>) -> bool {
        priority.unwrap_or(0) >= self.min_priority
    }
}
