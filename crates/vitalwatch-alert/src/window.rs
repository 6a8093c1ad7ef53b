use std::collections::VecDeque;

/// One timestamped scalar reading kept by an evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub timestamp: i64,
    pub value: f64,
}

/// Recent readings bounded by count and, optionally, by a time span measured
/// against the newest reading rather than the wall clock.
pub struct SlidingWindow {
    span_ms: Option<i64>,
    capacity: usize,
    data: VecDeque<Reading>,
}

impl SlidingWindow {
    /// Window bounded only by `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            span_ms: None,
            capacity: capacity.max(1),
            data: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    /// Window that also drops readings older than `span_ms` before the newest.
    pub fn with_span(span_ms: i64, capacity: usize) -> Self {
        Self {
            span_ms: Some(span_ms),
            ..Self::with_capacity(capacity)
        }
    }

    pub fn push(&mut self, reading: Reading) {
        if self.data.len() == self.capacity {
            self.data.pop_front();
        }
        self.data.push_back(reading);
        self.evict(reading.timestamp);
    }

    /// Drops readings strictly older than `now - span`. A reading exactly
    /// `span` old stays.
    pub fn evict(&mut self, now: i64) {
        let Some(span) = self.span_ms else {
            return;
        };
        let cutoff = now.saturating_sub(span);
        while let Some(front) = self.data.front() {
            if front.timestamp < cutoff {
                self.data.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.data.back()
    }

    /// Highest value currently held.
    pub fn max_value(&self) -> Option<f64> {
        self.data.iter().map(|r| r.value).reduce(f64::max)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
