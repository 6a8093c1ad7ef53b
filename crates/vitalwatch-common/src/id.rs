use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identity of one measurement record.
pub type RecordId = u64;

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// Hands out the next record id. Ids are unique within the process and
/// increase with creation order; they are never persisted.
pub fn next_record_id() -> RecordId {
    NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed)
}
