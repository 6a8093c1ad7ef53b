use vitalwatch_common::types::RecordType;

/// Errors returned synchronously by the ingestion path.
///
/// Anything that reaches a timeline has already passed validation, so the
/// query and evaluation paths never see these.
///
/// # Examples
///
/// ```rust
/// use vitalwatch_common::types::RecordType;
/// use vitalwatch_storage::error::StorageError;
///
/// let err = StorageError::InvalidMeasurement {
///     record_type: RecordType::BloodPressure,
///     reason: "expected a systolic/diastolic pair, got scalar".into(),
/// };
/// assert!(err.to_string().contains("BloodPressure"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The value shape does not match what the record type requires, or the
    /// value is not a finite number.
    #[error("Storage: invalid {record_type} measurement: {reason}")]
    InvalidMeasurement {
        record_type: RecordType,
        reason: String,
    },
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
