/// Errors that can occur while delivering alerts.
///
/// # Examples
///
/// ```rust
/// use vitalwatch_notify::error::NotifyError;
///
/// let err = NotifyError::InvalidConfig("file sink path is empty".to_string());
/// assert!(err.to_string().contains("file sink"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Sink configuration is missing a required field or contains an invalid value.
    #[error("Notify: invalid sink configuration: {0}")]
    InvalidConfig(String),

    /// Writing to a file-backed sink failed.
    #[error("Notify: I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing an alert failed.
    #[error("Notify: JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic delivery error for cases not covered by other variants.
    #[error("Notify: {0}")]
    Other(String),
}

/// Convenience `Result` alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
