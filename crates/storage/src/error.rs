/// Errors raised by object-store backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object storage is not configured")]
    NotConfigured,

    #[error("Object storage {operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    #[error("Invalid presign expiry: {0}")]
    Presign(String),
}

impl StorageError {
    pub(crate) fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}
