//! Error types for the transport layer.

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The listener could not be bound.
    #[error("bind failed: {0}")]
    BindFailed(#[source] std::io::Error),
}
