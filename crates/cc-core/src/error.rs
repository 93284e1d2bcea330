use thiserror::Error;

/// No candidate port in the range could be opened.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("could not open socket: {target} ports {first_port}-{last_port}")]
    NoSocket {
        target: String,
        first_port: u16,
        last_port: u16,
    },

    #[error("accept failed on port {port}: {reason}")]
    Accept { port: u16, reason: String },
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unexpected envelope: expected {expected}, got {actual}")]
    UnexpectedEnvelope {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("envelope exceeds max: {size} > {max}")]
    TooLarge { size: usize, max: usize },
}
