use crate::error_code::{resolve_error, RpcErrorCode, UNKNOWN_ERROR_KEY};
use crate::i18n::MessageCatalog;
use crate::transport::{RpcFault, TransportError};

/// Errors surfaced by the player proxy and everything built on top of it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AimpError {
    /// The server answered with an error object.
    #[error("{localized} (code {code}): {message}")]
    Rpc {
        code: RpcErrorCode,
        message: String,
        localized: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Malformed response: {0}")]
    InvalidResponse(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl AimpError {
    /// Converts a transport failure, resolving fault codes through `catalog`.
    pub fn from_transport(err: TransportError, catalog: &MessageCatalog) -> Self {
        match err {
            TransportError::Fault(RpcFault { code, message }) => AimpError::Rpc {
                code: RpcErrorCode::from_code(code),
                message,
                localized: resolve_error(code, catalog),
            },
            TransportError::Http(msg) => AimpError::Http(msg),
            TransportError::Timeout(msg) => AimpError::Timeout(msg),
            TransportError::InvalidResponse(msg) => AimpError::InvalidResponse(msg),
            TransportError::Configuration(msg) => AimpError::Configuration(msg),
        }
    }

    /// Raw `{code, message}` pair when the server reported the failure.
    pub fn fault(&self) -> Option<RpcFault> {
        match self {
            AimpError::Rpc { code, message, .. } => Some(RpcFault {
                code: code.code(),
                message: message.clone(),
            }),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<RpcErrorCode> {
        match self {
            AimpError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// User-presentable message.
    ///
    /// Server faults carry the message resolved when they were received;
    /// local failures use the generic unknown-error text plus a description.
    pub fn localized_message(&self, catalog: &MessageCatalog) -> String {
        match self {
            AimpError::Rpc { localized, .. } => localized.clone(),
            other => format!("{}: {}", catalog.text(UNKNOWN_ERROR_KEY), other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AimpError>;
