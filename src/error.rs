//! Error types for SOME/IP operations.

use std::io;
use thiserror::Error;

/// Errors that can occur while encoding, decoding, segmenting or
/// reassembling SOME/IP data.
#[derive(Error, Debug)]
pub enum SomeIpError {
    /// I/O error from a caller-supplied stream (framing layer only).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input ended before the expected number of bytes.
    #[error("Message too short: expected at least {expected} bytes, got {actual}")]
    MessageTooShort { expected: usize, actual: usize },

    /// A read would cross the end of the buffer.
    #[error("Buffer underrun: needed {needed} bytes, {available} available")]
    BufferUnderrun { needed: usize, available: usize },

    /// Header length field disagrees with the actual byte count.
    #[error("Message length mismatch: header says {header_length} bytes, got {actual_length}")]
    LengthMismatch {
        header_length: u32,
        actual_length: usize,
    },

    /// Input bytes do not fit the wire grammar.
    #[error("Malformed message: {0}")]
    Malformed(String),

    /// Unknown message type value.
    #[error("Unknown message type: 0x{0:02X}")]
    UnknownMessageType(u8),

    /// Unknown return code value.
    #[error("Unknown return code: 0x{0:02X}")]
    UnknownReturnCode(u8),

    /// Unknown SD entry type value.
    #[error("Unknown SD entry type: 0x{0:02X}")]
    UnknownEntryType(u8),

    /// Wrong protocol version.
    #[error("Wrong protocol version: expected 0x01, got 0x{0:02X}")]
    WrongProtocolVersion(u8),

    /// Wrong interface version.
    #[error("Wrong interface version: expected 0x01, got 0x{0:02X}")]
    WrongInterfaceVersion(u8),

    /// Payload exceeds the transport ceiling.
    #[error("Payload too large: {size} bytes exceeds maximum of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    /// Message exceeds the configured TP limit and cannot be segmented.
    #[error("Message too large for TP: {size} bytes exceeds maximum of {max} bytes")]
    MessageTooLarge { size: usize, max: usize },

    /// TP segment failed structural validation.
    #[error("Invalid TP segment: {0}")]
    InvalidSegment(String),

    /// A configured capacity bound was hit.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Operation timed out.
    #[error("Operation timed out")]
    Timeout,

    /// The API was called with an invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The API was called in a state that does not permit the operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias for SOME/IP operations.
pub type Result<T> = std::result::Result<T, SomeIpError>;

/// Transport-facing error classification.
///
/// Collapses the structured [`SomeIpError`] variants onto the stable code
/// set a transport or diagnostic layer reports, so callers can map errors
/// without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    Success,
    NetworkError,
    ConnectionLost,
    ConnectionRefused,
    Timeout,
    InvalidEndpoint,
    InvalidMessage,
    InvalidMessageType,
    InvalidServiceId,
    InvalidMethodId,
    InvalidProtocolVersion,
    InvalidInterfaceVersion,
    MalformedMessage,
    InvalidSessionId,
    SessionExpired,
    SessionNotFound,
    OutOfMemory,
    BufferOverflow,
    ResourceExhausted,
    ServiceNotFound,
    ServiceUnavailable,
    SubscriptionFailed,
    SafetyViolation,
    FaultDetected,
    RecoveryFailed,
    NotImplemented,
    InvalidArgument,
    PermissionDenied,
    InternalError,
    NotInitialized,
    InvalidState,
    UnknownError,
}

impl SomeIpError {
    /// Create a new malformed-message error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Create a new invalid-segment error.
    pub fn invalid_segment(msg: impl Into<String>) -> Self {
        Self::InvalidSegment(msg.into())
    }

    /// Classify this error onto the transport-facing code set.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::NetworkError,
            Self::MessageTooShort { .. }
            | Self::BufferUnderrun { .. }
            | Self::LengthMismatch { .. }
            | Self::Malformed(_)
            | Self::UnknownReturnCode(_)
            | Self::UnknownEntryType(_)
            | Self::InvalidSegment(_) => ErrorKind::MalformedMessage,
            Self::UnknownMessageType(_) => ErrorKind::InvalidMessageType,
            Self::WrongProtocolVersion(_) => ErrorKind::InvalidProtocolVersion,
            Self::WrongInterfaceVersion(_) => ErrorKind::InvalidInterfaceVersion,
            Self::PayloadTooLarge { .. } | Self::MessageTooLarge { .. } => {
                ErrorKind::BufferOverflow
            }
            Self::ResourceExhausted(_) => ErrorKind::ResourceExhausted,
            Self::Timeout => ErrorKind::Timeout,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::InvalidState(_) => ErrorKind::InvalidState,
        }
    }

    /// Check whether this error means the input bytes were structurally
    /// bad (as opposed to a resource, timing or argument problem).
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MalformedMessage | ErrorKind::InvalidMessageType
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SomeIpError::UnknownMessageType(0xFF);
        assert_eq!(format!("{err}"), "Unknown message type: 0xFF");

        let err = SomeIpError::MessageTooShort {
            expected: 16,
            actual: 8,
        };
        assert_eq!(
            format!("{err}"),
            "Message too short: expected at least 16 bytes, got 8"
        );
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            SomeIpError::malformed("bad").kind(),
            ErrorKind::MalformedMessage
        );
        assert_eq!(
            SomeIpError::invalid_segment("bad range").kind(),
            ErrorKind::MalformedMessage
        );
        assert_eq!(SomeIpError::Timeout.kind(), ErrorKind::Timeout);
        assert_eq!(
            SomeIpError::ResourceExhausted("buffers".into()).kind(),
            ErrorKind::ResourceExhausted
        );
        assert_eq!(
            SomeIpError::MessageTooLarge { size: 2, max: 1 }.kind(),
            ErrorKind::BufferOverflow
        );
    }

    #[test]
    fn test_structural_classification() {
        assert!(SomeIpError::BufferUnderrun {
            needed: 4,
            available: 1
        }
        .is_structural());
        assert!(!SomeIpError::Timeout.is_structural());
        assert!(!SomeIpError::InvalidArgument("x".into()).is_structural());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "test");
        let err: SomeIpError = io_err.into();
        assert!(matches!(err, SomeIpError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::NetworkError);
    }
}
