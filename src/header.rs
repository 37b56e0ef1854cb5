//! SOME/IP header types and ID newtypes.

use crate::error::{Result, SomeIpError};
use crate::types::{MessageType, ReturnCode, INTERFACE_VERSION, PROTOCOL_VERSION};

/// Size of the SOME/IP header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Service ID - identifies a SOME/IP service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ServiceId(pub u16);

/// Method ID - identifies a method within a service.
/// Bit 15 indicates if this is an event (1) or method (0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MethodId(pub u16);

/// Client ID - identifies the client making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClientId(pub u16);

/// Session ID - unique identifier for a request/response pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionId(pub u16);

impl MethodId {
    /// Check if this method ID represents an event (bit 15 set).
    pub fn is_event(&self) -> bool {
        self.0 & 0x8000 != 0
    }

    /// Create a method ID for an event.
    pub fn event(id: u16) -> Self {
        Self(id | 0x8000)
    }

    /// Create a method ID for a regular method.
    pub fn method(id: u16) -> Self {
        Self(id & 0x7FFF)
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl std::fmt::Display for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// SOME/IP message header (16 bytes).
///
/// ```text
/// +----------------+----------------+----------------+----------------+
/// |   Service ID (16 bits)  |  Method ID (16 bits)                    |
/// +----------------+----------------+----------------+----------------+
/// |           Length (32 bits) - payload length + 8                   |
/// +----------------+----------------+----------------+----------------+
/// |   Client ID (16 bits)   |  Session ID (16 bits)                   |
/// +----------------+----------------+----------------+----------------+
/// | Protocol Ver | Interface Ver | Message Type | Return Code         |
/// +----------------+----------------+----------------+----------------+
/// ```
///
/// The `message_type` and `return_code` fields are stored as raw bytes:
/// decoding keeps out-of-enumeration values so the caller can inspect and
/// reject them; [`crate::SomeIpMessage::is_valid`] enforces membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SomeIpHeader {
    /// Service ID.
    pub service_id: ServiceId,
    /// Method ID.
    pub method_id: MethodId,
    /// Length of payload + 8 bytes (request ID and version/type/code fields).
    pub length: u32,
    /// Client ID.
    pub client_id: ClientId,
    /// Session ID.
    pub session_id: SessionId,
    /// Protocol version (should be 0x01).
    pub protocol_version: u8,
    /// Interface version (should be 0x01).
    pub interface_version: u8,
    /// Raw message type byte; see [`MessageType`].
    pub message_type: u8,
    /// Raw return code byte; see [`ReturnCode`].
    pub return_code: u8,
}

impl SomeIpHeader {
    /// Create a new header with the given service and method IDs.
    pub fn new(service_id: ServiceId, method_id: MethodId) -> Self {
        Self {
            service_id,
            method_id,
            length: 8, // Minimum length (no payload)
            client_id: ClientId::default(),
            session_id: SessionId::default(),
            protocol_version: PROTOCOL_VERSION,
            interface_version: INTERFACE_VERSION,
            message_type: MessageType::Request as u8,
            return_code: ReturnCode::Ok as u8,
        }
    }

    /// Create a header with a specific message type.
    pub fn with_type(service_id: ServiceId, method_id: MethodId, message_type: MessageType) -> Self {
        let mut header = Self::new(service_id, method_id);
        header.message_type = message_type as u8;
        header
    }

    /// Create a response header from a request header.
    pub fn response_from(request: &Self) -> Self {
        Self {
            service_id: request.service_id,
            method_id: request.method_id,
            length: 8,
            client_id: request.client_id,
            session_id: request.session_id,
            protocol_version: PROTOCOL_VERSION,
            interface_version: request.interface_version,
            message_type: MessageType::Response as u8,
            return_code: ReturnCode::Ok as u8,
        }
    }

    /// Create an error response header from a request header.
    pub fn error_from(request: &Self, return_code: ReturnCode) -> Self {
        let mut header = Self::response_from(request);
        header.message_type = MessageType::Error as u8;
        header.return_code = return_code as u8;
        header
    }

    /// Get the payload length (length field minus 8).
    pub fn payload_length(&self) -> u32 {
        self.length.saturating_sub(8)
    }

    /// Set the payload length (updates length field to payload_len + 8).
    pub fn set_payload_length(&mut self, payload_len: u32) {
        self.length = payload_len + 8;
    }

    /// Check if the message type byte is in the request set.
    pub fn is_request(&self) -> bool {
        MessageType::from_u8(self.message_type).is_some_and(|t| t.is_request())
    }

    /// Check if the message type byte is in the response set.
    pub fn is_response(&self) -> bool {
        MessageType::from_u8(self.message_type).is_some_and(|t| t.is_response())
    }

    /// Check if the message type byte denotes a TP-segmented message.
    pub fn uses_tp(&self) -> bool {
        MessageType::from_u8(self.message_type).is_some_and(|t| t.uses_tp())
    }

    /// Parse a header from bytes.
    ///
    /// Only the byte count is checked here; version, type-code and
    /// return-code membership are validation concerns so malformed frames
    /// can still be inspected.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(SomeIpError::MessageTooShort {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        Ok(Self {
            service_id: ServiceId(u16::from_be_bytes([data[0], data[1]])),
            method_id: MethodId(u16::from_be_bytes([data[2], data[3]])),
            length: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            client_id: ClientId(u16::from_be_bytes([data[8], data[9]])),
            session_id: SessionId(u16::from_be_bytes([data[10], data[11]])),
            protocol_version: data[12],
            interface_version: data[13],
            message_type: data[14],
            return_code: data[15],
        })
    }

    /// Serialize the header to bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        buf[0..2].copy_from_slice(&self.service_id.0.to_be_bytes());
        buf[2..4].copy_from_slice(&self.method_id.0.to_be_bytes());
        buf[4..8].copy_from_slice(&self.length.to_be_bytes());
        buf[8..10].copy_from_slice(&self.client_id.0.to_be_bytes());
        buf[10..12].copy_from_slice(&self.session_id.0.to_be_bytes());
        buf[12] = self.protocol_version;
        buf[13] = self.interface_version;
        buf[14] = self.message_type;
        buf[15] = self.return_code;

        buf
    }

    /// Get the message ID (service_id << 16 | method_id).
    pub fn message_id(&self) -> u32 {
        ((self.service_id.0 as u32) << 16) | (self.method_id.0 as u32)
    }

    /// Get the request ID (client_id << 16 | session_id).
    pub fn request_id(&self) -> u32 {
        ((self.client_id.0 as u32) << 16) | (self.session_id.0 as u32)
    }
}

impl Default for SomeIpHeader {
    fn default() -> Self {
        Self::new(ServiceId(0), MethodId(0))
    }
}
