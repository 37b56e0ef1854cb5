//! SOME/IP message handling.

use bytes::Bytes;

use crate::error::{Result, SomeIpError};
use crate::header::{ClientId, MethodId, ServiceId, SessionId, SomeIpHeader, HEADER_SIZE};
use crate::types::{MessageType, ReturnCode, INTERFACE_VERSION, PROTOCOL_VERSION};

/// Maximum payload size over UDP without TP (MTU minus headers).
pub const MAX_UDP_PAYLOAD_SIZE: usize = 1400;

/// Maximum payload size over TCP: 65535 minus the 8 length-covered
/// header bytes.
pub const MAX_TCP_PAYLOAD_SIZE: usize = 65_527;

/// A complete SOME/IP message (header + payload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SomeIpMessage {
    /// Message header.
    pub header: SomeIpHeader,
    /// Message payload.
    pub payload: Bytes,
}

impl SomeIpMessage {
    /// Create a new message with the given header and payload.
    ///
    /// The header length field is recomputed from the payload.
    pub fn new(mut header: SomeIpHeader, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        header.set_payload_length(payload.len() as u32);
        Self { header, payload }
    }

    /// Create a new message with an empty payload.
    pub fn with_header(header: SomeIpHeader) -> Self {
        Self::new(header, Bytes::new())
    }

    /// Create a request message builder.
    pub fn request(service_id: ServiceId, method_id: MethodId) -> MessageBuilder {
        MessageBuilder::new(service_id, method_id, MessageType::Request)
    }

    /// Create a request-no-return message builder.
    pub fn request_no_return(service_id: ServiceId, method_id: MethodId) -> MessageBuilder {
        MessageBuilder::new(service_id, method_id, MessageType::RequestNoReturn)
    }

    /// Create a notification message builder.
    pub fn notification(service_id: ServiceId, method_id: MethodId) -> MessageBuilder {
        MessageBuilder::new(service_id, method_id, MessageType::Notification)
    }

    /// Create a response to this message.
    pub fn create_response(&self) -> MessageBuilder {
        let mut builder = MessageBuilder::new(
            self.header.service_id,
            self.header.method_id,
            MessageType::Response,
        );
        builder.client_id = self.header.client_id;
        builder.session_id = self.header.session_id;
        builder.interface_version = self.header.interface_version;
        builder
    }

    /// Create an error response to this message.
    pub fn create_error_response(&self, return_code: ReturnCode) -> MessageBuilder {
        let mut builder = self.create_response();
        builder.message_type = MessageType::Error;
        builder.return_code = return_code;
        builder
    }

    /// Parse a message from bytes.
    ///
    /// Fails when the input is shorter than the header, the length field
    /// is below the 8-byte minimum, or the byte count after the header is
    /// not exactly `length - 8`. Out-of-enumeration type or return codes
    /// do NOT fail the decode; [`Self::is_valid`] reports them.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = SomeIpHeader::from_bytes(data)?;

        if header.length < 8 {
            return Err(SomeIpError::malformed(format!(
                "length field {} below minimum of 8",
                header.length
            )));
        }

        let expected_total = HEADER_SIZE + header.payload_length() as usize;
        if data.len() != expected_total {
            return Err(SomeIpError::LengthMismatch {
                header_length: header.length,
                actual_length: data.len().saturating_sub(8),
            });
        }

        let payload = Bytes::copy_from_slice(&data[HEADER_SIZE..]);
        Ok(Self { header, payload })
    }

    /// Serialize the message to bytes.
    ///
    /// The length field is recomputed from the payload before writing, so
    /// a stale header length cannot reach the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut header = self.header.clone();
        header.set_payload_length(self.payload.len() as u32);

        let mut buf = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        buf.extend_from_slice(&header.to_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Check all header-level invariants, reporting the first violation.
    ///
    /// A message is valid iff the protocol and interface versions are
    /// both 1, the length field is consistent with the payload, the type
    /// and return codes are members of their enumerations, and the
    /// payload does not exceed the TCP ceiling. Kept separate from
    /// [`Self::from_bytes`] so a transport can discard malformed frames
    /// without inspecting the structured value.
    pub fn validate(&self) -> Result<()> {
        if self.header.protocol_version != PROTOCOL_VERSION {
            return Err(SomeIpError::WrongProtocolVersion(
                self.header.protocol_version,
            ));
        }
        if self.header.interface_version != INTERFACE_VERSION {
            return Err(SomeIpError::WrongInterfaceVersion(
                self.header.interface_version,
            ));
        }
        if self.header.length as usize != 8 + self.payload.len() {
            return Err(SomeIpError::LengthMismatch {
                header_length: self.header.length,
                actual_length: self.payload.len(),
            });
        }
        if MessageType::from_u8(self.header.message_type).is_none() {
            return Err(SomeIpError::UnknownMessageType(self.header.message_type));
        }
        if ReturnCode::from_u8(self.header.return_code).is_none() {
            return Err(SomeIpError::UnknownReturnCode(self.header.return_code));
        }
        if self.payload.len() > MAX_TCP_PAYLOAD_SIZE {
            return Err(SomeIpError::PayloadTooLarge {
                size: self.payload.len(),
                max: MAX_TCP_PAYLOAD_SIZE,
            });
        }
        Ok(())
    }

    /// Check all header-level invariants; see [`Self::validate`].
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get the total message size (header + payload).
    pub fn total_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Get the typed message type, if the raw byte is a known value.
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_u8(self.header.message_type)
    }

    /// Get the typed return code, if the raw byte is a known value.
    pub fn return_code(&self) -> Option<ReturnCode> {
        ReturnCode::from_u8(self.header.return_code)
    }

    /// Check if this message is a request.
    pub fn is_request(&self) -> bool {
        self.header.is_request()
    }

    /// Check if this message is a response.
    pub fn is_response(&self) -> bool {
        self.header.is_response()
    }

    /// Check if this message carries a TP-segmented payload.
    pub fn uses_tp(&self) -> bool {
        self.header.uses_tp()
    }

    /// Check if this message expects a response.
    pub fn expects_response(&self) -> bool {
        self.message_type().is_some_and(|t| t.expects_response())
    }

    /// Get the service ID.
    pub fn service_id(&self) -> ServiceId {
        self.header.service_id
    }

    /// Get the method ID.
    pub fn method_id(&self) -> MethodId {
        self.header.method_id
    }

    /// Get the client ID.
    pub fn client_id(&self) -> ClientId {
        self.header.client_id
    }

    /// Get the session ID.
    pub fn session_id(&self) -> SessionId {
        self.header.session_id
    }

    /// Check if the return code indicates success.
    pub fn is_ok(&self) -> bool {
        self.header.return_code == ReturnCode::Ok as u8
    }
}

impl std::fmt::Display for SomeIpMessage {
    /// Stable diagnostic form: hex IDs, type and code names, length and
    /// payload size. Payload bytes are never printed.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SomeIpMessage {{ service: {}, method: {}, client: {}, session: {}, type: ",
            self.header.service_id,
            self.header.method_id,
            self.header.client_id,
            self.header.session_id,
        )?;
        match self.message_type() {
            Some(t) => write!(f, "{t:?}")?,
            None => write!(f, "0x{:02X}", self.header.message_type)?,
        }
        write!(f, ", code: ")?;
        match self.return_code() {
            Some(c) => write!(f, "{c:?}")?,
            None => write!(f, "0x{:02X}", self.header.return_code)?,
        }
        write!(
            f,
            ", length: {}, payload: {} bytes }}",
            self.header.length,
            self.payload.len()
        )
    }
}

/// Builder for constructing SOME/IP messages.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    service_id: ServiceId,
    method_id: MethodId,
    pub(crate) client_id: ClientId,
    pub(crate) session_id: SessionId,
    pub(crate) interface_version: u8,
    pub(crate) message_type: MessageType,
    pub(crate) return_code: ReturnCode,
    payload: Bytes,
}

impl MessageBuilder {
    /// Create a new message builder.
    pub fn new(service_id: ServiceId, method_id: MethodId, message_type: MessageType) -> Self {
        Self {
            service_id,
            method_id,
            client_id: ClientId::default(),
            session_id: SessionId::default(),
            interface_version: INTERFACE_VERSION,
            message_type,
            return_code: ReturnCode::Ok,
            payload: Bytes::new(),
        }
    }

    /// Set the client ID.
    pub fn client_id(mut self, client_id: ClientId) -> Self {
        self.client_id = client_id;
        self
    }

    /// Set the session ID.
    pub fn session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = session_id;
        self
    }

    /// Set the interface version.
    pub fn interface_version(mut self, version: u8) -> Self {
        self.interface_version = version;
        self
    }

    /// Set the return code.
    pub fn return_code(mut self, code: ReturnCode) -> Self {
        self.return_code = code;
        self
    }

    /// Set the payload from bytes.
    pub fn payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Set the payload from a Vec<u8>.
    pub fn payload_vec(mut self, payload: Vec<u8>) -> Self {
        self.payload = Bytes::from(payload);
        self
    }

    /// Build the message.
    pub fn build(self) -> SomeIpMessage {
        let header = SomeIpHeader {
            service_id: self.service_id,
            method_id: self.method_id,
            length: 8 + self.payload.len() as u32,
            client_id: self.client_id,
            session_id: self.session_id,
            protocol_version: PROTOCOL_VERSION,
            interface_version: self.interface_version,
            message_type: self.message_type as u8,
            return_code: self.return_code as u8,
        };

        SomeIpMessage {
            header,
            payload: self.payload,
        }
    }
}
