//! Core SOME/IP types and constants.

/// SOME/IP protocol version (always 0x01).
pub const PROTOCOL_VERSION: u8 = 0x01;

/// SOME/IP interface version carried by this stack (always 0x01).
pub const INTERFACE_VERSION: u8 = 0x01;

/// SOME/IP message types as defined in the specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Request expecting a response.
    Request = 0x00,
    /// Request not expecting a response (fire-and-forget).
    RequestNoReturn = 0x01,
    /// Cyclic or event-based notification.
    Notification = 0x02,
    /// Acknowledgment for a request.
    RequestAck = 0x40,
    /// Response to a request.
    Response = 0x80,
    /// Error response to a request.
    Error = 0x81,
    /// Acknowledgment for a response.
    ResponseAck = 0xC0,
    /// Acknowledgment for an error response.
    ErrorAck = 0xC1,
    /// Segmented request.
    TpRequest = 0x20,
    /// Segmented request not expecting a response.
    TpRequestNoReturn = 0x21,
    /// Segmented notification.
    TpNotification = 0x22,
}

impl MessageType {
    /// Create a MessageType from a raw byte value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Request),
            0x01 => Some(Self::RequestNoReturn),
            0x02 => Some(Self::Notification),
            0x40 => Some(Self::RequestAck),
            0x80 => Some(Self::Response),
            0x81 => Some(Self::Error),
            0xC0 => Some(Self::ResponseAck),
            0xC1 => Some(Self::ErrorAck),
            0x20 => Some(Self::TpRequest),
            0x21 => Some(Self::TpRequestNoReturn),
            0x22 => Some(Self::TpNotification),
            _ => None,
        }
    }

    /// Check if this is a request message type.
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Self::Request | Self::RequestNoReturn | Self::TpRequest | Self::TpRequestNoReturn
        )
    }

    /// Check if this is a response message type.
    pub fn is_response(&self) -> bool {
        matches!(
            self,
            Self::Response | Self::Error | Self::ResponseAck | Self::ErrorAck
        )
    }

    /// Check if this message type expects a response.
    pub fn expects_response(&self) -> bool {
        matches!(self, Self::Request | Self::TpRequest)
    }

    /// Check if this message type carries a TP-segmented payload.
    pub fn uses_tp(&self) -> bool {
        matches!(
            self,
            Self::TpRequest | Self::TpRequestNoReturn | Self::TpNotification
        )
    }

    /// Get the ACK variant of this message type, if one exists.
    pub fn ack_type(&self) -> Option<Self> {
        match self {
            Self::Request | Self::TpRequest => Some(Self::RequestAck),
            Self::Response => Some(Self::ResponseAck),
            Self::Error => Some(Self::ErrorAck),
            _ => None,
        }
    }
}

/// SOME/IP return codes as defined in the specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReturnCode {
    /// No error occurred.
    Ok = 0x00,
    /// An unspecified error occurred.
    NotOk = 0x01,
    /// The requested Service ID is unknown.
    UnknownService = 0x02,
    /// The requested Method ID is unknown.
    UnknownMethod = 0x03,
    /// Service is not ready.
    NotReady = 0x04,
    /// Service is not reachable.
    NotReachable = 0x05,
    /// Timeout occurred.
    Timeout = 0x06,
    /// Wrong protocol version.
    WrongProtocolVersion = 0x07,
    /// Wrong interface version.
    WrongInterfaceVersion = 0x08,
    /// Malformed message.
    MalformedMessage = 0x09,
    /// Wrong message type.
    WrongMessageType = 0x0A,
    /// E2E repeated.
    E2ERepeated = 0x0B,
    /// E2E wrong sequence.
    E2EWrongSequence = 0x0C,
    /// E2E error (not further specified).
    E2E = 0x0D,
    /// E2E not available.
    E2ENotAvailable = 0x0E,
    /// E2E no new data.
    E2ENoNewData = 0x0F,
}

impl ReturnCode {
    /// Create a ReturnCode from a raw byte value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Ok),
            0x01 => Some(Self::NotOk),
            0x02 => Some(Self::UnknownService),
            0x03 => Some(Self::UnknownMethod),
            0x04 => Some(Self::NotReady),
            0x05 => Some(Self::NotReachable),
            0x06 => Some(Self::Timeout),
            0x07 => Some(Self::WrongProtocolVersion),
            0x08 => Some(Self::WrongInterfaceVersion),
            0x09 => Some(Self::MalformedMessage),
            0x0A => Some(Self::WrongMessageType),
            0x0B => Some(Self::E2ERepeated),
            0x0C => Some(Self::E2EWrongSequence),
            0x0D => Some(Self::E2E),
            0x0E => Some(Self::E2ENotAvailable),
            0x0F => Some(Self::E2ENoNewData),
            _ => None,
        }
    }

    /// Check if this return code indicates success.
    pub fn is_ok(&self) -> bool {
        *self == Self::Ok
    }

    /// Check if this return code indicates an error.
    pub fn is_error(&self) -> bool {
        *self != Self::Ok
    }
}

impl Default for ReturnCode {
    fn default() -> Self {
        Self::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_from_u8() {
        assert_eq!(MessageType::from_u8(0x00), Some(MessageType::Request));
        assert_eq!(MessageType::from_u8(0x40), Some(MessageType::RequestAck));
        assert_eq!(MessageType::from_u8(0x80), Some(MessageType::Response));
        assert_eq!(MessageType::from_u8(0xC1), Some(MessageType::ErrorAck));
        assert_eq!(MessageType::from_u8(0x22), Some(MessageType::TpNotification));
        assert_eq!(MessageType::from_u8(0xFF), None);
        assert_eq!(MessageType::from_u8(0x23), None);
    }

    #[test]
    fn test_request_response_sets() {
        assert!(MessageType::Request.is_request());
        assert!(MessageType::RequestNoReturn.is_request());
        assert!(MessageType::TpRequest.is_request());
        assert!(MessageType::TpRequestNoReturn.is_request());
        assert!(!MessageType::Notification.is_request());

        assert!(MessageType::Response.is_response());
        assert!(MessageType::Error.is_response());
        assert!(MessageType::ResponseAck.is_response());
        assert!(MessageType::ErrorAck.is_response());
        assert!(!MessageType::RequestAck.is_response());
    }

    #[test]
    fn test_uses_tp() {
        assert!(MessageType::TpRequest.uses_tp());
        assert!(MessageType::TpRequestNoReturn.uses_tp());
        assert!(MessageType::TpNotification.uses_tp());
        assert!(!MessageType::Request.uses_tp());
        assert!(!MessageType::Response.uses_tp());
    }

    #[test]
    fn test_ack_type() {
        assert_eq!(MessageType::Request.ack_type(), Some(MessageType::RequestAck));
        assert_eq!(MessageType::Response.ack_type(), Some(MessageType::ResponseAck));
        assert_eq!(MessageType::Error.ack_type(), Some(MessageType::ErrorAck));
        assert_eq!(MessageType::Notification.ack_type(), None);
    }

    #[test]
    fn test_return_code_from_u8() {
        assert_eq!(ReturnCode::from_u8(0x00), Some(ReturnCode::Ok));
        assert_eq!(ReturnCode::from_u8(0x02), Some(ReturnCode::UnknownService));
        assert_eq!(ReturnCode::from_u8(0x0F), Some(ReturnCode::E2ENoNewData));
        assert_eq!(ReturnCode::from_u8(0x10), None);
        assert_eq!(ReturnCode::from_u8(0xFF), None);
    }

    #[test]
    fn test_return_code_is_ok() {
        assert!(ReturnCode::Ok.is_ok());
        assert!(!ReturnCode::NotOk.is_ok());
        assert!(ReturnCode::Timeout.is_error());
    }
}
