//! Wire-level core of a SOME/IP (Scalable service-Oriented MiddlewarE
//! over IP) protocol stack, commonly used in automotive applications.
//!
//! This crate covers everything that touches bytes on the wire and
//! nothing that touches the operating system:
//!
//! - Complete SOME/IP message header codec and validation
//! - Payload serialization primitives (big-endian scalars, strings,
//!   arrays, alignment)
//! - SOME/IP-TP segmentation and reassembly for messages larger than a
//!   datagram MTU
//! - SOME/IP-SD (Service Discovery) entry and option codec
//! - Stream framing for byte-stream transports
//!
//! Sockets, RPC facades and discovery policy are external collaborators;
//! they cross into this crate only through the codec, segmenter and
//! reassembler entry points, all of which transform bytes to structured
//! values and back.
//!
//! # Example
//!
//! ```
//! use someip_core::{ClientId, MethodId, ServiceId, SomeIpMessage};
//!
//! let request = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
//!     .client_id(ClientId(0x0100))
//!     .payload(b"hello".as_slice())
//!     .build();
//!
//! let bytes = request.to_bytes();
//! let parsed = SomeIpMessage::from_bytes(&bytes).unwrap();
//! assert_eq!(parsed, request);
//! assert!(parsed.is_valid());
//! ```
//!
//! # Protocol Overview
//!
//! SOME/IP messages consist of a 16-byte header followed by an optional
//! payload:
//!
//! ```text
//! +--------+--------+--------+--------+
//! |    Service ID   |   Method ID     |  (4 bytes)
//! +--------+--------+--------+--------+
//! |           Length                  |  (4 bytes)
//! +--------+--------+--------+--------+
//! |    Client ID    |   Session ID    |  (4 bytes)
//! +--------+--------+--------+--------+
//! |Proto|Iface|MsgType|RetCode|          (4 bytes)
//! +--------+--------+--------+--------+
//! |           Payload ...             |  (variable)
//! +--------+--------+--------+--------+
//! ```

pub mod codec;
pub mod error;
pub mod header;
pub mod message;
pub mod sd;
pub mod tp;
pub mod types;
pub mod wire;

// Re-export commonly used types at the crate root
pub use error::{ErrorKind, Result, SomeIpError};
pub use header::{ClientId, MethodId, ServiceId, SessionId, SomeIpHeader, HEADER_SIZE};
pub use message::{MessageBuilder, SomeIpMessage, MAX_TCP_PAYLOAD_SIZE, MAX_UDP_PAYLOAD_SIZE};
pub use tp::{TpConfig, TpReassembler, TpSegment, TpSegmenter};
pub use types::{MessageType, ReturnCode, INTERFACE_VERSION, PROTOCOL_VERSION};
