//! SOME/IP Transport Protocol (TP) for large message segmentation.
//!
//! SOME/IP-TP carries messages larger than a datagram MTU by splitting
//! them into typed segments and reassembling them on the receiver. The
//! sender side is [`TpSegmenter`]; the receiver side is
//! [`TpReassembler`], which accepts segments in any order, tolerates
//! duplicates, and ages out incomplete transfers.
//!
//! # Example
//!
//! ```
//! use someip_core::tp::{TpConfig, TpReassembler, TpSegmenter};
//! use someip_core::{MethodId, ServiceId, SomeIpMessage};
//!
//! let config = TpConfig::default().with_max_segment_size(1400);
//! let segmenter = TpSegmenter::new(config.clone()).unwrap();
//! let reassembler = TpReassembler::with_config(config);
//!
//! let message = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
//!     .payload(vec![0u8; 5000])
//!     .build();
//!
//! let mut delivered = None;
//! for segment in segmenter.segment_message(&message).unwrap() {
//!     delivered = reassembler.process_segment(&segment).unwrap();
//! }
//! assert_eq!(delivered.unwrap(), message.payload);
//! ```

mod reassembly;
mod segment;
mod segmenter;
mod types;

pub use reassembly::{TpCompletionCallback, TpReassembler};
pub use segment::{TpSegment, TpSegmentHeader, TP_SEGMENT_HEADER_SIZE};
pub use segmenter::TpSegmenter;
pub use types::{TpConfig, TpMessageType, TpStatistics};
