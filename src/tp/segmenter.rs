//! SOME/IP-TP message segmentation.

use std::sync::atomic::{AtomicU8, Ordering};

use bytes::Bytes;
use tracing::debug;

use crate::error::{Result, SomeIpError};
use crate::header::HEADER_SIZE;
use crate::message::SomeIpMessage;

use super::segment::{TpSegment, TpSegmentHeader};
use super::types::{TpConfig, TpMessageType};

/// Splits serialized SOME/IP messages into TP segments that fit a
/// datagram transport.
///
/// A message whose serialized form (header + payload) fits in one
/// segment becomes a single [`TpMessageType::SingleMessage`]; anything
/// larger becomes FIRST (carrying the 16-byte SOME/IP header plus the
/// leading payload bytes), CONSECUTIVE chunks of exactly
/// `max_segment_size`, and one LAST with the remainder. All segments of
/// one message share a sequence number drawn from an atomic counter that
/// wraps at 256, so concurrent callers need no external serialization.
#[derive(Debug)]
pub struct TpSegmenter {
    config: TpConfig,
    next_sequence: AtomicU8,
}

impl TpSegmenter {
    /// Create a new segmenter.
    ///
    /// Fails if the configured segment size cannot hold the SOME/IP
    /// header plus at least one payload byte.
    pub fn new(config: TpConfig) -> Result<Self> {
        if config.max_segment_size <= HEADER_SIZE {
            return Err(SomeIpError::InvalidArgument(format!(
                "max_segment_size {} must exceed the {HEADER_SIZE}-byte SOME/IP header",
                config.max_segment_size
            )));
        }

        Ok(Self {
            config,
            next_sequence: AtomicU8::new(0),
        })
    }

    /// Get the active configuration.
    pub fn config(&self) -> &TpConfig {
        &self.config
    }

    /// Check if a message would be split into multiple segments.
    pub fn needs_segmentation(&self, message: &SomeIpMessage) -> bool {
        message.total_size() > self.config.max_segment_size
    }

    /// Split a message into ordered TP segments.
    ///
    /// Fails with a message-too-large error when the payload exceeds the
    /// configured maximum message size.
    pub fn segment_message(&self, message: &SomeIpMessage) -> Result<Vec<TpSegment>> {
        let payload = &message.payload;
        let total_length = payload.len();

        if total_length > self.config.max_message_size {
            return Err(SomeIpError::MessageTooLarge {
                size: total_length,
                max: self.config.max_message_size,
            });
        }

        let sequence_number = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        let serialized = message.to_bytes();

        if serialized.len() <= self.config.max_segment_size {
            let segment = TpSegment::new(
                TpSegmentHeader {
                    message_length: total_length as u32,
                    segment_offset: 0,
                    segment_length: serialized.len() as u16,
                    sequence_number,
                    message_type: TpMessageType::SingleMessage,
                },
                Bytes::from(serialized),
            );
            return Ok(vec![segment]);
        }

        let mut segments = Vec::new();

        // First segment: SOME/IP header plus the leading payload bytes.
        let first_chunk = (self.config.max_segment_size - HEADER_SIZE).min(total_length);
        let mut first_payload = Vec::with_capacity(HEADER_SIZE + first_chunk);
        first_payload.extend_from_slice(&serialized[..HEADER_SIZE]);
        first_payload.extend_from_slice(&payload[..first_chunk]);

        segments.push(TpSegment::new(
            TpSegmentHeader {
                message_length: total_length as u32,
                segment_offset: 0,
                segment_length: first_payload.len() as u16,
                sequence_number,
                message_type: TpMessageType::FirstSegment,
            },
            Bytes::from(first_payload),
        ));

        let mut offset = first_chunk;
        while offset < total_length {
            // The wire format addresses segments with a 16-bit offset;
            // refuse to emit an offset that would truncate.
            if offset > u16::MAX as usize {
                return Err(SomeIpError::MessageTooLarge {
                    size: total_length,
                    max: u16::MAX as usize + self.config.max_segment_size,
                });
            }

            let remaining = total_length - offset;
            let chunk = remaining.min(self.config.max_segment_size);
            let message_type = if remaining <= self.config.max_segment_size {
                TpMessageType::LastSegment
            } else {
                TpMessageType::ConsecutiveSegment
            };

            segments.push(TpSegment::new(
                TpSegmentHeader {
                    message_length: total_length as u32,
                    segment_offset: offset as u16,
                    segment_length: chunk as u16,
                    sequence_number,
                    message_type,
                },
                payload.slice(offset..offset + chunk),
            ));

            offset += chunk;
        }

        debug!(
            sequence = sequence_number,
            segments = segments.len(),
            payload_bytes = total_length,
            "segmented message"
        );

        Ok(segments)
    }
}

impl Default for TpSegmenter {
    fn default() -> Self {
        Self {
            config: TpConfig::default(),
            next_sequence: AtomicU8::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{MethodId, ServiceId};

    fn segmenter(max_segment_size: usize) -> TpSegmenter {
        TpSegmenter::new(TpConfig::default().with_max_segment_size(max_segment_size)).unwrap()
    }

    #[test]
    fn test_rejects_unusable_segment_size() {
        let result = TpSegmenter::new(TpConfig::default().with_max_segment_size(16));
        assert!(matches!(result, Err(SomeIpError::InvalidArgument(_))));
    }

    #[test]
    fn test_single_message() {
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(b"small".as_slice())
            .build();

        let segments = segmenter(100).segment_message(&msg).unwrap();
        assert_eq!(segments.len(), 1);

        let segment = &segments[0];
        assert_eq!(segment.header.message_type, TpMessageType::SingleMessage);
        assert_eq!(segment.header.message_length, 5);
        assert_eq!(segment.header.segment_offset, 0);
        assert_eq!(segment.header.segment_length, 21); // 16 + 5
        assert_eq!(segment.payload, Bytes::from(msg.to_bytes()));
    }

    #[test]
    fn test_serialized_size_exactly_max_is_single() {
        // 16-byte header + 84 payload = exactly 100.
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(vec![0x11u8; 84])
            .build();

        let tp = segmenter(100);
        assert!(!tp.needs_segmentation(&msg));

        let segments = tp.segment_message(&msg).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].header.message_type, TpMessageType::SingleMessage);
    }

    #[test]
    fn test_multi_segment_split() {
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(vec![0x55u8; 350])
            .build();

        let segments = segmenter(100).segment_message(&msg).unwrap();
        assert_eq!(segments.len(), 4);

        assert_eq!(segments[0].header.message_type, TpMessageType::FirstSegment);
        assert_eq!(segments[0].header.segment_offset, 0);
        assert_eq!(segments[0].payload.len(), 100); // 16-byte header + 84 payload

        assert_eq!(segments[1].header.message_type, TpMessageType::ConsecutiveSegment);
        assert_eq!(segments[1].header.segment_offset, 84);
        assert_eq!(segments[1].payload.len(), 100);

        assert_eq!(segments[2].header.message_type, TpMessageType::ConsecutiveSegment);
        assert_eq!(segments[2].header.segment_offset, 184);
        assert_eq!(segments[2].payload.len(), 100);

        assert_eq!(segments[3].header.message_type, TpMessageType::LastSegment);
        assert_eq!(segments[3].header.segment_offset, 284);
        assert_eq!(segments[3].payload.len(), 66);

        let sequence = segments[0].sequence_number();
        assert!(segments.iter().all(|s| s.sequence_number() == sequence));
        assert!(segments
            .iter()
            .all(|s| s.header.message_length == 350));
        assert!(segments
            .iter()
            .all(|s| s.header.segment_length as usize == s.payload.len()));
    }

    #[test]
    fn test_payload_multiple_of_segment_size_ends_in_last() {
        // After the first segment takes 84 bytes, 200 remain: one
        // consecutive of 100, then a last of exactly 100.
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(vec![0xABu8; 284])
            .build();

        let segments = segmenter(100).segment_message(&msg).unwrap();
        let types: Vec<_> = segments.iter().map(|s| s.header.message_type).collect();
        assert_eq!(
            types,
            vec![
                TpMessageType::FirstSegment,
                TpMessageType::ConsecutiveSegment,
                TpMessageType::LastSegment,
            ]
        );
        // The trailing chunk may be exactly max_segment_size.
        assert_eq!(segments[2].payload.len(), 100);
    }

    #[test]
    fn test_message_too_large() {
        let tp = TpSegmenter::new(
            TpConfig::default()
                .with_max_segment_size(100)
                .with_max_message_size(200),
        )
        .unwrap();

        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(vec![0u8; 201])
            .build();

        let result = tp.segment_message(&msg);
        assert!(matches!(result, Err(SomeIpError::MessageTooLarge { .. })));
    }

    #[test]
    fn test_offset_beyond_u16_refused() {
        // Multi-segment offsets ride in a 16-bit field; a payload whose
        // tail would sit past 65535 cannot be segmented faithfully.
        let tp = segmenter(1400);
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(vec![0u8; 80_000])
            .build();

        let result = tp.segment_message(&msg);
        assert!(matches!(result, Err(SomeIpError::MessageTooLarge { .. })));
    }

    #[test]
    fn test_sequence_counter_advances_and_wraps() {
        let tp = segmenter(100);
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(b"x".as_slice())
            .build();

        let first = tp.segment_message(&msg).unwrap()[0].sequence_number();
        let second = tp.segment_message(&msg).unwrap()[0].sequence_number();
        assert_eq!(second, first.wrapping_add(1));

        for _ in 0..254 {
            tp.segment_message(&msg).unwrap();
        }
        let wrapped = tp.segment_message(&msg).unwrap()[0].sequence_number();
        assert_eq!(wrapped, first);
    }

    #[test]
    fn test_needs_segmentation() {
        let tp = segmenter(100);

        let small = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(vec![0u8; 84])
            .build();
        let large = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(vec![0u8; 85])
            .build();

        assert!(!tp.needs_segmentation(&small));
        assert!(tp.needs_segmentation(&large));
    }
}
