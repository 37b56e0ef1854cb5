//! SOME/IP-TP segment codec.

use bytes::Bytes;

use crate::error::{Result, SomeIpError};
use crate::wire::{Reader, Writer};

use super::types::TpMessageType;

/// Size of the TP segment header in bytes.
pub const TP_SEGMENT_HEADER_SIZE: usize = 10;

/// TP segment header, 10 bytes on the wire, big-endian:
///
/// ```text
/// +--------------------------------+
/// |      Message Length (32)       |
/// +----------------+---------------+
/// |  Offset (16)   |  Length (16)  |
/// +--------+-------+---------------+
/// | Seq(8) | Type(8) |
/// +--------+---------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TpSegmentHeader {
    /// Total payload length of the reassembled message.
    pub message_length: u32,
    /// Position of this segment within the reassembled payload.
    pub segment_offset: u16,
    /// Length of this segment's payload.
    pub segment_length: u16,
    /// Sequence number shared by all segments of one message.
    pub sequence_number: u8,
    /// Segment type.
    pub message_type: TpMessageType,
}

impl TpSegmentHeader {
    /// Parse a segment header from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        Self::read_from(&mut reader)
    }

    pub(crate) fn read_from(reader: &mut Reader<'_>) -> Result<Self> {
        let message_length = reader.read_u32()?;
        let segment_offset = reader.read_u16()?;
        let segment_length = reader.read_u16()?;
        let sequence_number = reader.read_u8()?;
        let type_byte = reader.read_u8()?;

        let message_type = TpMessageType::from_u8(type_byte).ok_or_else(|| {
            SomeIpError::invalid_segment(format!("unknown TP segment type 0x{type_byte:02X}"))
        })?;

        Ok(Self {
            message_length,
            segment_offset,
            segment_length,
            sequence_number,
            message_type,
        })
    }

    /// Serialize the segment header to bytes.
    pub fn to_bytes(&self) -> [u8; TP_SEGMENT_HEADER_SIZE] {
        let mut writer = Writer::with_capacity(TP_SEGMENT_HEADER_SIZE);
        self.write_to(&mut writer);

        let mut buf = [0u8; TP_SEGMENT_HEADER_SIZE];
        buf.copy_from_slice(writer.as_bytes());
        buf
    }

    pub(crate) fn write_to(&self, writer: &mut Writer) {
        writer.write_u32(self.message_length);
        writer.write_u16(self.segment_offset);
        writer.write_u16(self.segment_length);
        writer.write_u8(self.sequence_number);
        writer.write_u8(self.message_type as u8);
    }
}

/// A single TP segment: typed header plus payload bytes.
///
/// For [`TpMessageType::FirstSegment`] and
/// [`TpMessageType::SingleMessage`] the payload begins with the 16-byte
/// SOME/IP header of the carried message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TpSegment {
    /// Segment header.
    pub header: TpSegmentHeader,
    /// Segment payload.
    pub payload: Bytes,
}

impl TpSegment {
    /// Create a new TP segment.
    pub fn new(header: TpSegmentHeader, payload: Bytes) -> Self {
        Self { header, payload }
    }

    /// Parse a TP segment from bytes.
    ///
    /// The byte count after the header must match the declared segment
    /// length exactly.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        let header = TpSegmentHeader::read_from(&mut reader)?;

        if reader.remaining() != header.segment_length as usize {
            return Err(SomeIpError::invalid_segment(format!(
                "declared segment length {} but {} payload bytes present",
                header.segment_length,
                reader.remaining()
            )));
        }

        let payload = Bytes::copy_from_slice(reader.read_bytes(reader.remaining())?);
        Ok(Self { header, payload })
    }

    /// Serialize the segment to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = Writer::with_capacity(TP_SEGMENT_HEADER_SIZE + self.payload.len());
        self.header.write_to(&mut writer);
        writer.write_bytes(&self.payload);
        writer.into_bytes()
    }

    /// Get the sequence number.
    pub fn sequence_number(&self) -> u8 {
        self.header.sequence_number
    }

    /// Check if this is the last segment of a multi-segment message.
    pub fn is_last(&self) -> bool {
        self.header.message_type == TpMessageType::LastSegment
    }
}
