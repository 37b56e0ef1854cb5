//! SOME/IP-TP type definitions.

use std::time::Duration;

/// TP segment types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TpMessageType {
    /// First segment of a multi-segment message; its payload starts with
    /// the 16-byte SOME/IP header.
    FirstSegment = 0x20,
    /// Middle segment carrying payload bytes only.
    ConsecutiveSegment = 0x21,
    /// Final segment of a multi-segment message.
    LastSegment = 0x22,
    /// A complete serialized SOME/IP message in one segment.
    SingleMessage = 0x23,
}

impl TpMessageType {
    /// Create a TpMessageType from a raw byte value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x20 => Some(Self::FirstSegment),
            0x21 => Some(Self::ConsecutiveSegment),
            0x22 => Some(Self::LastSegment),
            0x23 => Some(Self::SingleMessage),
            _ => None,
        }
    }

    /// Check if a segment of this type embeds the SOME/IP header in its
    /// payload.
    pub fn carries_header(&self) -> bool {
        matches!(self, Self::FirstSegment | Self::SingleMessage)
    }
}

/// TP segmentation and reassembly configuration.
#[derive(Debug, Clone)]
pub struct TpConfig {
    /// Maximum segment payload size in bytes (MTU budget).
    pub max_segment_size: usize,
    /// Maximum total message payload size in bytes.
    pub max_message_size: usize,
    /// Maximum number of concurrent reassemblies.
    pub max_concurrent_transfers: usize,
    /// How long an incomplete reassembly may wait for segments.
    pub reassembly_timeout: Duration,
    /// Timeout between retransmission attempts (sender-side knob).
    pub retry_timeout: Duration,
    /// Maximum retransmission attempts (sender-side knob).
    pub max_retries: u32,
}

impl Default for TpConfig {
    fn default() -> Self {
        Self {
            max_segment_size: 1400,
            max_message_size: 1_000_000,
            max_concurrent_transfers: 10,
            reassembly_timeout: Duration::from_millis(5000),
            retry_timeout: Duration::from_millis(500),
            max_retries: 3,
        }
    }
}

impl TpConfig {
    /// Set the maximum segment size.
    pub fn with_max_segment_size(mut self, size: usize) -> Self {
        self.max_segment_size = size;
        self
    }

    /// Set the maximum message size.
    pub fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Set the maximum number of concurrent reassemblies.
    pub fn with_max_concurrent_transfers(mut self, count: usize) -> Self {
        self.max_concurrent_transfers = count;
        self
    }

    /// Set the reassembly timeout.
    pub fn with_reassembly_timeout(mut self, timeout: Duration) -> Self {
        self.reassembly_timeout = timeout;
        self
    }
}

/// Counters kept by the reassembler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TpStatistics {
    /// Segments accepted (including duplicates).
    pub segments_received: u64,
    /// Messages delivered to the caller.
    pub messages_reassembled: u64,
    /// Segments whose range was already fully covered.
    pub duplicate_segments: u64,
    /// Reassemblies dropped by the timeout sweep.
    pub timeouts: u64,
    /// Segments dropped by validation or sequencing.
    pub errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tp_message_type_from_u8() {
        assert_eq!(TpMessageType::from_u8(0x20), Some(TpMessageType::FirstSegment));
        assert_eq!(TpMessageType::from_u8(0x21), Some(TpMessageType::ConsecutiveSegment));
        assert_eq!(TpMessageType::from_u8(0x22), Some(TpMessageType::LastSegment));
        assert_eq!(TpMessageType::from_u8(0x23), Some(TpMessageType::SingleMessage));
        assert_eq!(TpMessageType::from_u8(0x24), None);
    }

    #[test]
    fn test_carries_header() {
        assert!(TpMessageType::FirstSegment.carries_header());
        assert!(TpMessageType::SingleMessage.carries_header());
        assert!(!TpMessageType::ConsecutiveSegment.carries_header());
        assert!(!TpMessageType::LastSegment.carries_header());
    }

    #[test]
    fn test_config_defaults() {
        let config = TpConfig::default();
        assert_eq!(config.max_segment_size, 1400);
        assert_eq!(config.max_message_size, 1_000_000);
        assert_eq!(config.max_concurrent_transfers, 10);
        assert_eq!(config.reassembly_timeout, Duration::from_millis(5000));
        assert_eq!(config.retry_timeout, Duration::from_millis(500));
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_config_builder() {
        let config = TpConfig::default()
            .with_max_segment_size(100)
            .with_reassembly_timeout(Duration::from_millis(10));
        assert_eq!(config.max_segment_size, 100);
        assert_eq!(config.reassembly_timeout, Duration::from_millis(10));
    }
}
