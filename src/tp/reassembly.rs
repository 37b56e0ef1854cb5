//! SOME/IP-TP message reassembly.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{debug, warn};

use crate::error::{ErrorKind, Result, SomeIpError};
use crate::header::HEADER_SIZE;

use super::segment::TpSegment;
use super::types::{TpConfig, TpMessageType, TpStatistics};

/// Callback invoked when a reassembly ends without delivering bytes,
/// carrying the sequence number and the reason (currently always
/// [`ErrorKind::Timeout`]).
pub type TpCompletionCallback = Box<dyn Fn(u8, ErrorKind) + Send + Sync>;

/// Per-sequence reassembly state: the backing byte store, a coverage
/// bitset of equal length, and the creation time used for aging out.
#[derive(Debug)]
struct ReassemblyBuffer {
    data: Vec<u8>,
    covered: Vec<bool>,
    start_time: Instant,
    last_sequence_number: u8,
    complete: bool,
}

impl ReassemblyBuffer {
    fn new(message_length: usize, sequence_number: u8) -> Self {
        Self {
            data: vec![0u8; message_length],
            covered: vec![false; message_length],
            start_time: Instant::now(),
            last_sequence_number: sequence_number,
            complete: false,
        }
    }

    /// Check if every byte in `[offset, offset + length)` is covered.
    fn is_range_covered(&self, offset: usize, length: usize) -> bool {
        if length == 0 {
            return false;
        }
        self.covered[offset..offset + length].iter().all(|&b| b)
    }

    /// Copy bytes in and mark their range covered. Partial overlap is
    /// fine: coverage marking is idempotent.
    fn write_range(&mut self, offset: usize, bytes: &[u8]) {
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        for covered in &mut self.covered[offset..offset + bytes.len()] {
            *covered = true;
        }
    }

    fn is_complete(&self) -> bool {
        self.complete || self.covered.iter().all(|&b| b)
    }

    fn covered_bytes(&self) -> usize {
        self.covered.iter().filter(|&&b| b).count()
    }

    fn is_timed_out(&self, timeout: Duration, now: Instant) -> bool {
        now.duration_since(self.start_time) > timeout
    }
}

#[derive(Debug, Default)]
struct ReassemblerState {
    buffers: HashMap<u8, ReassemblyBuffer>,
    statistics: TpStatistics,
}

/// Collects TP segments, in any order, and yields each complete message
/// payload exactly once.
///
/// Coverage is tracked per byte, so out-of-order and duplicate segments
/// are absorbed without bookkeeping about expected offsets. All state
/// lives behind one mutex; no I/O happens under the lock, and when two
/// threads race to complete a buffer, exactly one of them receives the
/// assembled bytes.
pub struct TpReassembler {
    config: TpConfig,
    state: Mutex<ReassemblerState>,
    completion_callback: Option<TpCompletionCallback>,
}

impl TpReassembler {
    /// Create a new reassembler with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TpConfig::default())
    }

    /// Create a new reassembler with a custom configuration.
    pub fn with_config(config: TpConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ReassemblerState::default()),
            completion_callback: None,
        }
    }

    /// Register a callback for reassemblies that end without a message
    /// (timeout sweep). Must be called before the reassembler is shared.
    pub fn set_completion_callback(&mut self, callback: TpCompletionCallback) {
        self.completion_callback = Some(callback);
    }

    /// Get the active configuration.
    pub fn config(&self) -> &TpConfig {
        &self.config
    }

    /// Process one received segment.
    ///
    /// Returns `Ok(Some(payload))` when this segment completes a
    /// message, `Ok(None)` when more segments are needed (or the segment
    /// was a duplicate). A [`TpMessageType::SingleMessage`] segment
    /// yields its payload immediately without touching any buffer.
    ///
    /// Structural failures drop only this segment: an invalid segment
    /// or a full reassembler each return an error and leave every open
    /// buffer intact.
    pub fn process_segment(&self, segment: &TpSegment) -> Result<Option<Bytes>> {
        let header = &segment.header;

        if let Err(e) = self.validate_segment(segment) {
            let mut state = self.state.lock().expect("reassembler mutex poisoned");
            state.statistics.errors += 1;
            warn!(
                sequence = header.sequence_number,
                offset = header.segment_offset,
                error = %e,
                "dropping invalid TP segment"
            );
            return Err(e);
        }

        if header.message_type == TpMessageType::SingleMessage {
            let mut state = self.state.lock().expect("reassembler mutex poisoned");
            state.statistics.segments_received += 1;
            state.statistics.messages_reassembled += 1;
            return Ok(Some(segment.payload.slice(HEADER_SIZE..)));
        }

        let mut guard = self.state.lock().expect("reassembler mutex poisoned");
        let state = &mut *guard;
        state.statistics.segments_received += 1;

        // Any segment of an unknown sequence opens its buffer: every
        // segment header carries the total message length, so arrival
        // order does not matter.
        let sequence = header.sequence_number;
        if !state.buffers.contains_key(&sequence) {
            if state.buffers.len() >= self.config.max_concurrent_transfers {
                state.statistics.errors += 1;
                return Err(SomeIpError::ResourceExhausted(format!(
                    "{} concurrent reassemblies in progress",
                    state.buffers.len()
                )));
            }
            debug!(
                sequence,
                message_length = header.message_length,
                "reassembly started"
            );
            state.buffers.insert(
                sequence,
                ReassemblyBuffer::new(header.message_length as usize, sequence),
            );
        }

        // The first segment carries the SOME/IP header; only the bytes
        // after it land in the reassembled payload.
        let offset = header.segment_offset as usize;
        let bytes = if header.message_type == TpMessageType::FirstSegment {
            &segment.payload[HEADER_SIZE..]
        } else {
            &segment.payload[..]
        };

        // The range must fit the buffer that is actually open, which may
        // be smaller than this segment claims.
        let buffer_len = state.buffers[&sequence].data.len();
        if offset + bytes.len() > buffer_len {
            state.statistics.errors += 1;
            warn!(sequence, offset, "segment exceeds open reassembly buffer");
            return Err(SomeIpError::invalid_segment(format!(
                "range [{offset}, {}) exceeds open buffer of {buffer_len} bytes",
                offset + bytes.len()
            )));
        }

        let buffer = state
            .buffers
            .get_mut(&sequence)
            .expect("buffer just ensured");

        if buffer.is_range_covered(offset, bytes.len()) {
            state.statistics.duplicate_segments += 1;
            return Ok(None);
        }

        buffer.write_range(offset, bytes);
        buffer.last_sequence_number = sequence;

        if buffer.is_complete() {
            let mut buffer = state
                .buffers
                .remove(&sequence)
                .expect("completing buffer present");
            buffer.complete = true;
            state.statistics.messages_reassembled += 1;
            debug!(sequence, bytes = buffer.data.len(), "reassembly complete");
            return Ok(Some(Bytes::from(buffer.data)));
        }

        Ok(None)
    }

    /// Structural checks. The declared length must match the payload,
    /// the covered range must fit the message, and the message must fit
    /// the configured bound. First/single segments account for the
    /// embedded 16-byte SOME/IP header on top of the payload range.
    fn validate_segment(&self, segment: &TpSegment) -> Result<()> {
        let header = &segment.header;

        if header.segment_length as usize != segment.payload.len() {
            return Err(SomeIpError::invalid_segment(format!(
                "declared length {} but payload is {} bytes",
                header.segment_length,
                segment.payload.len()
            )));
        }

        if header.message_length as usize > self.config.max_message_size {
            return Err(SomeIpError::invalid_segment(format!(
                "message length {} exceeds maximum {}",
                header.message_length, self.config.max_message_size
            )));
        }

        let header_allowance = if header.message_type.carries_header() {
            if segment.payload.len() < HEADER_SIZE {
                return Err(SomeIpError::invalid_segment(format!(
                    "{:?} of {} bytes cannot hold the SOME/IP header",
                    header.message_type,
                    segment.payload.len()
                )));
            }
            HEADER_SIZE
        } else {
            0
        };

        let end = header.segment_offset as usize + header.segment_length as usize;
        if end > header.message_length as usize + header_allowance {
            return Err(SomeIpError::invalid_segment(format!(
                "range [{}, {end}) exceeds message length {}",
                header.segment_offset, header.message_length
            )));
        }

        Ok(())
    }

    /// Check if a reassembly is in progress for a sequence number.
    pub fn is_reassembling(&self, sequence: u8) -> bool {
        let state = self.state.lock().expect("reassembler mutex poisoned");
        state.buffers.contains_key(&sequence)
    }

    /// Get (received, total) byte counts for an in-progress reassembly.
    pub fn reassembly_progress(&self, sequence: u8) -> Option<(usize, usize)> {
        let state = self.state.lock().expect("reassembler mutex poisoned");
        state
            .buffers
            .get(&sequence)
            .map(|b| (b.covered_bytes(), b.data.len()))
    }

    /// Drop an in-progress reassembly. Returns whether one existed.
    ///
    /// A later first segment with the same sequence number starts a
    /// fresh buffer.
    pub fn cancel_reassembly(&self, sequence: u8) -> bool {
        let mut state = self.state.lock().expect("reassembler mutex poisoned");
        state.buffers.remove(&sequence).is_some()
    }

    /// Drop every buffer older than the reassembly timeout.
    ///
    /// Returns the number of reassemblies dropped. The completion
    /// callback, if registered, is invoked for each after the lock is
    /// released.
    pub fn process_timeouts(&self) -> usize {
        let now = Instant::now();
        let timeout = self.config.reassembly_timeout;

        let expired: Vec<u8> = {
            let mut state = self.state.lock().expect("reassembler mutex poisoned");
            let expired: Vec<u8> = state
                .buffers
                .iter()
                .filter(|(_, buffer)| buffer.is_timed_out(timeout, now))
                .map(|(&sequence, _)| sequence)
                .collect();

            for sequence in &expired {
                state.buffers.remove(sequence);
                state.statistics.timeouts += 1;
            }
            expired
        };

        for sequence in &expired {
            warn!(sequence, "reassembly timed out");
            if let Some(callback) = &self.completion_callback {
                callback(*sequence, ErrorKind::Timeout);
            }
        }

        expired.len()
    }

    /// Get the number of reassemblies in progress.
    pub fn active_reassemblies(&self) -> usize {
        let state = self.state.lock().expect("reassembler mutex poisoned");
        state.buffers.len()
    }

    /// Get a snapshot of the statistics counters.
    pub fn statistics(&self) -> TpStatistics {
        let state = self.state.lock().expect("reassembler mutex poisoned");
        state.statistics
    }

    /// Drop every in-progress reassembly.
    pub fn clear(&self) {
        let mut state = self.state.lock().expect("reassembler mutex poisoned");
        state.buffers.clear();
    }
}

impl Default for TpReassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TpReassembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TpReassembler")
            .field("config", &self.config)
            .field("has_completion_callback", &self.completion_callback.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{MethodId, ServiceId};
    use crate::message::SomeIpMessage;
    use crate::tp::segmenter::TpSegmenter;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn tp_pair(max_segment_size: usize) -> (TpSegmenter, TpReassembler) {
        let config = TpConfig::default().with_max_segment_size(max_segment_size);
        (
            TpSegmenter::new(config.clone()).unwrap(),
            TpReassembler::with_config(config),
        )
    }

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_single_message_bypasses_buffers() {
        let (segmenter, reassembler) = tp_pair(100);
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(b"small".as_slice())
            .build();

        let segments = segmenter.segment_message(&msg).unwrap();
        let result = reassembler.process_segment(&segments[0]).unwrap();

        assert_eq!(result.unwrap().as_ref(), b"small");
        assert_eq!(reassembler.active_reassemblies(), 0);
        assert_eq!(reassembler.statistics().messages_reassembled, 1);
    }

    #[test]
    fn test_in_order_reassembly() {
        let (segmenter, reassembler) = tp_pair(100);
        let payload = patterned(350);
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(payload.clone())
            .build();

        let segments = segmenter.segment_message(&msg).unwrap();
        assert_eq!(segments.len(), 4);

        for segment in &segments[..3] {
            assert!(reassembler.process_segment(segment).unwrap().is_none());
        }
        assert_eq!(reassembler.active_reassemblies(), 1);

        let result = reassembler.process_segment(&segments[3]).unwrap();
        assert_eq!(result.unwrap().as_ref(), payload.as_slice());
        assert_eq!(reassembler.active_reassemblies(), 0);
    }

    #[test]
    fn test_out_of_order_reassembly() {
        let (segmenter, reassembler) = tp_pair(100);
        let payload = patterned(350);
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(payload.clone())
            .build();

        let segments = segmenter.segment_message(&msg).unwrap();

        // LAST, CONSECUTIVE#2, FIRST, CONSECUTIVE#1: completion arrives
        // only on the final feed.
        assert!(reassembler.process_segment(&segments[3]).unwrap().is_none());
        assert!(reassembler.process_segment(&segments[2]).unwrap().is_none());
        assert!(reassembler.process_segment(&segments[0]).unwrap().is_none());

        let result = reassembler.process_segment(&segments[1]).unwrap();
        assert_eq!(result.unwrap().as_ref(), payload.as_slice());
    }

    #[test]
    fn test_consecutive_segment_opens_buffer() {
        // A consecutive segment arriving before the first one still
        // opens the reassembly; its header knows the total length.
        let (segmenter, reassembler) = tp_pair(100);
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(patterned(350))
            .build();

        let segments = segmenter.segment_message(&msg).unwrap();
        assert!(reassembler.process_segment(&segments[1]).unwrap().is_none());
        assert_eq!(reassembler.active_reassemblies(), 1);
        assert_eq!(
            reassembler.reassembly_progress(segments[1].sequence_number()),
            Some((100, 350))
        );
    }

    #[test]
    fn test_duplicate_segments_are_idempotent() {
        let (segmenter, reassembler) = tp_pair(100);
        let payload = patterned(350);
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(payload.clone())
            .build();

        let segments = segmenter.segment_message(&msg).unwrap();

        reassembler.process_segment(&segments[0]).unwrap();
        reassembler.process_segment(&segments[1]).unwrap();
        // Replay both; progress must not move.
        let before = reassembler.reassembly_progress(segments[0].sequence_number());
        reassembler.process_segment(&segments[0]).unwrap();
        reassembler.process_segment(&segments[1]).unwrap();
        let after = reassembler.reassembly_progress(segments[0].sequence_number());

        assert_eq!(before, after);
        assert_eq!(reassembler.statistics().duplicate_segments, 2);

        reassembler.process_segment(&segments[2]).unwrap();
        let result = reassembler.process_segment(&segments[3]).unwrap();
        assert_eq!(result.unwrap().as_ref(), payload.as_slice());
    }

    #[test]
    fn test_invalid_segment_dropped() {
        let (segmenter, reassembler) = tp_pair(100);
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(patterned(350))
            .build();

        let mut segments = segmenter.segment_message(&msg).unwrap();
        segments[1].header.segment_length = 999;

        let result = reassembler.process_segment(&segments[1]);
        assert!(matches!(result, Err(SomeIpError::InvalidSegment(_))));
        assert_eq!(reassembler.statistics().errors, 1);
    }

    #[test]
    fn test_range_beyond_message_length_dropped() {
        let (segmenter, reassembler) = tp_pair(100);
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(patterned(350))
            .build();

        let mut segments = segmenter.segment_message(&msg).unwrap();
        reassembler.process_segment(&segments[0]).unwrap();

        segments[3].header.segment_offset = 340; // 340 + 66 > 350

        let result = reassembler.process_segment(&segments[3]);
        assert!(matches!(result, Err(SomeIpError::InvalidSegment(_))));
        // The open buffer is untouched by the bad segment.
        assert_eq!(reassembler.active_reassemblies(), 1);
    }

    #[test]
    fn test_oversized_message_length_dropped() {
        let config = TpConfig::default()
            .with_max_segment_size(100)
            .with_max_message_size(1000);
        let reassembler = TpReassembler::with_config(config);

        let segment = TpSegment::new(
            crate::tp::TpSegmentHeader {
                message_length: 2000,
                segment_offset: 0,
                segment_length: 100,
                sequence_number: 1,
                message_type: TpMessageType::FirstSegment,
            },
            Bytes::from(vec![0u8; 100]),
        );

        let result = reassembler.process_segment(&segment);
        assert!(matches!(result, Err(SomeIpError::InvalidSegment(_))));
    }

    #[test]
    fn test_segment_claiming_larger_message_than_open_buffer() {
        let (segmenter, reassembler) = tp_pair(100);
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(patterned(300))
            .build();

        let segments = segmenter.segment_message(&msg).unwrap();
        reassembler.process_segment(&segments[0]).unwrap();

        // Same sequence, but the forged header claims a longer message;
        // its range must be checked against the buffer that is open.
        let mut forged = segments[2].clone();
        forged.header.message_length = 10_000;
        forged.header.segment_offset = 400;

        let result = reassembler.process_segment(&forged);
        assert!(matches!(result, Err(SomeIpError::InvalidSegment(_))));
        assert_eq!(reassembler.active_reassemblies(), 1);
    }

    #[test]
    fn test_capacity_bound() {
        let config = TpConfig::default()
            .with_max_segment_size(100)
            .with_max_concurrent_transfers(2);
        let segmenter = TpSegmenter::new(config.clone()).unwrap();
        let reassembler = TpReassembler::with_config(config);

        for _ in 0..2 {
            let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
                .payload(patterned(300))
                .build();
            let segments = segmenter.segment_message(&msg).unwrap();
            reassembler.process_segment(&segments[0]).unwrap();
        }
        assert_eq!(reassembler.active_reassemblies(), 2);

        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(patterned(300))
            .build();
        let segments = segmenter.segment_message(&msg).unwrap();
        let result = reassembler.process_segment(&segments[0]);
        assert!(matches!(result, Err(SomeIpError::ResourceExhausted(_))));

        // The two open reassemblies keep working.
        assert_eq!(reassembler.active_reassemblies(), 2);
    }

    #[test]
    fn test_timeout_sweep() {
        let config = TpConfig::default()
            .with_max_segment_size(100)
            .with_reassembly_timeout(Duration::from_millis(10));
        let segmenter = TpSegmenter::new(config.clone()).unwrap();
        let mut reassembler = TpReassembler::with_config(config);

        let timed_out = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&timed_out);
        reassembler.set_completion_callback(Box::new(move |_, kind| {
            assert_eq!(kind, ErrorKind::Timeout);
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(patterned(350))
            .build();
        let segments = segmenter.segment_message(&msg).unwrap();
        reassembler.process_segment(&segments[0]).unwrap();
        assert_eq!(reassembler.active_reassemblies(), 1);

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(reassembler.process_timeouts(), 1);

        assert_eq!(reassembler.active_reassemblies(), 0);
        assert_eq!(reassembler.statistics().timeouts, 1);
        assert_eq!(timed_out.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_reassembly() {
        let (segmenter, reassembler) = tp_pair(100);
        let payload = patterned(350);
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(payload.clone())
            .build();

        let segments = segmenter.segment_message(&msg).unwrap();
        let sequence = segments[0].sequence_number();

        reassembler.process_segment(&segments[0]).unwrap();
        assert!(reassembler.is_reassembling(sequence));

        assert!(reassembler.cancel_reassembly(sequence));
        assert!(!reassembler.is_reassembling(sequence));
        assert!(!reassembler.cancel_reassembly(sequence));

        // A fresh first segment restarts cleanly after cancellation.
        reassembler.process_segment(&segments[0]).unwrap();
        for segment in &segments[1..3] {
            reassembler.process_segment(segment).unwrap();
        }
        let result = reassembler.process_segment(&segments[3]).unwrap();
        assert_eq!(result.unwrap().as_ref(), payload.as_slice());
    }

    #[test]
    fn test_progress_reporting() {
        let (segmenter, reassembler) = tp_pair(100);
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(patterned(350))
            .build();

        let segments = segmenter.segment_message(&msg).unwrap();
        let sequence = segments[0].sequence_number();

        assert_eq!(reassembler.reassembly_progress(sequence), None);

        reassembler.process_segment(&segments[0]).unwrap();
        assert_eq!(reassembler.reassembly_progress(sequence), Some((84, 350)));

        reassembler.process_segment(&segments[1]).unwrap();
        assert_eq!(reassembler.reassembly_progress(sequence), Some((184, 350)));
    }

    #[test]
    fn test_interleaved_sequences() {
        let (segmenter, reassembler) = tp_pair(100);

        let payload_a = vec![0xAAu8; 300];
        let payload_b = vec![0xBBu8; 300];
        let msg_a = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(payload_a.clone())
            .build();
        let msg_b = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(payload_b.clone())
            .build();

        let segments_a = segmenter.segment_message(&msg_a).unwrap();
        let segments_b = segmenter.segment_message(&msg_b).unwrap();
        assert_ne!(segments_a[0].sequence_number(), segments_b[0].sequence_number());

        // Interleave the two transfers.
        reassembler.process_segment(&segments_a[0]).unwrap();
        reassembler.process_segment(&segments_b[0]).unwrap();
        reassembler.process_segment(&segments_a[1]).unwrap();
        reassembler.process_segment(&segments_b[1]).unwrap();
        assert_eq!(reassembler.active_reassemblies(), 2);

        let done_a = reassembler.process_segment(&segments_a[2]).unwrap();
        assert_eq!(done_a.unwrap().as_ref(), payload_a.as_slice());

        let done_b = reassembler.process_segment(&segments_b[2]).unwrap();
        assert_eq!(done_b.unwrap().as_ref(), payload_b.as_slice());

        assert_eq!(reassembler.active_reassemblies(), 0);
    }

    #[test]
    fn test_concurrent_feeding() {
        let (segmenter, reassembler) = tp_pair(100);
        let reassembler = Arc::new(reassembler);

        let payload = patterned(5000);
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(payload.clone())
            .build();
        let segments = segmenter.segment_message(&msg).unwrap();

        // The first segment opens the buffer; the rest race in from
        // worker threads. Exactly one feeder observes completion.
        reassembler.process_segment(&segments[0]).unwrap();

        let completions = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = segments[1..]
            .iter()
            .cloned()
            .map(|segment| {
                let reassembler = Arc::clone(&reassembler);
                let completions = Arc::clone(&completions);
                let expected = payload.clone();
                std::thread::spawn(move || {
                    if let Some(bytes) = reassembler.process_segment(&segment).unwrap() {
                        assert_eq!(bytes.as_ref(), expected.as_slice());
                        completions.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert_eq!(reassembler.active_reassemblies(), 0);
        assert_eq!(reassembler.statistics().messages_reassembled, 1);
    }
}
