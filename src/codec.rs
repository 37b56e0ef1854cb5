//! SOME/IP stream framing.
//!
//! Defines the framing contract a byte-stream transport (TCP) uses to
//! carry SOME/IP messages: a 16-byte header whose length field tells the
//! reader where the message ends. The crate never opens a socket; these
//! helpers operate on caller-supplied streams and buffers.

use std::io::{Read, Write};

use crate::error::Result;
use crate::header::{SomeIpHeader, HEADER_SIZE};
use crate::message::SomeIpMessage;

/// Read a complete SOME/IP message from a stream.
///
/// Reads the header first, then exactly the payload length it declares.
pub fn read_message<R: Read>(reader: &mut R) -> Result<SomeIpMessage> {
    let mut header_buf = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header_buf)?;

    let header = SomeIpHeader::from_bytes(&header_buf)?;
    if header.length < 8 {
        return Err(crate::error::SomeIpError::malformed(format!(
            "length field {} below minimum of 8",
            header.length
        )));
    }
    let payload_len = header.payload_length() as usize;

    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    Ok(SomeIpMessage::new(header, payload))
}

/// Write a complete SOME/IP message to a stream.
pub fn write_message<W: Write>(writer: &mut W, message: &SomeIpMessage) -> Result<()> {
    writer.write_all(&message.to_bytes())?;
    Ok(())
}

/// A buffered reader that cuts SOME/IP messages out of a byte stream.
///
/// Handles partial reads by accumulating data until a complete message
/// is available.
#[derive(Debug, Default)]
pub struct MessageReader {
    buffer: Vec<u8>,
    position: usize,
}

impl MessageReader {
    /// Create a new message reader.
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Create a new message reader with a specific buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            position: 0,
        }
    }

    /// Add stream data to the internal buffer.
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to cut one complete message out of the buffer.
    ///
    /// Returns `Ok(None)` while more data is needed. A header whose
    /// length field is structurally impossible fails here, before the
    /// payload arrives, so the connection can be dropped early.
    pub fn try_parse(&mut self) -> Result<Option<SomeIpMessage>> {
        let available = self.buffer.len() - self.position;

        if available < HEADER_SIZE {
            return Ok(None);
        }

        let header =
            SomeIpHeader::from_bytes(&self.buffer[self.position..self.position + HEADER_SIZE])?;
        if header.length < 8 {
            return Err(crate::error::SomeIpError::malformed(format!(
                "length field {} below minimum of 8",
                header.length
            )));
        }
        let total_len = HEADER_SIZE + header.payload_length() as usize;

        if available < total_len {
            return Ok(None);
        }

        let message =
            SomeIpMessage::from_bytes(&self.buffer[self.position..self.position + total_len])?;
        self.position += total_len;

        // Reclaim consumed space once it dominates the buffer.
        if self.position > self.buffer.len() / 2 {
            self.compact();
        }

        Ok(Some(message))
    }

    /// Parse all complete messages currently in the buffer.
    pub fn parse_all(&mut self) -> Result<Vec<SomeIpMessage>> {
        let mut messages = Vec::new();
        while let Some(msg) = self.try_parse()? {
            messages.push(msg);
        }
        Ok(messages)
    }

    fn compact(&mut self) {
        if self.position > 0 {
            self.buffer.drain(..self.position);
            self.position = 0;
        }
    }

    /// Discard all buffered data.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.position = 0;
    }

    /// Get the number of unconsumed bytes in the buffer.
    pub fn len(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A writer that frames outgoing SOME/IP messages into one buffer.
#[derive(Debug, Default)]
pub struct MessageWriter {
    buffer: Vec<u8>,
}

impl MessageWriter {
    /// Create a new message writer.
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
        }
    }

    /// Encode a message into the internal buffer.
    pub fn encode(&mut self, message: &SomeIpMessage) {
        self.buffer.extend_from_slice(&message.to_bytes());
    }

    /// Get the encoded data.
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Take the encoded data, clearing the internal buffer.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Clear the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{MethodId, ServiceId};

    #[test]
    fn test_read_write_message() {
        let original = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(b"test payload".as_slice())
            .build();

        let mut buffer = Vec::new();
        write_message(&mut buffer, &original).unwrap();

        let mut cursor = std::io::Cursor::new(buffer);
        let parsed = read_message(&mut cursor).unwrap();

        assert_eq!(original, parsed);
    }

    #[test]
    fn test_message_reader_complete() {
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(b"hello".as_slice())
            .build();

        let mut reader = MessageReader::new();
        reader.feed(&msg.to_bytes());

        let parsed = reader.try_parse().unwrap();
        assert_eq!(parsed, Some(msg));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_message_reader_partial() {
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(b"hello".as_slice())
            .build();

        let data = msg.to_bytes();
        let mut reader = MessageReader::new();

        reader.feed(&data[..10]);
        assert!(reader.try_parse().unwrap().is_none());

        reader.feed(&data[10..]);
        let parsed = reader.try_parse().unwrap();
        assert_eq!(parsed, Some(msg));
    }

    #[test]
    fn test_message_reader_multiple() {
        let msg1 = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(b"first".as_slice())
            .build();
        let msg2 = SomeIpMessage::request(ServiceId(0x5678), MethodId(0x0002))
            .payload(b"second".as_slice())
            .build();

        let mut data = msg1.to_bytes();
        data.extend_from_slice(&msg2.to_bytes());

        let mut reader = MessageReader::new();
        reader.feed(&data);

        let messages = reader.parse_all().unwrap();
        assert_eq!(messages, vec![msg1, msg2]);
    }

    #[test]
    fn test_message_reader_rejects_bad_length_early() {
        // Header only, length field impossibly small: the reader must
        // fail before waiting for a payload that will never come.
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001)).build();
        let mut bytes = msg.to_bytes();
        bytes[4..8].copy_from_slice(&2u32.to_be_bytes());

        let mut reader = MessageReader::new();
        reader.feed(&bytes);
        assert!(reader.try_parse().is_err());
    }

    #[test]
    fn test_message_writer() {
        let msg = SomeIpMessage::request(ServiceId(0x1234), MethodId(0x0001))
            .payload(b"test".as_slice())
            .build();

        let mut writer = MessageWriter::new();
        writer.encode(&msg);

        let data = writer.take();
        assert_eq!(data, msg.to_bytes());
        assert!(writer.data().is_empty());
    }
}
