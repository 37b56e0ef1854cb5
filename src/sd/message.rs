//! SOME/IP-SD message codec.

use bytes::Bytes;
use tracing::debug;

use crate::error::{Result, SomeIpError};
use crate::header::{MethodId, ServiceId};
use crate::message::SomeIpMessage;

use super::entry::{EventgroupEntry, SdEntry, ServiceEntry};
use super::option::{Endpoint, SdOption};
use super::types::{EventgroupId, InstanceId, SD_ENTRY_SIZE, SD_METHOD_ID, SD_SERVICE_ID};

/// SD message flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SdFlags {
    /// Reboot flag (0x80) - set until the reboot-detection window passes.
    pub reboot: bool,
    /// Unicast flag (0x40) - the sender supports unicast replies.
    pub unicast: bool,
    /// Explicit initial data control flag (0x20).
    pub explicit_initial_data: bool,
}

impl SdFlags {
    /// Parse flags from a byte.
    pub fn from_u8(byte: u8) -> Self {
        Self {
            reboot: (byte & 0x80) != 0,
            unicast: (byte & 0x40) != 0,
            explicit_initial_data: (byte & 0x20) != 0,
        }
    }

    /// Serialize flags to a byte.
    pub fn to_u8(self) -> u8 {
        let mut byte = 0u8;
        if self.reboot {
            byte |= 0x80;
        }
        if self.unicast {
            byte |= 0x40;
        }
        if self.explicit_initial_data {
            byte |= 0x20;
        }
        byte
    }
}

/// A SOME/IP-SD message.
///
/// Wire layout: flags (1) + reserved (3, zero) + entries length (4, BE)
/// + entries (16 bytes each) + options length (4, BE) + options. Both
/// section lengths are back-patched after their sections are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdMessage {
    /// Message flags.
    pub flags: SdFlags,
    /// List of entries.
    pub entries: Vec<SdEntry>,
    /// List of options, referenced by entry option runs.
    pub options: Vec<SdOption>,
}

impl SdMessage {
    /// Create a new empty SD message.
    pub fn new() -> Self {
        Self {
            flags: SdFlags::default(),
            entries: Vec::new(),
            options: Vec::new(),
        }
    }

    /// Create a FindService message.
    pub fn find_service(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        minor_version: u32,
    ) -> Self {
        let entry =
            ServiceEntry::find_service(service_id, instance_id, major_version, minor_version);
        Self {
            flags: SdFlags::default(),
            entries: vec![SdEntry::Service(entry)],
            options: Vec::new(),
        }
    }

    /// Create an OfferService message with one endpoint option.
    pub fn offer_service(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        minor_version: u32,
        ttl: u32,
        endpoint: Endpoint,
    ) -> Self {
        let entry =
            ServiceEntry::offer_service(service_id, instance_id, major_version, minor_version, ttl)
                .with_option_run(0, 1);

        Self {
            flags: SdFlags::default(),
            entries: vec![SdEntry::Service(entry)],
            options: vec![endpoint.to_option()],
        }
    }

    /// Create a StopOfferService message.
    pub fn stop_offer_service(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        minor_version: u32,
    ) -> Self {
        let entry =
            ServiceEntry::stop_offer_service(service_id, instance_id, major_version, minor_version);
        Self {
            flags: SdFlags::default(),
            entries: vec![SdEntry::Service(entry)],
            options: Vec::new(),
        }
    }

    /// Create a SubscribeEventgroup message with one endpoint option.
    pub fn subscribe_eventgroup(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        eventgroup_id: EventgroupId,
        ttl: u32,
        endpoint: Endpoint,
    ) -> Self {
        let entry =
            EventgroupEntry::subscribe(service_id, instance_id, major_version, eventgroup_id, ttl)
                .with_option_run(0, 1);

        Self {
            flags: SdFlags::default(),
            entries: vec![SdEntry::Eventgroup(entry)],
            options: vec![endpoint.to_option()],
        }
    }

    /// Create a StopSubscribeEventgroup message.
    pub fn stop_subscribe_eventgroup(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        eventgroup_id: EventgroupId,
    ) -> Self {
        let entry =
            EventgroupEntry::unsubscribe(service_id, instance_id, major_version, eventgroup_id);
        Self {
            flags: SdFlags::default(),
            entries: vec![SdEntry::Eventgroup(entry)],
            options: Vec::new(),
        }
    }

    /// Create a SubscribeEventgroupAck message.
    pub fn subscribe_eventgroup_ack(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        eventgroup_id: EventgroupId,
        ttl: u32,
        counter: u8,
    ) -> Self {
        let entry = EventgroupEntry::subscribe_ack(
            service_id,
            instance_id,
            major_version,
            eventgroup_id,
            ttl,
            counter,
        );
        Self {
            flags: SdFlags::default(),
            entries: vec![SdEntry::Eventgroup(entry)],
            options: Vec::new(),
        }
    }

    /// Create a SubscribeEventgroupNack message.
    pub fn subscribe_eventgroup_nack(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        eventgroup_id: EventgroupId,
        counter: u8,
    ) -> Self {
        let entry = EventgroupEntry::subscribe_nack(
            service_id,
            instance_id,
            major_version,
            eventgroup_id,
            counter,
        );
        Self {
            flags: SdFlags::default(),
            entries: vec![SdEntry::Eventgroup(entry)],
            options: Vec::new(),
        }
    }

    /// Parse an SD message from payload bytes (not including the
    /// SOME/IP header).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 12 {
            return Err(SomeIpError::MessageTooShort {
                expected: 12,
                actual: data.len(),
            });
        }

        let flags = SdFlags::from_u8(data[0]);
        // data[1..4] is reserved

        let entries_length = u32::from_be_bytes([data[4], data[5], data[6], data[7]]) as usize;
        if entries_length % SD_ENTRY_SIZE != 0 {
            return Err(SomeIpError::malformed(format!(
                "entries length {entries_length} is not a multiple of {SD_ENTRY_SIZE}"
            )));
        }

        let options_length_offset = 8 + entries_length;
        if data.len() < options_length_offset + 4 {
            return Err(SomeIpError::MessageTooShort {
                expected: options_length_offset + 4,
                actual: data.len(),
            });
        }

        let mut entries = Vec::with_capacity(entries_length / SD_ENTRY_SIZE);
        let entries_data = &data[8..options_length_offset];
        for chunk in entries_data.chunks_exact(SD_ENTRY_SIZE) {
            entries.push(SdEntry::from_bytes(chunk)?);
        }

        let options_length = u32::from_be_bytes([
            data[options_length_offset],
            data[options_length_offset + 1],
            data[options_length_offset + 2],
            data[options_length_offset + 3],
        ]) as usize;

        let options_data = &data[options_length_offset + 4..];
        if options_data.len() < options_length {
            return Err(SomeIpError::MessageTooShort {
                expected: options_length,
                actual: options_data.len(),
            });
        }

        let mut options = Vec::new();
        let mut offset = 0;
        while offset < options_length {
            let (option, consumed) = SdOption::from_bytes(&options_data[offset..options_length])?;
            if let SdOption::Unknown { option_type, .. } = &option {
                debug!(option_type, "carrying unknown SD option verbatim");
            }
            options.push(option);
            offset += consumed;
        }

        Ok(Self {
            flags,
            entries,
            options,
        })
    }

    /// Parse an SD message out of a SOME/IP message, checking the SD
    /// well-known service and method IDs first.
    pub fn from_someip(msg: &SomeIpMessage) -> Result<Self> {
        if msg.header.service_id != ServiceId(SD_SERVICE_ID) {
            return Err(SomeIpError::malformed(format!(
                "expected SD service ID 0x{:04X}, got {}",
                SD_SERVICE_ID, msg.header.service_id
            )));
        }
        if msg.header.method_id != MethodId(SD_METHOD_ID) {
            return Err(SomeIpError::malformed(format!(
                "expected SD method ID 0x{:04X}, got {}",
                SD_METHOD_ID, msg.header.method_id
            )));
        }

        Self::from_bytes(&msg.payload)
    }

    /// Serialize the SD message to payload bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16 + self.entries.len() * SD_ENTRY_SIZE);

        buf.push(self.flags.to_u8());
        buf.extend_from_slice(&[0, 0, 0]); // Reserved

        // Entries length placeholder, patched below.
        let entries_length_at = buf.len();
        buf.extend_from_slice(&[0, 0, 0, 0]);

        for entry in &self.entries {
            buf.extend_from_slice(&entry.to_bytes());
        }
        let entries_length = (buf.len() - entries_length_at - 4) as u32;
        buf[entries_length_at..entries_length_at + 4]
            .copy_from_slice(&entries_length.to_be_bytes());

        // Options length placeholder, patched below.
        let options_length_at = buf.len();
        buf.extend_from_slice(&[0, 0, 0, 0]);

        for option in &self.options {
            buf.extend_from_slice(&option.to_bytes());
        }
        let options_length = (buf.len() - options_length_at - 4) as u32;
        buf[options_length_at..options_length_at + 4]
            .copy_from_slice(&options_length.to_be_bytes());

        buf
    }

    /// Wrap this SD message in a SOME/IP notification.
    pub fn into_someip(self) -> SomeIpMessage {
        let payload = self.to_bytes();
        SomeIpMessage::notification(ServiceId(SD_SERVICE_ID), MethodId(SD_METHOD_ID))
            .payload(Bytes::from(payload))
            .build()
    }

    /// Check if this message carries a FindService entry.
    pub fn is_find_service(&self) -> bool {
        self.entries.iter().any(|e| {
            matches!(e, SdEntry::Service(s) if s.entry_type == super::types::EntryType::FindService)
        })
    }

    /// Check if this message carries an OfferService entry with TTL > 0.
    pub fn is_offer_service(&self) -> bool {
        self.entries.iter().any(|e| {
            matches!(
                e,
                SdEntry::Service(s)
                    if s.entry_type == super::types::EntryType::OfferService && s.ttl > 0
            )
        })
    }

    /// Check if this message carries a StopOfferService entry.
    pub fn is_stop_offer_service(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e, SdEntry::Service(s) if s.is_stop_offer()))
    }

    /// Resolve the options an entry references through its two
    /// (index, count) runs.
    ///
    /// The codec only preserves the indices; out-of-range references
    /// resolve to nothing rather than failing.
    pub fn options_for_entry(&self, entry: &SdEntry) -> Vec<&SdOption> {
        let mut resolved = Vec::new();
        for (index, count) in entry.option_runs() {
            for i in index as usize..(index as usize + count as usize) {
                if let Some(opt) = self.options.get(i) {
                    resolved.push(opt);
                }
            }
        }
        resolved
    }

    /// Get the endpoints an entry references through its option runs.
    pub fn endpoints_for_entry(&self, entry: &SdEntry) -> Vec<Endpoint> {
        self.options_for_entry(entry)
            .into_iter()
            .filter_map(Endpoint::from_option)
            .collect()
    }
}

impl Default for SdMessage {
    fn default() -> Self {
        Self::new()
    }
}
