//! SOME/IP-SD entry types.
//!
//! Every entry serializes to exactly 16 bytes. Entries reference options
//! through two (index, count) runs into the message's options array; the
//! codec preserves the indices and leaves their resolution to
//! [`crate::sd::SdMessage::options_for_entry`].

use crate::error::{Result, SomeIpError};
use crate::header::ServiceId;

use super::types::{EntryType, EventgroupId, InstanceId, SD_ENTRY_SIZE};

/// Maximum value of the 24-bit TTL field.
const TTL_MAX: u32 = 0x00FF_FFFF;

/// A service entry (FindService or OfferService).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    /// Entry type (FindService or OfferService).
    pub entry_type: EntryType,
    /// Index of the first option run.
    pub index1: u8,
    /// Index of the second option run.
    pub index2: u8,
    /// Number of options in the first run (4 bits).
    pub options_count1: u8,
    /// Number of options in the second run (4 bits).
    pub options_count2: u8,
    /// Service ID.
    pub service_id: ServiceId,
    /// Instance ID.
    pub instance_id: InstanceId,
    /// Major version.
    pub major_version: u8,
    /// Time-to-live in seconds, 24 bits (0 = stop offering).
    pub ttl: u32,
    /// Minor version.
    pub minor_version: u32,
}

impl ServiceEntry {
    /// Create a new FindService entry.
    pub fn find_service(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        minor_version: u32,
    ) -> Self {
        Self {
            entry_type: EntryType::FindService,
            index1: 0,
            index2: 0,
            options_count1: 0,
            options_count2: 0,
            service_id,
            instance_id,
            major_version,
            ttl: TTL_MAX,
            minor_version,
        }
    }

    /// Create a new OfferService entry.
    pub fn offer_service(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        minor_version: u32,
        ttl: u32,
    ) -> Self {
        Self {
            entry_type: EntryType::OfferService,
            index1: 0,
            index2: 0,
            options_count1: 0,
            options_count2: 0,
            service_id,
            instance_id,
            major_version,
            ttl: ttl & TTL_MAX,
            minor_version,
        }
    }

    /// Create a StopOfferService entry (OfferService with TTL=0).
    pub fn stop_offer_service(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        minor_version: u32,
    ) -> Self {
        Self::offer_service(service_id, instance_id, major_version, minor_version, 0)
    }

    /// Check if this is a stop offer (OfferService with TTL = 0).
    pub fn is_stop_offer(&self) -> bool {
        self.entry_type == EntryType::OfferService && self.ttl == 0
    }

    /// Attach the first option run.
    pub fn with_option_run(mut self, index: u8, count: u8) -> Self {
        self.index1 = index;
        self.options_count1 = count & 0x0F;
        self
    }

    /// Parse a service entry from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < SD_ENTRY_SIZE {
            return Err(SomeIpError::MessageTooShort {
                expected: SD_ENTRY_SIZE,
                actual: data.len(),
            });
        }

        let entry_type =
            EntryType::from_u8(data[0]).ok_or(SomeIpError::UnknownEntryType(data[0]))?;
        if !entry_type.is_service_entry() {
            return Err(SomeIpError::malformed(format!(
                "entry type 0x{:02X} is not a service entry",
                data[0]
            )));
        }

        Ok(Self {
            entry_type,
            index1: data[1],
            index2: data[2],
            options_count1: (data[3] >> 4) & 0x0F,
            options_count2: data[3] & 0x0F,
            service_id: ServiceId(u16::from_be_bytes([data[4], data[5]])),
            instance_id: InstanceId(u16::from_be_bytes([data[6], data[7]])),
            major_version: data[8],
            ttl: u32::from_be_bytes([0, data[9], data[10], data[11]]),
            minor_version: u32::from_be_bytes([data[12], data[13], data[14], data[15]]),
        })
    }

    /// Serialize the entry to bytes.
    pub fn to_bytes(&self) -> [u8; SD_ENTRY_SIZE] {
        let mut buf = [0u8; SD_ENTRY_SIZE];

        buf[0] = self.entry_type as u8;
        buf[1] = self.index1;
        buf[2] = self.index2;
        buf[3] = ((self.options_count1 & 0x0F) << 4) | (self.options_count2 & 0x0F);
        buf[4..6].copy_from_slice(&self.service_id.0.to_be_bytes());
        buf[6..8].copy_from_slice(&self.instance_id.0.to_be_bytes());
        buf[8] = self.major_version;
        let ttl = self.ttl.to_be_bytes();
        buf[9] = ttl[1];
        buf[10] = ttl[2];
        buf[11] = ttl[3];
        buf[12..16].copy_from_slice(&self.minor_version.to_be_bytes());

        buf
    }
}

/// An eventgroup entry (Subscribe or SubscribeAck).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventgroupEntry {
    /// Entry type (SubscribeEventgroup or SubscribeEventgroupAck).
    pub entry_type: EntryType,
    /// Index of the first option run.
    pub index1: u8,
    /// Index of the second option run.
    pub index2: u8,
    /// Number of options in the first run (4 bits).
    pub options_count1: u8,
    /// Number of options in the second run (4 bits).
    pub options_count2: u8,
    /// Service ID.
    pub service_id: ServiceId,
    /// Instance ID.
    pub instance_id: InstanceId,
    /// Major version.
    pub major_version: u8,
    /// Time-to-live in seconds, 24 bits (0 = unsubscribe/nack).
    pub ttl: u32,
    /// Reserved byte, kept verbatim for round-tripping.
    pub reserved: u8,
    /// Counter for distinguishing parallel subscriptions (4 bits).
    pub counter: u8,
    /// Eventgroup ID.
    pub eventgroup_id: EventgroupId,
}

impl EventgroupEntry {
    /// Create a new SubscribeEventgroup entry.
    pub fn subscribe(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        eventgroup_id: EventgroupId,
        ttl: u32,
    ) -> Self {
        Self {
            entry_type: EntryType::SubscribeEventgroup,
            index1: 0,
            index2: 0,
            options_count1: 0,
            options_count2: 0,
            service_id,
            instance_id,
            major_version,
            ttl: ttl & TTL_MAX,
            reserved: 0,
            counter: 0,
            eventgroup_id,
        }
    }

    /// Create an unsubscribe entry (Subscribe with TTL=0).
    pub fn unsubscribe(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        eventgroup_id: EventgroupId,
    ) -> Self {
        Self::subscribe(service_id, instance_id, major_version, eventgroup_id, 0)
    }

    /// Create a SubscribeEventgroupAck entry.
    pub fn subscribe_ack(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        eventgroup_id: EventgroupId,
        ttl: u32,
        counter: u8,
    ) -> Self {
        let mut entry = Self::subscribe(service_id, instance_id, major_version, eventgroup_id, ttl);
        entry.entry_type = EntryType::SubscribeEventgroupAck;
        entry.counter = counter & 0x0F;
        entry
    }

    /// Create a SubscribeEventgroupNack entry (Ack with TTL=0).
    pub fn subscribe_nack(
        service_id: ServiceId,
        instance_id: InstanceId,
        major_version: u8,
        eventgroup_id: EventgroupId,
        counter: u8,
    ) -> Self {
        Self::subscribe_ack(service_id, instance_id, major_version, eventgroup_id, 0, counter)
    }

    /// Check if this is an unsubscribe or nack (TTL = 0).
    pub fn is_negative(&self) -> bool {
        self.ttl == 0
    }

    /// Attach the first option run.
    pub fn with_option_run(mut self, index: u8, count: u8) -> Self {
        self.index1 = index;
        self.options_count1 = count & 0x0F;
        self
    }

    /// Parse an eventgroup entry from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < SD_ENTRY_SIZE {
            return Err(SomeIpError::MessageTooShort {
                expected: SD_ENTRY_SIZE,
                actual: data.len(),
            });
        }

        let entry_type =
            EntryType::from_u8(data[0]).ok_or(SomeIpError::UnknownEntryType(data[0]))?;
        if !entry_type.is_eventgroup_entry() {
            return Err(SomeIpError::malformed(format!(
                "entry type 0x{:02X} is not an eventgroup entry",
                data[0]
            )));
        }

        Ok(Self {
            entry_type,
            index1: data[1],
            index2: data[2],
            options_count1: (data[3] >> 4) & 0x0F,
            options_count2: data[3] & 0x0F,
            service_id: ServiceId(u16::from_be_bytes([data[4], data[5]])),
            instance_id: InstanceId(u16::from_be_bytes([data[6], data[7]])),
            major_version: data[8],
            ttl: u32::from_be_bytes([0, data[9], data[10], data[11]]),
            reserved: data[12],
            counter: data[13] & 0x0F,
            eventgroup_id: EventgroupId(u16::from_be_bytes([data[14], data[15]])),
        })
    }

    /// Serialize the entry to bytes.
    pub fn to_bytes(&self) -> [u8; SD_ENTRY_SIZE] {
        let mut buf = [0u8; SD_ENTRY_SIZE];

        buf[0] = self.entry_type as u8;
        buf[1] = self.index1;
        buf[2] = self.index2;
        buf[3] = ((self.options_count1 & 0x0F) << 4) | (self.options_count2 & 0x0F);
        buf[4..6].copy_from_slice(&self.service_id.0.to_be_bytes());
        buf[6..8].copy_from_slice(&self.instance_id.0.to_be_bytes());
        buf[8] = self.major_version;
        let ttl = self.ttl.to_be_bytes();
        buf[9] = ttl[1];
        buf[10] = ttl[2];
        buf[11] = ttl[3];
        buf[12] = self.reserved;
        buf[13] = self.counter & 0x0F;
        buf[14..16].copy_from_slice(&self.eventgroup_id.0.to_be_bytes());

        buf
    }
}

/// An SD entry (either Service or Eventgroup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdEntry {
    /// Service entry (Find/Offer).
    Service(ServiceEntry),
    /// Eventgroup entry (Subscribe/Ack).
    Eventgroup(EventgroupEntry),
}

impl SdEntry {
    /// Parse an entry from bytes, dispatching on the declared type code.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(SomeIpError::MessageTooShort {
                expected: SD_ENTRY_SIZE,
                actual: 0,
            });
        }

        match EntryType::from_u8(data[0]) {
            Some(t) if t.is_service_entry() => Ok(SdEntry::Service(ServiceEntry::from_bytes(data)?)),
            Some(_) => Ok(SdEntry::Eventgroup(EventgroupEntry::from_bytes(data)?)),
            None => Err(SomeIpError::UnknownEntryType(data[0])),
        }
    }

    /// Serialize the entry to bytes.
    pub fn to_bytes(&self) -> [u8; SD_ENTRY_SIZE] {
        match self {
            SdEntry::Service(e) => e.to_bytes(),
            SdEntry::Eventgroup(e) => e.to_bytes(),
        }
    }

    /// Get the entry type.
    pub fn entry_type(&self) -> EntryType {
        match self {
            SdEntry::Service(e) => e.entry_type,
            SdEntry::Eventgroup(e) => e.entry_type,
        }
    }

    /// Get the service ID from this entry.
    pub fn service_id(&self) -> ServiceId {
        match self {
            SdEntry::Service(e) => e.service_id,
            SdEntry::Eventgroup(e) => e.service_id,
        }
    }

    /// Get the instance ID from this entry.
    pub fn instance_id(&self) -> InstanceId {
        match self {
            SdEntry::Service(e) => e.instance_id,
            SdEntry::Eventgroup(e) => e.instance_id,
        }
    }

    /// Get the TTL from this entry.
    pub fn ttl(&self) -> u32 {
        match self {
            SdEntry::Service(e) => e.ttl,
            SdEntry::Eventgroup(e) => e.ttl,
        }
    }

    /// Get the option runs as two (index, count) pairs.
    pub fn option_runs(&self) -> [(u8, u8); 2] {
        match self {
            SdEntry::Service(e) => [(e.index1, e.options_count1), (e.index2, e.options_count2)],
            SdEntry::Eventgroup(e) => [(e.index1, e.options_count1), (e.index2, e.options_count2)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_entry_roundtrip() {
        let entry = ServiceEntry::offer_service(ServiceId(0x1234), InstanceId(0x0001), 1, 0, 3600)
            .with_option_run(2, 1);

        let bytes = entry.to_bytes();
        let parsed = ServiceEntry::from_bytes(&bytes).unwrap();

        assert_eq!(entry, parsed);
        assert_eq!(parsed.index1, 2);
        assert_eq!(parsed.options_count1, 1);
    }

    #[test]
    fn test_service_entry_wire_layout() {
        let entry = ServiceEntry::offer_service(ServiceId(0x1234), InstanceId(0x5678), 2, 7, 300);
        let bytes = entry.to_bytes();

        assert_eq!(bytes[0], 0x01); // OfferService
        assert_eq!(&bytes[4..6], &[0x12, 0x34]);
        assert_eq!(&bytes[6..8], &[0x56, 0x78]);
        assert_eq!(bytes[8], 2);
        assert_eq!(&bytes[9..12], &[0x00, 0x01, 0x2C]); // TTL 300, 24-bit BE
        assert_eq!(&bytes[12..16], &[0, 0, 0, 7]);
    }

    #[test]
    fn test_ttl_masked_to_24_bits() {
        let entry =
            ServiceEntry::offer_service(ServiceId(1), InstanceId(1), 1, 0, 0xFF00_0001);
        assert_eq!(entry.ttl, 0x0000_0001);
    }

    #[test]
    fn test_find_service_entry() {
        let entry = ServiceEntry::find_service(ServiceId(0x1234), InstanceId::ANY, 0xFF, 0xFFFF_FFFF);

        assert_eq!(entry.entry_type, EntryType::FindService);
        assert_eq!(entry.instance_id, InstanceId::ANY);
        assert_eq!(entry.ttl, 0x00FF_FFFF);
    }

    #[test]
    fn test_stop_offer() {
        let stop = ServiceEntry::stop_offer_service(ServiceId(0x1234), InstanceId(1), 1, 0);
        assert!(stop.is_stop_offer());

        let offer = ServiceEntry::offer_service(ServiceId(0x1234), InstanceId(1), 1, 0, 5);
        assert!(!offer.is_stop_offer());
    }

    #[test]
    fn test_eventgroup_entry_roundtrip() {
        let entry = EventgroupEntry::subscribe_ack(
            ServiceId(0x1234),
            InstanceId(0x0001),
            1,
            EventgroupId(0x00A5),
            3600,
            3,
        );

        let bytes = entry.to_bytes();
        let parsed = EventgroupEntry::from_bytes(&bytes).unwrap();

        assert_eq!(entry, parsed);
        assert_eq!(parsed.counter, 3);
        assert_eq!(parsed.eventgroup_id, EventgroupId(0x00A5));
    }

    #[test]
    fn test_eventgroup_wire_layout() {
        let entry = EventgroupEntry::subscribe(
            ServiceId(0x1234),
            InstanceId(0x0001),
            1,
            EventgroupId(0xBEEF),
            10,
        );
        let bytes = entry.to_bytes();

        assert_eq!(bytes[0], 0x06);
        assert_eq!(bytes[12], 0); // reserved
        assert_eq!(bytes[13], 0); // counter
        assert_eq!(&bytes[14..16], &[0xBE, 0xEF]);
    }

    #[test]
    fn test_subscribe_ack_nack() {
        let ack = EventgroupEntry::subscribe_ack(
            ServiceId(0x1234),
            InstanceId(0x0001),
            1,
            EventgroupId(0x0001),
            3600,
            0,
        );
        assert!(!ack.is_negative());

        let nack = EventgroupEntry::subscribe_nack(
            ServiceId(0x1234),
            InstanceId(0x0001),
            1,
            EventgroupId(0x0001),
            0,
        );
        assert!(nack.is_negative());
    }

    #[test]
    fn test_sd_entry_dispatch() {
        let service = ServiceEntry::offer_service(ServiceId(0x1234), InstanceId(1), 1, 0, 3600);
        let entry = SdEntry::from_bytes(&service.to_bytes()).unwrap();
        assert!(matches!(entry, SdEntry::Service(_)));

        let eventgroup =
            EventgroupEntry::subscribe(ServiceId(0x1234), InstanceId(1), 1, EventgroupId(1), 3600);
        let entry = SdEntry::from_bytes(&eventgroup.to_bytes()).unwrap();
        assert!(matches!(entry, SdEntry::Eventgroup(_)));
    }

    #[test]
    fn test_sd_entry_unknown_type() {
        let mut bytes = [0u8; SD_ENTRY_SIZE];
        bytes[0] = 0x05;

        let result = SdEntry::from_bytes(&bytes);
        assert!(matches!(result, Err(SomeIpError::UnknownEntryType(0x05))));
    }
}
