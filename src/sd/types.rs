//! SOME/IP-SD type definitions.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

/// SD Service ID (always 0xFFFF).
pub const SD_SERVICE_ID: u16 = 0xFFFF;

/// SD Method ID (always 0x8100).
pub const SD_METHOD_ID: u16 = 0x8100;

/// Default SD multicast address.
pub const SD_MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 251);

/// Default SD port.
pub const SD_DEFAULT_PORT: u16 = 30490;

/// Size of an SD entry in bytes.
pub const SD_ENTRY_SIZE: usize = 16;

/// Instance ID for a service instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InstanceId(pub u16);

impl InstanceId {
    /// Wildcard instance ID that matches any instance.
    pub const ANY: InstanceId = InstanceId(0xFFFF);

    /// Check if this is the wildcard instance ID.
    pub fn is_any(&self) -> bool {
        self.0 == 0xFFFF
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// Eventgroup ID for event subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventgroupId(pub u16);

impl std::fmt::Display for EventgroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// SD entry types.
///
/// OFFER_SERVICE and STOP_OFFER_SERVICE share code 0x01 on the wire and
/// are told apart by TTL, as are subscribe/unsubscribe (0x06) and
/// ack/nack (0x07).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntryType {
    /// Find a service.
    FindService = 0x00,
    /// Offer a service (TTL > 0) or stop offering (TTL = 0).
    OfferService = 0x01,
    /// Subscribe to an eventgroup (TTL > 0) or unsubscribe (TTL = 0).
    SubscribeEventgroup = 0x06,
    /// Acknowledge (TTL > 0) or reject (TTL = 0) a subscription.
    SubscribeEventgroupAck = 0x07,
}

impl EntryType {
    /// Create an EntryType from a raw byte value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::FindService),
            0x01 => Some(Self::OfferService),
            0x06 => Some(Self::SubscribeEventgroup),
            0x07 => Some(Self::SubscribeEventgroupAck),
            _ => None,
        }
    }

    /// Check if this is a service entry type.
    pub fn is_service_entry(&self) -> bool {
        matches!(self, Self::FindService | Self::OfferService)
    }

    /// Check if this is an eventgroup entry type.
    pub fn is_eventgroup_entry(&self) -> bool {
        matches!(self, Self::SubscribeEventgroup | Self::SubscribeEventgroupAck)
    }
}

/// SD option types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OptionType {
    /// Configuration string option.
    Configuration = 0x01,
    /// Load balancing option (reserved, carried as unknown data).
    LoadBalancing = 0x02,
    /// IPv4 endpoint option.
    Ipv4Endpoint = 0x04,
    /// IPv6 endpoint option.
    Ipv6Endpoint = 0x06,
    /// IPv4 multicast option.
    Ipv4Multicast = 0x14,
    /// IPv6 multicast option.
    Ipv6Multicast = 0x16,
    /// IPv4 SD endpoint option (reserved).
    Ipv4SdEndpoint = 0x24,
    /// IPv6 SD endpoint option (reserved).
    Ipv6SdEndpoint = 0x26,
}

impl OptionType {
    /// Create an OptionType from a raw byte value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Configuration),
            0x02 => Some(Self::LoadBalancing),
            0x04 => Some(Self::Ipv4Endpoint),
            0x06 => Some(Self::Ipv6Endpoint),
            0x14 => Some(Self::Ipv4Multicast),
            0x16 => Some(Self::Ipv6Multicast),
            0x24 => Some(Self::Ipv4SdEndpoint),
            0x26 => Some(Self::Ipv6SdEndpoint),
            _ => None,
        }
    }
}

/// Transport protocol used for endpoints (IANA protocol numbers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransportProtocol {
    /// TCP protocol.
    Tcp = 0x06,
    /// UDP protocol.
    Udp = 0x11,
}

impl TransportProtocol {
    /// Create a TransportProtocol from a raw byte value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x06 => Some(Self::Tcp),
            0x11 => Some(Self::Udp),
            _ => None,
        }
    }
}

impl Default for TransportProtocol {
    fn default() -> Self {
        Self::Udp
    }
}

/// Configuration for the service-discovery layer.
///
/// The codec does not act on these values; a surrounding SD engine reads
/// them to drive announcement timing and socket setup.
#[derive(Debug, Clone)]
pub struct SdConfig {
    /// Multicast group address for SD traffic.
    pub multicast_address: Ipv4Addr,
    /// Multicast port for SD traffic.
    pub multicast_port: u16,
    /// Delay before the first offer after startup.
    pub initial_delay: Duration,
    /// Interval between cyclic offer announcements.
    pub cyclic_offer_delay: Duration,
    /// Default TTL for offers and subscriptions, in seconds.
    pub default_ttl: u32,
}

impl Default for SdConfig {
    fn default() -> Self {
        Self {
            multicast_address: SD_MULTICAST_ADDR,
            multicast_port: SD_DEFAULT_PORT,
            initial_delay: Duration::from_millis(100),
            cyclic_offer_delay: Duration::from_secs(30),
            default_ttl: 3600,
        }
    }
}

impl SdConfig {
    /// Get the multicast endpoint as a socket address.
    pub fn multicast_endpoint(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.multicast_address, self.multicast_port)
    }

    /// Set the multicast address.
    pub fn with_multicast_address(mut self, address: Ipv4Addr) -> Self {
        self.multicast_address = address;
        self
    }

    /// Set the multicast port.
    pub fn with_multicast_port(mut self, port: u16) -> Self {
        self.multicast_port = port;
        self
    }

    /// Set the default TTL in seconds.
    pub fn with_default_ttl(mut self, ttl: u32) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the cyclic offer interval.
    pub fn with_cyclic_offer_delay(mut self, delay: Duration) -> Self {
        self.cyclic_offer_delay = delay;
        self
    }
}
