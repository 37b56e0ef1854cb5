//! SOME/IP Service Discovery (SD) wire format.
//!
//! SOME/IP-SD rides inside a SOME/IP message with Service ID 0xFFFF and
//! Method ID 0x8100, typically exchanged over UDP multicast
//! (239.255.255.251:30490). This module is the codec only: it turns SD
//! payload bytes into typed entries and options and back. Announcement
//! timing, offer state machines and sockets belong to the surrounding
//! engine, which configures itself from [`SdConfig`].
//!
//! # Example
//!
//! ```
//! use someip_core::sd::{InstanceId, SdMessage};
//! use someip_core::ServiceId;
//!
//! let find = SdMessage::find_service(ServiceId(0x1234), InstanceId::ANY, 0xFF, 0xFFFF_FFFF);
//! let bytes = find.to_bytes();
//! let parsed = SdMessage::from_bytes(&bytes).unwrap();
//! assert!(parsed.is_find_service());
//! ```

mod entry;
mod message;
mod option;
mod types;

pub use entry::{EventgroupEntry, SdEntry, ServiceEntry};
pub use message::{SdFlags, SdMessage};
pub use option::{
    ConfigurationOption, Endpoint, Ipv4EndpointOption, Ipv4MulticastOption, Ipv6EndpointOption,
    Ipv6MulticastOption, SdOption,
};
pub use types::{
    EntryType, EventgroupId, InstanceId, OptionType, SdConfig, TransportProtocol, SD_DEFAULT_PORT,
    SD_ENTRY_SIZE, SD_METHOD_ID, SD_MULTICAST_ADDR, SD_SERVICE_ID,
};
