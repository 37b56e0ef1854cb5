//! SOME/IP-SD option types.
//!
//! Every option shares the same framing: a 2-byte big-endian length that
//! counts every byte after the length field, a 1-byte type code, a
//! reserved byte, then the type-specific body. Unknown types are carried
//! as raw bytes and skipped by their declared length, so new option
//! kinds pass through old decoders untouched.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};

use crate::error::{Result, SomeIpError};

use super::types::{OptionType, TransportProtocol};

/// Bytes before the option body: length (2) + type (1) + reserved (1).
const OPTION_PREAMBLE: usize = 4;

/// IPv4 endpoint option (type 0x04).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4EndpointOption {
    /// IPv4 address.
    pub address: Ipv4Addr,
    /// Transport protocol (TCP or UDP).
    pub protocol: TransportProtocol,
    /// Port number.
    pub port: u16,
}

impl Ipv4EndpointOption {
    /// Body size: address (4) + reserved (1) + protocol (1) + port (2).
    const BODY_SIZE: usize = 8;

    /// Create a new IPv4 endpoint option.
    pub fn new(address: Ipv4Addr, protocol: TransportProtocol, port: u16) -> Self {
        Self {
            address,
            protocol,
            port,
        }
    }

    /// Create from a socket address.
    pub fn from_socket_addr(addr: SocketAddrV4, protocol: TransportProtocol) -> Self {
        Self::new(*addr.ip(), protocol, addr.port())
    }

    /// Convert to a socket address.
    pub fn to_socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.address, self.port)
    }

    fn from_body(body: &[u8]) -> Result<Self> {
        if body.len() < Self::BODY_SIZE {
            return Err(SomeIpError::MessageTooShort {
                expected: Self::BODY_SIZE,
                actual: body.len(),
            });
        }

        let address = Ipv4Addr::new(body[0], body[1], body[2], body[3]);
        // body[4] is reserved
        let protocol = TransportProtocol::from_u8(body[5]).ok_or_else(|| {
            SomeIpError::malformed(format!("unknown L4 protocol: 0x{:02X}", body[5]))
        })?;
        let port = u16::from_be_bytes([body[6], body[7]]);

        Ok(Self::new(address, protocol, port))
    }

    fn body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::BODY_SIZE);
        buf.extend_from_slice(&self.address.octets());
        buf.push(0); // Reserved
        buf.push(self.protocol as u8);
        buf.extend_from_slice(&self.port.to_be_bytes());
        buf
    }
}

/// IPv6 endpoint option (type 0x06).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6EndpointOption {
    /// IPv6 address.
    pub address: Ipv6Addr,
    /// Transport protocol (TCP or UDP).
    pub protocol: TransportProtocol,
    /// Port number.
    pub port: u16,
}

impl Ipv6EndpointOption {
    /// Body size: address (16) + reserved (1) + protocol (1) + port (2).
    const BODY_SIZE: usize = 20;

    /// Create a new IPv6 endpoint option.
    pub fn new(address: Ipv6Addr, protocol: TransportProtocol, port: u16) -> Self {
        Self {
            address,
            protocol,
            port,
        }
    }

    /// Create from a socket address.
    pub fn from_socket_addr(addr: SocketAddrV6, protocol: TransportProtocol) -> Self {
        Self::new(*addr.ip(), protocol, addr.port())
    }

    /// Convert to a socket address.
    pub fn to_socket_addr(&self) -> SocketAddrV6 {
        SocketAddrV6::new(self.address, self.port, 0, 0)
    }

    fn from_body(body: &[u8]) -> Result<Self> {
        if body.len() < Self::BODY_SIZE {
            return Err(SomeIpError::MessageTooShort {
                expected: Self::BODY_SIZE,
                actual: body.len(),
            });
        }

        let mut octets = [0u8; 16];
        octets.copy_from_slice(&body[0..16]);
        // body[16] is reserved
        let protocol = TransportProtocol::from_u8(body[17]).ok_or_else(|| {
            SomeIpError::malformed(format!("unknown L4 protocol: 0x{:02X}", body[17]))
        })?;
        let port = u16::from_be_bytes([body[18], body[19]]);

        Ok(Self::new(Ipv6Addr::from(octets), protocol, port))
    }

    fn body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::BODY_SIZE);
        buf.extend_from_slice(&self.address.octets());
        buf.push(0); // Reserved
        buf.push(self.protocol as u8);
        buf.extend_from_slice(&self.port.to_be_bytes());
        buf
    }
}

/// IPv4 multicast option (type 0x14). Carries no L4 protocol byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4MulticastOption {
    /// IPv4 multicast group address.
    pub address: Ipv4Addr,
    /// Port number.
    pub port: u16,
}

impl Ipv4MulticastOption {
    /// Body size: address (4) + reserved (1) + port (2).
    const BODY_SIZE: usize = 7;

    /// Create a new IPv4 multicast option.
    pub fn new(address: Ipv4Addr, port: u16) -> Self {
        Self { address, port }
    }

    fn from_body(body: &[u8]) -> Result<Self> {
        if body.len() < Self::BODY_SIZE {
            return Err(SomeIpError::MessageTooShort {
                expected: Self::BODY_SIZE,
                actual: body.len(),
            });
        }

        let address = Ipv4Addr::new(body[0], body[1], body[2], body[3]);
        // body[4] is reserved
        let port = u16::from_be_bytes([body[5], body[6]]);

        Ok(Self::new(address, port))
    }

    fn body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::BODY_SIZE);
        buf.extend_from_slice(&self.address.octets());
        buf.push(0); // Reserved
        buf.extend_from_slice(&self.port.to_be_bytes());
        buf
    }
}

/// IPv6 multicast option (type 0x16). Carries no L4 protocol byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6MulticastOption {
    /// IPv6 multicast group address.
    pub address: Ipv6Addr,
    /// Port number.
    pub port: u16,
}

impl Ipv6MulticastOption {
    /// Body size: address (16) + reserved (1) + port (2).
    const BODY_SIZE: usize = 19;

    /// Create a new IPv6 multicast option.
    pub fn new(address: Ipv6Addr, port: u16) -> Self {
        Self { address, port }
    }

    fn from_body(body: &[u8]) -> Result<Self> {
        if body.len() < Self::BODY_SIZE {
            return Err(SomeIpError::MessageTooShort {
                expected: Self::BODY_SIZE,
                actual: body.len(),
            });
        }

        let mut octets = [0u8; 16];
        octets.copy_from_slice(&body[0..16]);
        // body[16] is reserved
        let port = u16::from_be_bytes([body[17], body[18]]);

        Ok(Self::new(Ipv6Addr::from(octets), port))
    }

    fn body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::BODY_SIZE);
        buf.extend_from_slice(&self.address.octets());
        buf.push(0); // Reserved
        buf.extend_from_slice(&self.port.to_be_bytes());
        buf
    }
}

/// Configuration string option (type 0x01).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationOption {
    /// Configuration string.
    pub config_string: String,
}

impl ConfigurationOption {
    /// Create a new configuration option.
    pub fn new(config_string: impl Into<String>) -> Self {
        Self {
            config_string: config_string.into(),
        }
    }

    fn from_body(body: &[u8]) -> Result<Self> {
        let config_string = String::from_utf8(body.to_vec())
            .map_err(|_| SomeIpError::malformed("invalid UTF-8 in configuration string"))?;
        Ok(Self { config_string })
    }

    fn body(&self) -> Vec<u8> {
        self.config_string.as_bytes().to_vec()
    }
}

/// An SD option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdOption {
    /// IPv4 endpoint option.
    Ipv4Endpoint(Ipv4EndpointOption),
    /// IPv6 endpoint option.
    Ipv6Endpoint(Ipv6EndpointOption),
    /// IPv4 multicast option.
    Ipv4Multicast(Ipv4MulticastOption),
    /// IPv6 multicast option.
    Ipv6Multicast(Ipv6MulticastOption),
    /// Configuration string option.
    Configuration(ConfigurationOption),
    /// Unknown option, preserved verbatim for forward compatibility.
    Unknown {
        /// Raw option type code.
        option_type: u8,
        /// Raw body bytes.
        data: Vec<u8>,
    },
}

impl SdOption {
    /// Parse an option from bytes (including the length/type preamble).
    ///
    /// Returns the option and the number of bytes consumed. Unknown
    /// types are preserved, not rejected; their declared length is
    /// consumed so the surrounding message stays in frame.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < OPTION_PREAMBLE {
            return Err(SomeIpError::MessageTooShort {
                expected: OPTION_PREAMBLE,
                actual: data.len(),
            });
        }

        // Declared length counts every byte after the length field.
        let declared = u16::from_be_bytes([data[0], data[1]]) as usize;
        if declared < 2 {
            return Err(SomeIpError::malformed(format!(
                "SD option length {declared} cannot cover type and reserved bytes"
            )));
        }

        let total_size = 2 + declared;
        if data.len() < total_size {
            return Err(SomeIpError::MessageTooShort {
                expected: total_size,
                actual: data.len(),
            });
        }

        let option_type = data[2];
        // data[3] is reserved
        let body = &data[OPTION_PREAMBLE..total_size];

        let option = match OptionType::from_u8(option_type) {
            Some(OptionType::Ipv4Endpoint) => {
                SdOption::Ipv4Endpoint(Ipv4EndpointOption::from_body(body)?)
            }
            Some(OptionType::Ipv6Endpoint) => {
                SdOption::Ipv6Endpoint(Ipv6EndpointOption::from_body(body)?)
            }
            Some(OptionType::Ipv4Multicast) => {
                SdOption::Ipv4Multicast(Ipv4MulticastOption::from_body(body)?)
            }
            Some(OptionType::Ipv6Multicast) => {
                SdOption::Ipv6Multicast(Ipv6MulticastOption::from_body(body)?)
            }
            Some(OptionType::Configuration) => {
                SdOption::Configuration(ConfigurationOption::from_body(body)?)
            }
            _ => SdOption::Unknown {
                option_type,
                data: body.to_vec(),
            },
        };

        Ok((option, total_size))
    }

    /// Serialize the option to bytes (including the preamble).
    pub fn to_bytes(&self) -> Vec<u8> {
        let (option_type, body) = match self {
            SdOption::Ipv4Endpoint(opt) => (OptionType::Ipv4Endpoint as u8, opt.body()),
            SdOption::Ipv6Endpoint(opt) => (OptionType::Ipv6Endpoint as u8, opt.body()),
            SdOption::Ipv4Multicast(opt) => (OptionType::Ipv4Multicast as u8, opt.body()),
            SdOption::Ipv6Multicast(opt) => (OptionType::Ipv6Multicast as u8, opt.body()),
            SdOption::Configuration(opt) => (OptionType::Configuration as u8, opt.body()),
            SdOption::Unknown { option_type, data } => (*option_type, data.clone()),
        };

        let declared = (2 + body.len()) as u16;
        let mut buf = Vec::with_capacity(OPTION_PREAMBLE + body.len());
        buf.extend_from_slice(&declared.to_be_bytes());
        buf.push(option_type);
        buf.push(0); // Reserved
        buf.extend_from_slice(&body);

        buf
    }

    /// Get the typed option code, or `None` for unknown options.
    pub fn option_type(&self) -> Option<OptionType> {
        match self {
            SdOption::Ipv4Endpoint(_) => Some(OptionType::Ipv4Endpoint),
            SdOption::Ipv6Endpoint(_) => Some(OptionType::Ipv6Endpoint),
            SdOption::Ipv4Multicast(_) => Some(OptionType::Ipv4Multicast),
            SdOption::Ipv6Multicast(_) => Some(OptionType::Ipv6Multicast),
            SdOption::Configuration(_) => Some(OptionType::Configuration),
            SdOption::Unknown { .. } => None,
        }
    }
}

/// A network endpoint (address + port + protocol).
///
/// Bridges between socket addresses and SD endpoint options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Socket address.
    pub address: SocketAddr,
    /// Transport protocol.
    pub protocol: TransportProtocol,
}

impl Endpoint {
    /// Create a new endpoint.
    pub fn new(address: SocketAddr, protocol: TransportProtocol) -> Self {
        Self { address, protocol }
    }

    /// Create a TCP endpoint.
    pub fn tcp(address: SocketAddr) -> Self {
        Self::new(address, TransportProtocol::Tcp)
    }

    /// Create a UDP endpoint.
    pub fn udp(address: SocketAddr) -> Self {
        Self::new(address, TransportProtocol::Udp)
    }

    /// Convert to an SD endpoint option.
    pub fn to_option(&self) -> SdOption {
        match self.address {
            SocketAddr::V4(addr) => {
                SdOption::Ipv4Endpoint(Ipv4EndpointOption::from_socket_addr(addr, self.protocol))
            }
            SocketAddr::V6(addr) => {
                SdOption::Ipv6Endpoint(Ipv6EndpointOption::from_socket_addr(addr, self.protocol))
            }
        }
    }

    /// Create from an SD option, if it is an endpoint option.
    pub fn from_option(option: &SdOption) -> Option<Self> {
        match option {
            SdOption::Ipv4Endpoint(opt) => Some(Self {
                address: SocketAddr::V4(opt.to_socket_addr()),
                protocol: opt.protocol,
            }),
            SdOption::Ipv6Endpoint(opt) => Some(Self {
                address: SocketAddr::V6(opt.to_socket_addr()),
                protocol: opt.protocol,
            }),
            _ => None,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let proto = match self.protocol {
            TransportProtocol::Tcp => "tcp",
            TransportProtocol::Udp => "udp",
        };
        write!(f, "{}://{}", proto, self.address)
    }
}
