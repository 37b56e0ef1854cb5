//! SOME/IP payload serialization primitives.
//!
//! The SOME/IP serialization rules put every multi-byte value on the wire
//! big-endian, with 4-byte alignment after strings and explicit padding
//! where an interface requires it. [`Writer`] appends values to a growing
//! buffer; [`Reader`] consumes them from a byte slice with a cursor. Both
//! are the single choke point for byte order in this crate.
//!
//! # Example
//!
//! ```
//! use someip_core::wire::{Reader, Writer};
//!
//! let mut writer = Writer::new();
//! writer.write_u16(0x1234);
//! writer.write_string("hello");
//! writer.write_f64(1.5);
//!
//! let bytes = writer.into_bytes();
//! let mut reader = Reader::new(&bytes);
//! assert_eq!(reader.read_u16().unwrap(), 0x1234);
//! assert_eq!(reader.read_string().unwrap(), "hello");
//! assert_eq!(reader.read_f64().unwrap(), 1.5);
//! assert_eq!(reader.remaining(), 0);
//! ```

mod reader;
mod writer;

pub use reader::{Reader, WireRead};
pub use writer::{WireWrite, Writer};
