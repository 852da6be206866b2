//! A hand-written codec for the protobuf binary wire format.
//!
//! The crate provides the building blocks that message records use to
//! describe their own encoding: variable-length integers, field keys and wire
//! types, per-field-kind helpers in [`encoding`], and the [`Message`] trait
//! that ties them together into `encode`/`decode`.
//!
//! # Examples
//! ```
//! use bytes::{
//!     Buf,
//!     BufMut,
//! };
//! use penumbra_keys_wire::{
//!     encoding::{
//!         self,
//!         DecodeContext,
//!         WireType,
//!     },
//!     DecodeError,
//!     Message,
//! };
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Counter {
//!     count: u32,
//! }
//!
//! impl Message for Counter {
//!     fn encode_raw(&self, buf: &mut impl BufMut) {
//!         if self.count != 0 {
//!             encoding::uint32::encode(1, self.count, buf);
//!         }
//!     }
//!
//!     fn merge_field(
//!         &mut self,
//!         field_number: u32,
//!         wire_type: WireType,
//!         buf: &mut impl Buf,
//!         ctx: DecodeContext,
//!     ) -> Result<(), DecodeError> {
//!         match field_number {
//!             1 => encoding::uint32::merge(wire_type, &mut self.count, buf),
//!             _ => encoding::skip_field(wire_type, field_number, buf, ctx),
//!         }
//!     }
//!
//!     fn encoded_len(&self) -> usize {
//!         if self.count == 0 {
//!             0
//!         } else {
//!             encoding::uint32::encoded_len(1, self.count)
//!         }
//!     }
//! }
//!
//! let bytes = Counter { count: 300 }.encode_to_vec().unwrap();
//! assert_eq!(bytes, [0x08, 0xac, 0x02]);
//! assert_eq!(Counter { count: 300 }, Counter::decode(&bytes[..]).unwrap());
//! ```

#[cfg(not(target_pointer_width = "64"))]
compile_error!(
    "library is only guaranteed to run on 64 bit machines due to casts from/to u64 and usize"
);

pub mod encoding;
mod error;
mod message;

pub use bytes;
pub use error::{
    DecodeError,
    DecodeErrorKind,
    EncodeError,
    EncodeErrorKind,
    InvalidInvariant,
};
pub use message::{
    Message,
    Name,
};
