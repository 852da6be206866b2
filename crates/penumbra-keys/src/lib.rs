//! Penumbra key and address records and their protobuf wire encoding.
//!
//! The [`raw`] module holds one record per message of the
//! `penumbra.core.keys.v1alpha1` package, encoded and decoded through
//! [`penumbra_keys_wire`]. The remaining modules hold validated domain types
//! that convert to and from those records through the [`Protobuf`] trait.
//!
//! # Examples
//! ```
//! use penumbra_keys::{
//!     raw,
//!     AddressIndex,
//!     Protobuf as _,
//! };
//!
//! let index = AddressIndex::new(7);
//! let bytes = index.encode_to_vec();
//! assert_eq!(bytes, [0x10, 0x07]);
//! assert_eq!(index, AddressIndex::decode(&bytes[..]).unwrap());
//!
//! let raw = raw::keys::v1alpha1::AddressIndex::default();
//! assert_eq!(AddressIndex::new(0), AddressIndex::try_from_raw(raw).unwrap());
//! ```

use bytes::Buf;
use penumbra_keys_wire::{
    Message,
    Name,
};

#[cfg(not(target_pointer_width = "64"))]
compile_error!(
    "library is only guaranteed to run on 64 bit machines due to casts from/to u64 and usize"
);

pub mod raw;

pub mod address;
mod bech32str;
pub mod identity;
pub mod keys;

#[cfg(feature = "serde")]
pub(crate) mod serde;

pub use address::{
    Address,
    AddressError,
    AddressIndex,
    AddressIndexError,
    AddressView,
    AddressViewError,
};
pub use identity::{
    ConsensusKey,
    GovernanceKey,
    IdentityKey,
};
pub use keys::{
    Diversifier,
    FullViewingKey,
    KeyError,
    PayloadKey,
    SpendKey,
    WalletId,
};
/// Bech32 text forms of addresses under arbitrary prefixes and checksums.
pub use penumbra_keys_address as text;
pub use penumbra_keys_wire as wire;

/// A trait to convert from raw decoded protobuf records to validated penumbra types.
pub trait Protobuf: Sized {
    /// Errors that can occur when transforming from a raw type.
    type Error: std::error::Error + 'static;
    /// The raw protobuf record.
    type Raw: Message + Name;

    /// Convert from a reference to the raw protobuf type.
    ///
    /// # Errors
    /// Returns [`Self::Error`] as defined by the implementor of this trait.
    fn try_from_raw_ref(raw: &Self::Raw) -> Result<Self, Self::Error>;

    /// Convert from the raw protobuf type, dropping it.
    ///
    /// This method provides a default implementation in terms of
    /// [`Self::try_from_raw_ref`].
    ///
    /// # Errors
    /// Returns [`Self::Error`] as defined by the implementor of this trait.
    fn try_from_raw(raw: Self::Raw) -> Result<Self, Self::Error> {
        Self::try_from_raw_ref(&raw)
    }

    /// Convert to the raw protobuf type by reference.
    fn to_raw(&self) -> Self::Raw;

    /// Convert to the raw protobuf type, dropping `self`.
    ///
    /// This method provides a default implementation in terms of
    /// [`Self::to_raw`].
    fn into_raw(self) -> Self::Raw {
        Self::to_raw(&self)
    }

    #[must_use]
    fn full_name() -> String {
        Self::Raw::full_name()
    }

    /// Decodes the wire encoding of [`Self::Raw`] in `buf` and validates it.
    ///
    /// # Errors
    /// Returns an error if `buf` does not hold a valid encoding of the raw
    /// record, or if the raw record is not a valid `Self`.
    fn decode(buf: impl Buf) -> Result<Self, DecodeError<Self::Error>> {
        let raw = Self::Raw::decode(buf).map_err(DecodeError::Wire)?;
        Self::try_from_raw(raw).map_err(DecodeError::Invalid)
    }

    /// Encodes `self` as the wire encoding of its raw record.
    // allow: panics are checked to not happen
    #[allow(clippy::missing_panics_doc)]
    #[must_use]
    fn encode_to_vec(&self) -> Vec<u8> {
        self.to_raw().encode_to_vec().expect(
            "raw records built from validated types always satisfy their invariants; this is a \
             bug",
        )
    }
}

/// An error decoding a validated type from its wire encoding.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError<E: std::error::Error + 'static> {
    #[error("bytes were not a valid protobuf encoding")]
    Wire(#[source] penumbra_keys_wire::DecodeError),
    #[error("decoded protobuf record was not valid")]
    Invalid(#[source] E),
}
