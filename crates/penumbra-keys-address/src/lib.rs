//! Bech32 text forms of the 80 byte penumbra address payload.
//!
//! An [`Address`] couples the raw address bytes with a validated
//! human-readable prefix and renders as (or parses from) a Bech32m string by
//! default, or a Bech32 string for the compat format used when talking to
//! chains that only understand the older checksum.
//!
//! # Examples
//! ```
//! use penumbra_keys_address::{
//!     Address,
//!     Bech32,
//!     ADDRESS_PREFIX,
//!     COMPAT_ADDRESS_PREFIX,
//! };
//!
//! let address: Address = Address::builder()
//!     .array([7; 80])
//!     .prefix(ADDRESS_PREFIX)
//!     .try_build()
//!     .unwrap();
//! let compat = address
//!     .to_format::<Bech32>()
//!     .to_prefix(COMPAT_ADDRESS_PREFIX)
//!     .unwrap();
//! assert!(compat.to_string().starts_with("penumbracompat11"));
//! assert_eq!(address.as_bytes(), compat.as_bytes());
//! ```
use std::{
    fmt::{
        self,
        Debug,
        Display,
        Formatter,
    },
    hash::{
        Hash,
        Hasher,
    },
    marker::PhantomData,
    str::FromStr,
};

use bech32::{
    primitives::{
        decode::{
            CheckedHrpstring,
            CheckedHrpstringError,
        },
        hrp,
    },
    Hrp,
};

/// The number of bytes in a penumbra address.
pub const ADDRESS_LENGTH: usize = 80;

/// The human-readable prefix of Bech32m encoded addresses.
pub const ADDRESS_PREFIX: &str = "penumbrav2t";

/// The human-readable prefix of Bech32 (non-m) encoded compat addresses.
pub const COMPAT_ADDRESS_PREFIX: &str = "penumbracompat1";

/// An 80 byte address with a validated human readable prefix, rendered in
/// the checksum of `TFormat`.
pub struct Address<TFormat = Bech32m> {
    bytes: [u8; ADDRESS_LENGTH],
    prefix: Hrp,
    format: PhantomData<TFormat>,
}

impl<TFormat> Clone for Address<TFormat> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<TFormat> Copy for Address<TFormat> {}

impl<TFormat> PartialEq for Address<TFormat> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes && self.prefix == other.prefix
    }
}

impl<TFormat> Eq for Address<TFormat> {}

impl<TFormat> Hash for Address<TFormat> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
        self.prefix.hash(state);
    }
}

impl<TFormat: Format> Debug for Address<TFormat> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address")
            .field(&format_args!("{self}"))
            .finish()
    }
}

impl<TFormat> Address<TFormat> {
    #[must_use = "the builder must be used to construct an address to be useful"]
    pub fn builder() -> Builder<TFormat> {
        Builder {
            bytes: NoBytes,
            prefix: NoPrefix,
            format: PhantomData,
        }
    }

    #[must_use]
    pub fn bytes(self) -> [u8; ADDRESS_LENGTH] {
        self.bytes
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.bytes
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        self.prefix.as_str()
    }

    /// Returns the same address under `prefix`.
    ///
    /// # Errors
    /// Returns an error if `prefix` is not a valid bech32 human readable prefix.
    pub fn to_prefix(&self, prefix: &str) -> Result<Self, Error> {
        Self::builder().array(self.bytes).prefix(prefix).try_build()
    }

    /// Returns the same address rendered in the checksum of `TOther`.
    #[must_use]
    pub fn to_format<TOther>(&self) -> Address<TOther> {
        Address {
            bytes: self.bytes,
            prefix: self.prefix,
            format: PhantomData,
        }
    }
}

impl Address<Bech32m> {
    /// Should only be used where the inputs have been provided by a trusted entity, e.g. read
    /// from our own storage.
    ///
    /// Note that this function is not considered part of the public API and is subject to breaking
    /// change at any time.
    #[cfg(feature = "unchecked-constructor")]
    #[doc(hidden)]
    #[must_use]
    pub fn unchecked_from_parts(bytes: [u8; ADDRESS_LENGTH], prefix: &str) -> Self {
        Self {
            bytes,
            prefix: Hrp::parse_unchecked(prefix),
            format: PhantomData,
        }
    }
}

impl<TFormat: Format> FromStr for Address<TFormat> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let checked = CheckedHrpstring::new::<TFormat::Checksum>(s).map_err(Error::decode)?;
        let bytes: Vec<u8> = checked.byte_iter().collect();
        Self::builder()
            .slice(&bytes)
            .prefix(checked.hrp().as_str())
            .try_build()
    }
}

impl<TFormat: Format> Display for Address<TFormat> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use bech32::EncodeError;
        match bech32::encode_lower_to_fmt::<TFormat::Checksum, _>(f, self.prefix, &self.bytes) {
            Ok(()) => Ok(()),
            Err(EncodeError::Fmt(err)) => Err(err),
            Err(err) => panic!(
                "only formatting errors are valid when encoding penumbra addresses; all other \
                 error variants (only TooLong as of bech32-0.11.0) are guaranteed to not happen \
                 because `Address` is length checked:\n{err:?}",
            ),
        }
    }
}

/// Builder state before the address bytes were provided.
pub struct NoBytes;
/// Builder state before the prefix was provided.
pub struct NoPrefix;
/// The provided address bytes, or the length of a slice that could not be used.
pub struct WithBytes(Result<[u8; ADDRESS_LENGTH], usize>);
pub struct WithPrefix<'a>(std::borrow::Cow<'a, str>);

/// Collects the bytes and prefix of an [`Address`]; both must be set before
/// [`Builder::try_build`] becomes available.
pub struct Builder<TFormat, TBytes = NoBytes, TPrefix = NoPrefix> {
    bytes: TBytes,
    prefix: TPrefix,
    format: PhantomData<TFormat>,
}

impl<TFormat, TBytes, TPrefix> Builder<TFormat, TBytes, TPrefix> {
    #[must_use = "the builder must be built to construct an address to be useful"]
    pub fn array(self, array: [u8; ADDRESS_LENGTH]) -> Builder<TFormat, WithBytes, TPrefix> {
        self.with_bytes(WithBytes(Ok(array)))
    }

    /// Uses `bytes` as the address payload. Its length is checked by
    /// [`Builder::try_build`].
    #[must_use = "the builder must be built to construct an address to be useful"]
    pub fn slice<T: AsRef<[u8]>>(self, bytes: T) -> Builder<TFormat, WithBytes, TPrefix> {
        let bytes = bytes.as_ref();
        self.with_bytes(WithBytes(
            <[u8; ADDRESS_LENGTH]>::try_from(bytes).map_err(|_| bytes.len()),
        ))
    }

    #[must_use = "the builder must be built to construct an address to be useful"]
    pub fn prefix<'a, T: Into<std::borrow::Cow<'a, str>>>(
        self,
        prefix: T,
    ) -> Builder<TFormat, TBytes, WithPrefix<'a>> {
        Builder {
            bytes: self.bytes,
            prefix: WithPrefix(prefix.into()),
            format: self.format,
        }
    }

    fn with_bytes(self, bytes: WithBytes) -> Builder<TFormat, WithBytes, TPrefix> {
        Builder {
            bytes,
            prefix: self.prefix,
            format: self.format,
        }
    }
}

impl<TFormat> Builder<TFormat, WithBytes, WithPrefix<'_>> {
    /// Attempts to build an address from the configured prefix and bytes.
    ///
    /// # Errors
    /// Returns an error if one of the following conditions are violated:
    /// + if the prefix shorter than 1 or longer than 83 characters, or contains characters outside
    ///   33-126 of ASCII characters.
    /// + if the provided bytes are not exactly 80 bytes.
    pub fn try_build(self) -> Result<Address<TFormat>, Error> {
        let Self {
            bytes: WithBytes(bytes),
            prefix: WithPrefix(prefix),
            format,
        } = self;
        let bytes = bytes.map_err(Error::incorrect_length)?;
        let prefix = Hrp::parse(&prefix).map_err(Error::invalid_prefix)?;
        Ok(Address {
            bytes,
            prefix,
            format,
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    fn decode(source: CheckedHrpstringError) -> Self {
        Self(ErrorKind::Decode {
            source,
        })
    }

    fn invalid_prefix(source: hrp::Error) -> Self {
        Self(ErrorKind::InvalidPrefix {
            source,
        })
    }

    fn incorrect_length(received: usize) -> Self {
        Self(ErrorKind::IncorrectLength {
            received,
        })
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
enum ErrorKind {
    #[error("failed decoding address text or verifying its checksum")]
    Decode { source: CheckedHrpstringError },
    #[error("expected an address of 80 bytes, got `{received}`")]
    IncorrectLength { received: usize },
    #[error("the provided prefix was not a valid bech32 human readable prefix")]
    InvalidPrefix { source: hrp::Error },
}

/// Addresses rendered with the bech32m checksum.
#[derive(Clone, Copy, Debug)]
pub enum Bech32m {}

/// Addresses rendered with the original bech32 checksum.
#[derive(Clone, Copy, Debug)]
pub enum Bech32 {}

/// The checksum an [`Address`] is rendered and parsed with.
pub trait Format: sealed::Sealed {
    type Checksum: bech32::Checksum;
}

impl Format for Bech32m {
    type Checksum = bech32::Bech32m;
}

impl Format for Bech32 {
    type Checksum = bech32::Bech32;
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Bech32m {}
    impl Sealed for super::Bech32 {}
}
