//! Fixed-length key material carried by penumbra records.

use std::{
    fmt::{
        self,
        Debug,
        Display,
        Formatter,
    },
    str::FromStr,
};

use bytes::Bytes;
use zeroize::{
    Zeroize,
    ZeroizeOnDrop,
};

use crate::{
    bech32str::{
        self,
        FULL_VIEWING_KEY_PREFIX,
        SPEND_KEY_PREFIX,
        WALLET_ID_PREFIX,
    },
    raw::keys::v1alpha1 as raw,
    Protobuf,
};

pub const SPEND_KEY_LEN_BYTES: usize = 32;
pub const FULL_VIEWING_KEY_LEN_BYTES: usize = 64;
pub const WALLET_ID_LEN_BYTES: usize = 32;
pub const PAYLOAD_KEY_LEN_BYTES: usize = 32;
pub const DIVERSIFIER_LEN_BYTES: usize = 16;

/// Defines a `Copy` newtype over a fixed-length byte array together with its
/// conversions from and to the raw record `$raw` and its text form.
///
/// The text form is either bech32m with the given human readable prefix, or
/// lower case hex.
macro_rules! fixed_key {
    (
        $(#[$meta:meta])*
        $name:ident([u8; $len:ident]) => $raw:ident.$field:ident,
        text = bech32m($prefix:expr) $(,)?
    ) => {
        $crate::keys::fixed_key!(@common $(#[$meta])* $name([u8; $len]) => $raw.$field);

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                $crate::bech32str::encode(f, $prefix, &self.0)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::keys::KeyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $crate::bech32str::decode(s, $prefix)
                    .map(Self)
                    .map_err(|source| $crate::keys::KeyError::bech32m(stringify!($name), source))
            }
        }
    };
    (
        $(#[$meta:meta])*
        $name:ident([u8; $len:ident]) => $raw:ident.$field:ident,
        text = hex $(,)?
    ) => {
        $crate::keys::fixed_key!(@common $(#[$meta])* $name([u8; $len]) => $raw.$field);

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&::hex::encode(self.0))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::keys::KeyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let bytes = ::hex::decode(s)
                    .map_err(|source| $crate::keys::KeyError::hex(stringify!($name), source))?;
                Self::try_from_slice(&bytes)
            }
        }
    };
    (
        @common
        $(#[$meta:meta])*
        $name:ident([u8; $len:ident]) => $raw:ident.$field:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $len]);

        impl $name {
            #[must_use]
            pub const fn from_array(array: [u8; $len]) -> Self {
                Self(array)
            }

            /// Converts a byte slice to a key.
            ///
            /// # Errors
            /// Returns an error if `bytes` does not have the key's length.
            pub fn try_from_slice(bytes: &[u8]) -> Result<Self, $crate::keys::KeyError> {
                <[u8; $len]>::try_from(bytes).map(Self).map_err(|_| {
                    $crate::keys::KeyError::incorrect_length(stringify!($name), $len, bytes.len())
                })
            }

            #[must_use]
            pub fn to_bytes(self) -> [u8; $len] {
                self.0
            }

            #[must_use]
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_tuple(stringify!($name))
                    .field(&format_args!("{self}"))
                    .finish()
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(array: [u8; $len]) -> Self {
                Self(array)
            }
        }

        impl $crate::Protobuf for $name {
            type Error = $crate::keys::KeyError;
            type Raw = $crate::raw::keys::v1alpha1::$raw;

            fn try_from_raw_ref(raw: &Self::Raw) -> Result<Self, Self::Error> {
                Self::try_from_slice(&raw.$field)
            }

            fn to_raw(&self) -> Self::Raw {
                $crate::raw::keys::v1alpha1::$raw {
                    $field: ::bytes::Bytes::copy_from_slice(&self.0),
                }
            }
        }

        impl TryFrom<$crate::raw::keys::v1alpha1::$raw> for $name {
            type Error = $crate::keys::KeyError;

            fn try_from(raw: $crate::raw::keys::v1alpha1::$raw) -> Result<Self, Self::Error> {
                <Self as $crate::Protobuf>::try_from_raw(raw)
            }
        }

        impl From<$name> for $crate::raw::keys::v1alpha1::$raw {
            fn from(value: $name) -> Self {
                $crate::Protobuf::into_raw(value)
            }
        }

        $crate::keys::serde_via_raw!($name);
    };
}
pub(crate) use fixed_key;

/// Implements serde for a domain type through the JSON mapping of its raw record.
macro_rules! serde_via_raw {
    ($name:ident) => {
        #[cfg(feature = "serde")]
        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                ::serde::Serialize::serialize(&$crate::Protobuf::to_raw(self), serializer)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let raw = ::serde::Deserialize::deserialize(deserializer)?;
                <Self as $crate::Protobuf>::try_from_raw(raw).map_err(::serde::de::Error::custom)
            }
        }
    };
}
pub(crate) use serde_via_raw;

/// A spend key, the root authority over a wallet.
///
/// The key bytes are zeroed on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SpendKey([u8; SPEND_KEY_LEN_BYTES]);

impl SpendKey {
    #[must_use]
    pub const fn from_array(array: [u8; SPEND_KEY_LEN_BYTES]) -> Self {
        Self(array)
    }

    /// Converts a byte slice to a spend key.
    ///
    /// # Errors
    /// Returns an error if `bytes` is not 32 bytes long.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        <[u8; SPEND_KEY_LEN_BYTES]>::try_from(bytes)
            .map(Self)
            .map_err(|_| KeyError::incorrect_length("SpendKey", SPEND_KEY_LEN_BYTES, bytes.len()))
    }

    /// Returns the byte encoding of the spend key.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; SPEND_KEY_LEN_BYTES] {
        self.0
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; SPEND_KEY_LEN_BYTES] {
        &self.0
    }
}

impl Debug for SpendKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpendKey").finish_non_exhaustive() // avoids printing secret fields
    }
}

impl Display for SpendKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        bech32str::encode(f, SPEND_KEY_PREFIX, &self.0)
    }
}

impl FromStr for SpendKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        bech32str::decode(s, SPEND_KEY_PREFIX)
            .map(Self)
            .map_err(|source| KeyError::bech32m("SpendKey", source))
    }
}

impl From<[u8; SPEND_KEY_LEN_BYTES]> for SpendKey {
    fn from(array: [u8; SPEND_KEY_LEN_BYTES]) -> Self {
        Self(array)
    }
}

impl Protobuf for SpendKey {
    type Error = KeyError;
    type Raw = raw::SpendKey;

    fn try_from_raw_ref(raw: &Self::Raw) -> Result<Self, Self::Error> {
        Self::try_from_slice(&raw.inner)
    }

    fn to_raw(&self) -> Self::Raw {
        raw::SpendKey {
            inner: Bytes::copy_from_slice(&self.0),
        }
    }
}

serde_via_raw!(SpendKey);

fixed_key! {
    /// A full viewing key, granting visibility into all of a wallet's activity.
    FullViewingKey([u8; FULL_VIEWING_KEY_LEN_BYTES]) => FullViewingKey.inner,
    text = bech32m(FULL_VIEWING_KEY_PREFIX),
}

fixed_key! {
    /// The identifier of a wallet, derived from its full viewing key.
    WalletId([u8; WALLET_ID_LEN_BYTES]) => WalletId.inner,
    text = bech32m(WALLET_ID_PREFIX),
}

fixed_key! {
    /// Symmetric encryption key material.
    PayloadKey([u8; PAYLOAD_KEY_LEN_BYTES]) => PayloadKey.inner,
    text = hex,
}

fixed_key! {
    /// Selects one of the many addresses a wallet controls.
    Diversifier([u8; DIVERSIFIER_LEN_BYTES]) => Diversifier.inner,
    text = hex,
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct KeyError(KeyErrorKind);

impl KeyError {
    pub(crate) fn incorrect_length(key: &'static str, expected: usize, received: usize) -> Self {
        Self(KeyErrorKind::IncorrectLength {
            key,
            expected,
            received,
        })
    }

    pub(crate) fn bech32m(key: &'static str, source: bech32str::Error) -> Self {
        Self(KeyErrorKind::Bech32m {
            key,
            source,
        })
    }

    pub(crate) fn hex(key: &'static str, source: hex::FromHexError) -> Self {
        Self(KeyErrorKind::Hex {
            key,
            source,
        })
    }
}

#[derive(Debug, thiserror::Error)]
enum KeyErrorKind {
    #[error("expected `{key}` of {expected} bytes, got {received}")]
    IncorrectLength {
        key: &'static str,
        expected: usize,
        received: usize,
    },
    #[error("failed parsing `{key}` from bech32m text")]
    Bech32m {
        key: &'static str,
        source: bech32str::Error,
    },
    #[error("failed parsing `{key}` from hex text")]
    Hex {
        key: &'static str,
        source: hex::FromHexError,
    },
}
