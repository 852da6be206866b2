//! Validated penumbra addresses, address indices and address views.

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
use penumbra_keys_address::{
    Bech32,
    Bech32m,
    ADDRESS_PREFIX,
    COMPAT_ADDRESS_PREFIX,
};
pub use penumbra_keys_address::ADDRESS_LENGTH as ADDRESS_LEN_BYTES;

use crate::{
    keys::{
        KeyError,
        WalletId,
    },
    raw::keys::v1alpha1 as raw,
    Protobuf,
};

/// The number of bytes of an address index randomizer.
pub const RANDOMIZER_LEN_BYTES: usize = 12;

/// The number of data characters shown by [`Address::display_short_form`].
const SHORT_FORM_NUM_CHARS: usize = 24;

type TextAddress<TFormat> = penumbra_keys_address::Address<TFormat>;

/// A penumbra address.
///
/// Renders as (and parses from) a bech32m string with the human readable
/// prefix `penumbrav2t`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "raw::Address", into = "raw::Address")
)]
pub struct Address([u8; ADDRESS_LEN_BYTES]);

impl Address {
    #[must_use]
    pub const fn from_array(array: [u8; ADDRESS_LEN_BYTES]) -> Self {
        Self(array)
    }

    /// Convert a byte slice to an address.
    ///
    /// # Errors
    /// Returns an error if `bytes` is not 80 bytes long.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let inner = <[u8; ADDRESS_LEN_BYTES]>::try_from(bytes)
            .map_err(|_| AddressError::incorrect_length(bytes.len()))?;
        Ok(Self::from_array(inner))
    }

    #[must_use]
    pub fn to_bytes(self) -> [u8; ADDRESS_LEN_BYTES] {
        self.0
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN_BYTES] {
        &self.0
    }

    /// Returns the bech32 (non-m) encoding of the address with prefix
    /// `penumbracompat1`, for counterparties that only support the older checksum.
    #[must_use]
    pub fn compat_encoding(&self) -> String {
        self.to_text::<Bech32>(COMPAT_ADDRESS_PREFIX).to_string()
    }

    /// Returns the prefix, separator and first 24 data characters of the
    /// bech32m encoding, followed by an ellipsis.
    #[must_use]
    pub fn display_short_form(&self) -> String {
        let full = self.to_string();
        // bech32m strings are pure ASCII, so this is a char boundary
        let end = ADDRESS_PREFIX.len() + 1 + SHORT_FORM_NUM_CHARS;
        format!("{}…", &full[..end])
    }

    /// Returns a random address for use in tests.
    #[cfg(feature = "test-utils")]
    #[must_use]
    pub fn dummy<R: rand::RngCore + rand::CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0; ADDRESS_LEN_BYTES];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    fn to_text<TFormat>(self, prefix: &str) -> TextAddress<TFormat> {
        TextAddress::builder()
            .array(self.0)
            .prefix(prefix)
            .try_build()
            .expect(
                "address prefixes are constants that are valid bech32 human readable prefixes; \
                 this is a bug",
            )
    }

    fn from_text<TFormat>(
        text: &TextAddress<TFormat>,
        expected: &'static str,
    ) -> Result<Self, AddressError> {
        if text.prefix() != expected {
            return Err(AddressError::unexpected_prefix(expected, text.prefix()));
        }
        Ok(Self(text.bytes()))
    }
}

impl Protobuf for Address {
    type Error = AddressError;
    type Raw = raw::Address;

    fn try_from_raw_ref(raw: &Self::Raw) -> Result<Self, Self::Error> {
        let raw::Address {
            inner,
            alt_bech32m,
        } = raw;
        match (inner.is_empty(), alt_bech32m.is_empty()) {
            (false, true) => Self::try_from_slice(inner),
            (true, false) => alt_bech32m.parse(),
            (false, false) => Err(AddressError::both_fields_set()),
            (true, true) => Err(AddressError::empty()),
        }
    }

    fn to_raw(&self) -> Self::Raw {
        raw::Address {
            inner: Bytes::copy_from_slice(&self.0),
            alt_bech32m: String::new(),
        }
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Parses a bech32m address with prefix `penumbrav2t`, or a bech32 compat
    /// address with prefix `penumbracompat1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(COMPAT_ADDRESS_PREFIX) {
            let text: TextAddress<Bech32> = s.parse().map_err(AddressError::text)?;
            Self::from_text(&text, COMPAT_ADDRESS_PREFIX)
        } else {
            let text: TextAddress<Bech32m> = s.parse().map_err(AddressError::text)?;
            Self::from_text(&text, ADDRESS_PREFIX)
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.to_text::<Bech32m>(ADDRESS_PREFIX), f)
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ADDRESS_LEN_BYTES]> for Address {
    fn from(inner: [u8; ADDRESS_LEN_BYTES]) -> Self {
        Self(inner)
    }
}

impl TryFrom<raw::Address> for Address {
    type Error = AddressError;

    fn try_from(raw: raw::Address) -> Result<Self, Self::Error> {
        Self::try_from_raw(raw)
    }
}

impl From<Address> for raw::Address {
    fn from(value: Address) -> Self {
        value.into_raw()
    }
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct AddressError(AddressErrorKind);

impl AddressError {
    fn incorrect_length(received: usize) -> Self {
        Self(AddressErrorKind::IncorrectLength {
            received,
        })
    }

    fn text(source: penumbra_keys_address::Error) -> Self {
        Self(AddressErrorKind::Text {
            source,
        })
    }

    fn unexpected_prefix(expected: &'static str, received: &str) -> Self {
        Self(AddressErrorKind::UnexpectedPrefix {
            expected,
            received: received.to_string(),
        })
    }

    fn both_fields_set() -> Self {
        Self(AddressErrorKind::BothFieldsSet)
    }

    fn empty() -> Self {
        Self(AddressErrorKind::Empty)
    }
}

#[derive(Debug, thiserror::Error)]
enum AddressErrorKind {
    #[error("expected an address of 80 bytes, got `{received}`")]
    IncorrectLength { received: usize },
    #[error("failed parsing address text")]
    Text {
        source: penumbra_keys_address::Error,
    },
    #[error("expected address with human readable prefix `{expected}`, got `{received}`")]
    UnexpectedPrefix {
        expected: &'static str,
        received: String,
    },
    #[error("address protobuf must not set both its `inner` and `alt_bech32m` fields")]
    BothFieldsSet,
    #[error("address protobuf set neither its `inner` nor its `alt_bech32m` field")]
    Empty,
}

/// The index of an address within a wallet.
///
/// An all-zero randomizer is the default; addresses with a non-zero
/// randomizer are ephemeral.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "raw::AddressIndex", into = "raw::AddressIndex")
)]
pub struct AddressIndex {
    pub account: u32,
    pub randomizer: [u8; RANDOMIZER_LEN_BYTES],
}

impl AddressIndex {
    /// Returns the index of the default address of `account`.
    #[must_use]
    pub const fn new(account: u32) -> Self {
        Self {
            account,
            randomizer: [0; RANDOMIZER_LEN_BYTES],
        }
    }

    /// Returns `true` if the randomizer is not all zero.
    #[must_use]
    pub fn is_ephemeral(&self) -> bool {
        self.randomizer != [0; RANDOMIZER_LEN_BYTES]
    }
}

impl Protobuf for AddressIndex {
    type Error = AddressIndexError;
    type Raw = raw::AddressIndex;

    fn try_from_raw_ref(raw: &Self::Raw) -> Result<Self, Self::Error> {
        let raw::AddressIndex {
            account,
            randomizer,
        } = raw;
        let randomizer = if randomizer.is_empty() {
            [0; RANDOMIZER_LEN_BYTES]
        } else {
            <[u8; RANDOMIZER_LEN_BYTES]>::try_from(&randomizer[..])
                .map_err(|_| AddressIndexError::incorrect_randomizer_length(randomizer.len()))?
        };
        Ok(Self {
            account: *account,
            randomizer,
        })
    }

    fn to_raw(&self) -> Self::Raw {
        let randomizer = if self.is_ephemeral() {
            Bytes::copy_from_slice(&self.randomizer)
        } else {
            Bytes::new()
        };
        raw::AddressIndex {
            account: self.account,
            randomizer,
        }
    }
}

impl TryFrom<raw::AddressIndex> for AddressIndex {
    type Error = AddressIndexError;

    fn try_from(raw: raw::AddressIndex) -> Result<Self, Self::Error> {
        Self::try_from_raw(raw)
    }
}

impl From<AddressIndex> for raw::AddressIndex {
    fn from(value: AddressIndex) -> Self {
        value.into_raw()
    }
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct AddressIndexError(AddressIndexErrorKind);

impl AddressIndexError {
    fn incorrect_randomizer_length(received: usize) -> Self {
        Self(AddressIndexErrorKind::IncorrectRandomizerLength {
            received,
        })
    }
}

#[derive(Debug, thiserror::Error)]
enum AddressIndexErrorKind {
    #[error("expected a randomizer of 0 or 12 bytes, got `{received}`")]
    IncorrectRandomizerLength { received: usize },
}

/// An address together with what the viewer knows about it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "raw::AddressView", into = "raw::AddressView")
)]
pub enum AddressView {
    /// The viewer controls the address and knows its index and wallet.
    Decoded {
        address: Address,
        index: AddressIndex,
        wallet_id: WalletId,
    },
    Opaque {
        address: Address,
    },
}

impl AddressView {
    #[must_use]
    pub fn address(&self) -> Address {
        match self {
            Self::Decoded {
                address, ..
            }
            | Self::Opaque {
                address,
            } => *address,
        }
    }
}

impl Protobuf for AddressView {
    type Error = AddressViewError;
    type Raw = raw::AddressView;

    fn try_from_raw_ref(raw: &Self::Raw) -> Result<Self, Self::Error> {
        use raw::address_view::AddressView as RawVariant;

        let Some(variant) = &raw.address_view else {
            return Err(AddressViewError::unset());
        };
        match variant {
            RawVariant::Decoded(raw::address_view::Decoded {
                address,
                index,
                wallet_id,
            }) => {
                let address = address
                    .as_ref()
                    .ok_or_else(|| AddressViewError::field_not_set("decoded.address"))
                    .and_then(|address| {
                        Address::try_from_raw_ref(address).map_err(AddressViewError::address)
                    })?;
                let index = index
                    .as_ref()
                    .ok_or_else(|| AddressViewError::field_not_set("decoded.index"))
                    .and_then(|index| {
                        AddressIndex::try_from_raw_ref(index).map_err(AddressViewError::index)
                    })?;
                let wallet_id = wallet_id
                    .as_ref()
                    .ok_or_else(|| AddressViewError::field_not_set("decoded.wallet_id"))
                    .and_then(|wallet_id| {
                        WalletId::try_from_raw_ref(wallet_id).map_err(AddressViewError::wallet_id)
                    })?;
                Ok(Self::Decoded {
                    address,
                    index,
                    wallet_id,
                })
            }
            RawVariant::Opaque(raw::address_view::Opaque {
                address,
            }) => {
                let address = address
                    .as_ref()
                    .ok_or_else(|| AddressViewError::field_not_set("opaque.address"))
                    .and_then(|address| {
                        Address::try_from_raw_ref(address).map_err(AddressViewError::address)
                    })?;
                Ok(Self::Opaque {
                    address,
                })
            }
        }
    }

    fn to_raw(&self) -> Self::Raw {
        use raw::address_view::AddressView as RawVariant;

        let variant = match self {
            Self::Decoded {
                address,
                index,
                wallet_id,
            } => RawVariant::Decoded(raw::address_view::Decoded {
                address: Some(address.to_raw()),
                index: Some(index.to_raw()),
                wallet_id: Some(wallet_id.to_raw()),
            }),
            Self::Opaque {
                address,
            } => RawVariant::Opaque(raw::address_view::Opaque {
                address: Some(address.to_raw()),
            }),
        };
        raw::AddressView {
            address_view: Some(variant),
        }
    }
}

impl TryFrom<raw::AddressView> for AddressView {
    type Error = AddressViewError;

    fn try_from(raw: raw::AddressView) -> Result<Self, Self::Error> {
        Self::try_from_raw(raw)
    }
}

impl From<AddressView> for raw::AddressView {
    fn from(value: AddressView) -> Self {
        value.into_raw()
    }
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct AddressViewError(AddressViewErrorKind);

impl AddressViewError {
    fn unset() -> Self {
        Self(AddressViewErrorKind::Unset)
    }

    fn field_not_set(field: &'static str) -> Self {
        Self(AddressViewErrorKind::FieldNotSet {
            field,
        })
    }

    fn address(source: AddressError) -> Self {
        Self(AddressViewErrorKind::Address {
            source,
        })
    }

    fn index(source: AddressIndexError) -> Self {
        Self(AddressViewErrorKind::Index {
            source,
        })
    }

    fn wallet_id(source: KeyError) -> Self {
        Self(AddressViewErrorKind::WalletId {
            source,
        })
    }
}

#[derive(Debug, thiserror::Error)]
enum AddressViewErrorKind {
    #[error("neither the `decoded` nor the `opaque` variant was set")]
    Unset,
    #[error("the `{field}` field was not set")]
    FieldNotSet { field: &'static str },
    #[error("the `address` field was invalid")]
    Address { source: AddressError },
    #[error("the `index` field was invalid")]
    Index { source: AddressIndexError },
    #[error("the `wallet_id` field was invalid")]
    WalletId { source: KeyError },
}

#[cfg(test)]
mod tests;
