//! Records of the `penumbra.core.keys.v1alpha1` package.

use bytes::{
    Buf,
    BufMut,
    Bytes,
};
use penumbra_keys_wire::{
    encoding::{
        self,
        DecodeContext,
        WireType,
    },
    DecodeError,
    InvalidInvariant,
    Message,
    Name,
};
use tracing::{
    debug,
    warn,
};

use crate::raw::in_field;

const PACKAGE: &str = "penumbra.core.keys.v1alpha1";

/// A message whose only field is a `bytes` field with field number 1.
macro_rules! bytes_message {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(#[$field_meta:meta])*
            $field:ident
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Default, Debug)]
        #[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(default))]
        pub struct $name {
            $(#[$field_meta])*
            #[cfg_attr(
                feature = "serde",
                serde(
                    with = "crate::serde::base64_bytes",
                    skip_serializing_if = "Bytes::is_empty"
                )
            )]
            pub $field: Bytes,
        }

        impl Name for $name {
            const NAME: &'static str = stringify!($name);
            const PACKAGE: &'static str = PACKAGE;
        }

        impl Message for $name {
            fn encode_raw(&self, buf: &mut impl BufMut) {
                if !self.$field.is_empty() {
                    encoding::bytes::encode(1, &self.$field, buf);
                }
            }

            fn merge_field(
                &mut self,
                field_number: u32,
                wire_type: WireType,
                buf: &mut impl Buf,
                ctx: DecodeContext,
            ) -> Result<(), DecodeError> {
                match field_number {
                    1 => encoding::bytes::merge(wire_type, &mut self.$field, buf)
                        .map_err(in_field(Self::NAME, stringify!($field))),
                    _ => encoding::skip_field(wire_type, field_number, buf, ctx),
                }
            }

            fn encoded_len(&self) -> usize {
                if self.$field.is_empty() {
                    0
                } else {
                    encoding::bytes::encoded_len(1, &self.$field)
                }
            }
        }
    };
}

/// A Penumbra address. An address in Penumbra is a Bech32m-encoded
/// string, with the human-readable prefix (HRP) `penumbrav2t`.
#[derive(Clone, PartialEq, Eq, Hash, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Address {
    /// The bytes of the address. Must be represented as a series of
    /// `uint8` (i.e. values 0 through 255), with a length of 80 elements.
    #[cfg_attr(
        feature = "serde",
        serde(
            with = "crate::serde::base64_bytes",
            skip_serializing_if = "Bytes::is_empty"
        )
    )]
    pub inner: Bytes,
    /// Alternatively, a Bech32m-encoded string representation of the `inner`
    /// bytes.
    ///
    /// Implementations are not required to support parsing this field and
    /// should prefer to encode the bytes in all messages they produce. A
    /// message with both `inner` and `alt_bech32m` set is rejected.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "String::is_empty"))]
    pub alt_bech32m: String,
}

impl Name for Address {
    const NAME: &'static str = "Address";
    const PACKAGE: &'static str = PACKAGE;
}

impl Message for Address {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        if !self.inner.is_empty() {
            encoding::bytes::encode(1, &self.inner, buf);
        }
        if !self.alt_bech32m.is_empty() {
            encoding::string::encode(2, &self.alt_bech32m, buf);
        }
    }

    fn merge_field(
        &mut self,
        field_number: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        match field_number {
            1 => encoding::bytes::merge(wire_type, &mut self.inner, buf)
                .map_err(in_field(Self::NAME, "inner")),
            2 => encoding::string::merge(wire_type, &mut self.alt_bech32m, buf)
                .map_err(in_field(Self::NAME, "alt_bech32m")),
            _ => encoding::skip_field(wire_type, field_number, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if !self.inner.is_empty() {
            len += encoding::bytes::encoded_len(1, &self.inner);
        }
        if !self.alt_bech32m.is_empty() {
            len += encoding::string::encoded_len(2, &self.alt_bech32m);
        }
        len
    }

    fn check_invariants(&self) -> Result<(), InvalidInvariant> {
        if !self.inner.is_empty() && !self.alt_bech32m.is_empty() {
            warn!(
                inner.len = self.inner.len(),
                alt_bech32m = %self.alt_bech32m,
                "rejecting address with both `inner` and `alt_bech32m` set",
            );
            return Err(InvalidInvariant::new(
                Self::NAME,
                "`inner` and `alt_bech32m` must not both be set",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AddressView {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub address_view: Option<address_view::AddressView>,
}

impl Name for AddressView {
    const NAME: &'static str = "AddressView";
    const PACKAGE: &'static str = PACKAGE;
}

impl Message for AddressView {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        match &self.address_view {
            Some(address_view::AddressView::Decoded(decoded)) => {
                encoding::message::encode(1, decoded, buf);
            }
            Some(address_view::AddressView::Opaque(opaque)) => {
                encoding::message::encode(2, opaque, buf);
            }
            None => {}
        }
    }

    fn merge_field(
        &mut self,
        field_number: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        use address_view::AddressView as Variant;
        match field_number {
            1 => {
                let mut decoded = match self.address_view.take() {
                    Some(Variant::Decoded(decoded)) => decoded,
                    previous => {
                        if previous.is_some() {
                            debug!(
                                record = Self::NAME,
                                "replacing oneof variant `opaque` with later `decoded`"
                            );
                        }
                        address_view::Decoded::default()
                    }
                };
                let merged = encoding::message::merge(wire_type, &mut decoded, buf, ctx);
                self.address_view = Some(Variant::Decoded(decoded));
                merged.map_err(in_field(Self::NAME, "decoded"))
            }
            2 => {
                let mut opaque = match self.address_view.take() {
                    Some(Variant::Opaque(opaque)) => opaque,
                    previous => {
                        if previous.is_some() {
                            debug!(
                                record = Self::NAME,
                                "replacing oneof variant `decoded` with later `opaque`"
                            );
                        }
                        address_view::Opaque::default()
                    }
                };
                let merged = encoding::message::merge(wire_type, &mut opaque, buf, ctx);
                self.address_view = Some(Variant::Opaque(opaque));
                merged.map_err(in_field(Self::NAME, "opaque"))
            }
            _ => encoding::skip_field(wire_type, field_number, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        match &self.address_view {
            Some(address_view::AddressView::Decoded(decoded)) => {
                encoding::message::encoded_len(1, decoded)
            }
            Some(address_view::AddressView::Opaque(opaque)) => {
                encoding::message::encoded_len(2, opaque)
            }
            None => 0,
        }
    }

    fn check_invariants(&self) -> Result<(), InvalidInvariant> {
        match &self.address_view {
            Some(address_view::AddressView::Decoded(decoded)) => decoded.check_invariants(),
            Some(address_view::AddressView::Opaque(opaque)) => opaque.check_invariants(),
            None => Ok(()),
        }
    }
}

/// Nested message and enum types in `AddressView`.
pub mod address_view {
    use bytes::{
        Buf,
        BufMut,
    };
    use penumbra_keys_wire::{
        encoding::{
            self,
            DecodeContext,
            WireType,
        },
        DecodeError,
        InvalidInvariant,
        Message,
        Name,
    };

    use super::PACKAGE;
    use crate::raw::in_field;

    /// A decoded address, with information about the address index and wallet ID visible.
    #[derive(Clone, PartialEq, Eq, Hash, Default, Debug)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
    pub struct Decoded {
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        pub address: Option<super::Address>,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        pub index: Option<super::AddressIndex>,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        pub wallet_id: Option<super::WalletId>,
    }

    impl Name for Decoded {
        const NAME: &'static str = "Decoded";
        const PACKAGE: &'static str = PACKAGE;

        fn full_name() -> String {
            format!("{PACKAGE}.AddressView.{}", Self::NAME)
        }
    }

    impl Message for Decoded {
        fn encode_raw(&self, buf: &mut impl BufMut) {
            if let Some(address) = &self.address {
                encoding::message::encode(1, address, buf);
            }
            if let Some(index) = &self.index {
                encoding::message::encode(2, index, buf);
            }
            if let Some(wallet_id) = &self.wallet_id {
                encoding::message::encode(3, wallet_id, buf);
            }
        }

        fn merge_field(
            &mut self,
            field_number: u32,
            wire_type: WireType,
            buf: &mut impl Buf,
            ctx: DecodeContext,
        ) -> Result<(), DecodeError> {
            match field_number {
                1 => encoding::message::merge(
                    wire_type,
                    self.address.get_or_insert_with(Default::default),
                    buf,
                    ctx,
                )
                .map_err(in_field(Self::NAME, "address")),
                2 => encoding::message::merge(
                    wire_type,
                    self.index.get_or_insert_with(Default::default),
                    buf,
                    ctx,
                )
                .map_err(in_field(Self::NAME, "index")),
                3 => encoding::message::merge(
                    wire_type,
                    self.wallet_id.get_or_insert_with(Default::default),
                    buf,
                    ctx,
                )
                .map_err(in_field(Self::NAME, "wallet_id")),
                _ => encoding::skip_field(wire_type, field_number, buf, ctx),
            }
        }

        fn encoded_len(&self) -> usize {
            self.address
                .as_ref()
                .map_or(0, |address| encoding::message::encoded_len(1, address))
                + self
                    .index
                    .as_ref()
                    .map_or(0, |index| encoding::message::encoded_len(2, index))
                + self
                    .wallet_id
                    .as_ref()
                    .map_or(0, |wallet_id| encoding::message::encoded_len(3, wallet_id))
        }

        fn check_invariants(&self) -> Result<(), InvalidInvariant> {
            self.address
                .as_ref()
                .map_or(Ok(()), Message::check_invariants)
        }
    }

    /// An opaque address, with no information about the address index or wallet ID visible.
    #[derive(Clone, PartialEq, Eq, Hash, Default, Debug)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(default))]
    pub struct Opaque {
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        pub address: Option<super::Address>,
    }

    impl Name for Opaque {
        const NAME: &'static str = "Opaque";
        const PACKAGE: &'static str = PACKAGE;

        fn full_name() -> String {
            format!("{PACKAGE}.AddressView.{}", Self::NAME)
        }
    }

    impl Message for Opaque {
        fn encode_raw(&self, buf: &mut impl BufMut) {
            if let Some(address) = &self.address {
                encoding::message::encode(1, address, buf);
            }
        }

        fn merge_field(
            &mut self,
            field_number: u32,
            wire_type: WireType,
            buf: &mut impl Buf,
            ctx: DecodeContext,
        ) -> Result<(), DecodeError> {
            match field_number {
                1 => encoding::message::merge(
                    wire_type,
                    self.address.get_or_insert_with(Default::default),
                    buf,
                    ctx,
                )
                .map_err(in_field(Self::NAME, "address")),
                _ => encoding::skip_field(wire_type, field_number, buf, ctx),
            }
        }

        fn encoded_len(&self) -> usize {
            self.address
                .as_ref()
                .map_or(0, |address| encoding::message::encoded_len(1, address))
        }

        fn check_invariants(&self) -> Result<(), InvalidInvariant> {
            self.address
                .as_ref()
                .map_or(Ok(()), Message::check_invariants)
        }
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
    pub enum AddressView {
        Decoded(Decoded),
        Opaque(Opaque),
    }
}

bytes_message! {
    /// Symmetric encryption key material.
    PayloadKey {
        inner
    }
}

bytes_message! {
    SpendKey {
        inner
    }
}

bytes_message! {
    FullViewingKey {
        inner
    }
}

bytes_message! {
    WalletId {
        inner
    }
}

bytes_message! {
    Diversifier {
        inner
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AddressIndex {
    /// The sub-account the address belongs to.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "is_zero"))]
    pub account: u32,
    /// Optional bytes randomizing the derived address.
    #[cfg_attr(
        feature = "serde",
        serde(
            with = "crate::serde::base64_bytes",
            skip_serializing_if = "Bytes::is_empty"
        )
    )]
    pub randomizer: Bytes,
}

#[cfg(feature = "serde")]
fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl Name for AddressIndex {
    const NAME: &'static str = "AddressIndex";
    const PACKAGE: &'static str = PACKAGE;
}

impl Message for AddressIndex {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        if self.account != 0 {
            encoding::uint32::encode(2, self.account, buf);
        }
        if !self.randomizer.is_empty() {
            encoding::bytes::encode(3, &self.randomizer, buf);
        }
    }

    fn merge_field(
        &mut self,
        field_number: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        match field_number {
            2 => encoding::uint32::merge(wire_type, &mut self.account, buf)
                .map_err(in_field(Self::NAME, "account")),
            3 => encoding::bytes::merge(wire_type, &mut self.randomizer, buf)
                .map_err(in_field(Self::NAME, "randomizer")),
            _ => encoding::skip_field(wire_type, field_number, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if self.account != 0 {
            len += encoding::uint32::encoded_len(2, self.account);
        }
        if !self.randomizer.is_empty() {
            len += encoding::bytes::encoded_len(3, &self.randomizer);
        }
        len
    }
}

bytes_message! {
    /// A validator's identity key (decaf377-rdsa spendauth verification key).
    IdentityKey {
        ik
    }
}

bytes_message! {
    /// A validator's governance key (decaf377-rdsa spendauth verification key).
    GovernanceKey {
        gk
    }
}

bytes_message! {
    ConsensusKey {
        inner
    }
}
