use std::fmt::Debug;

use bytes::{
    Buf,
    BufMut,
};

use crate::{
    encoding::{
        merge_fields,
        DecodeContext,
        WireType,
    },
    DecodeError,
    EncodeError,
    InvalidInvariant,
};

/// The fully qualified protobuf name of a message.
pub trait Name {
    /// The name of the message, without its package.
    const NAME: &'static str;
    /// The protobuf package the message is declared in.
    const PACKAGE: &'static str;

    #[must_use]
    fn full_name() -> String {
        format!("{}.{}", Self::PACKAGE, Self::NAME)
    }
}

/// A record with a protobuf wire encoding.
///
/// Implementors describe their fields through [`Message::encode_raw`],
/// [`Message::merge_field`] and [`Message::encoded_len`], using the helpers in
/// [`crate::encoding`]. The provided methods build full encode and decode on
/// top of them.
pub trait Message: Debug + Default + Send + Sync {
    /// Writes all non-default fields of `self` to `buf`, in field number order.
    ///
    /// Does not check invariants or the capacity of `buf`. Prefer
    /// [`Message::encode`] or [`Message::encode_to_vec`].
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized;

    /// Merges one field read from `buf` into `self`.
    ///
    /// Fields with unknown numbers must be skipped with
    /// [`crate::encoding::skip_field`].
    ///
    /// # Errors
    /// Returns an error if the field's payload could not be decoded.
    fn merge_field(
        &mut self,
        field_number: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized;

    /// Returns the exact number of bytes [`Message::encode_raw`] writes.
    fn encoded_len(&self) -> usize;

    /// Checks invariants the schema states but the wire format cannot express.
    ///
    /// Implementations must also check the invariants of nested messages.
    ///
    /// # Errors
    /// Returns an error describing the first violated invariant.
    fn check_invariants(&self) -> Result<(), InvalidInvariant> {
        Ok(())
    }

    /// Encodes `self` into `buf`.
    ///
    /// Nothing is written if an error is returned.
    ///
    /// # Errors
    /// Returns an error if `self` violates an invariant, or if `buf` does not
    /// have enough capacity left for the encoding.
    fn encode(&self, buf: &mut impl BufMut) -> Result<(), EncodeError>
    where
        Self: Sized,
    {
        self.check_invariants()
            .map_err(EncodeError::invalid_invariant)?;
        let required = self.encoded_len();
        let remaining = buf.remaining_mut();
        if required > remaining {
            return Err(EncodeError::insufficient_capacity(required, remaining));
        }
        self.encode_raw(buf);
        Ok(())
    }

    /// Encodes `self` into a newly allocated vector.
    ///
    /// # Errors
    /// Returns an error if `self` violates an invariant.
    fn encode_to_vec(&self) -> Result<Vec<u8>, EncodeError>
    where
        Self: Sized,
    {
        self.check_invariants()
            .map_err(EncodeError::invalid_invariant)?;
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_raw(&mut buf);
        Ok(buf)
    }

    /// Decodes a record from `buf`, which must contain exactly one message.
    ///
    /// Fields absent from `buf` keep their default values. On failure no
    /// partially decoded record is returned.
    ///
    /// # Errors
    /// Returns an error if `buf` is not a valid encoding of the message, or if
    /// the decoded record violates an invariant.
    fn decode(mut buf: impl Buf) -> Result<Self, DecodeError>
    where
        Self: Sized,
    {
        let mut message = Self::default();
        merge_fields(&mut message, &mut buf, DecodeContext::default())?;
        message.check_invariants()?;
        Ok(message)
    }
}
