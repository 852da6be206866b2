//! Primitives of the protobuf wire format.
//!
//! Every field on the wire is a key, `field_number << 3 | wire_type` encoded
//! as a variable-length integer, followed by a payload whose shape is
//! determined by the wire type. The submodules [`bytes`], [`string`],
//! [`uint32`] and [`message`] encode, merge and measure one field of the
//! respective kind.

use std::fmt::{
    self,
    Display,
    Formatter,
};

use ::bytes::{
    Buf,
    BufMut,
};
use tracing::trace;

use crate::{
    DecodeError,
    Message,
};

/// The maximum number of bytes of a variable-length integer encoding a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// The smallest valid field number.
pub const MIN_FIELD_NUMBER: u32 = 1;

/// The largest valid field number.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// How deeply messages and groups may be nested before decoding gives up.
pub const RECURSION_LIMIT: u32 = 100;

/// The encoding category of a field's payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    SixtyFourBit = 1,
    LengthDelimited = 2,
    StartGroup = 3,
    EndGroup = 4,
    ThirtyTwoBit = 5,
}

impl TryFrom<u64> for WireType {
    type Error = DecodeError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Varint),
            1 => Ok(Self::SixtyFourBit),
            2 => Ok(Self::LengthDelimited),
            3 => Ok(Self::StartGroup),
            4 => Ok(Self::EndGroup),
            5 => Ok(Self::ThirtyTwoBit),
            other => Err(DecodeError::invalid_wire_type(other)),
        }
    }
}

impl Display for WireType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Varint => "varint",
            Self::SixtyFourBit => "64-bit",
            Self::LengthDelimited => "length-delimited",
            Self::StartGroup => "start group",
            Self::EndGroup => "end group",
            Self::ThirtyTwoBit => "32-bit",
        };
        f.write_str(name)
    }
}

/// State threaded through a decode call that bounds how deeply it may recurse.
#[derive(Clone, Copy, Debug)]
pub struct DecodeContext {
    depth_remaining: u32,
}

impl Default for DecodeContext {
    fn default() -> Self {
        Self {
            depth_remaining: RECURSION_LIMIT,
        }
    }
}

impl DecodeContext {
    /// Returns the context for decoding one level deeper.
    ///
    /// # Errors
    /// Returns an error if the recursion limit has been reached.
    pub fn enter_recursion(self) -> Result<Self, DecodeError> {
        let depth_remaining = self
            .depth_remaining
            .checked_sub(1)
            .ok_or_else(|| DecodeError::recursion_limit_reached(RECURSION_LIMIT))?;
        Ok(Self {
            depth_remaining,
        })
    }
}

/// Writes `value` as a variable-length integer: 7 bits per byte, least
/// significant group first, with the high bit set on all but the last byte.
pub fn encode_varint(mut value: u64, buf: &mut impl BufMut) {
    while value >= 0x80 {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "the value is masked to its lowest 7 bits"
        )]
        buf.put_u8((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the loop above leaves a value below 0x80"
    )]
    buf.put_u8(value as u8);
}

/// Reads a variable-length integer.
///
/// # Errors
/// Returns an error if the input ends before the last byte of the integer, or
/// if the integer does not fit into 64 bits.
pub fn decode_varint(buf: &mut impl Buf) -> Result<u64, DecodeError> {
    let mut value = 0u64;
    for index in 0..MAX_VARINT_LEN {
        if !buf.has_remaining() {
            return Err(DecodeError::truncated(1, 0));
        }
        let byte = buf.get_u8();
        // the tenth byte may only carry the single remaining bit of a u64
        if index == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(DecodeError::malformed_varint());
        }
        value |= u64::from(byte & 0x7f) << (index * 7);
        if byte < 0x80 {
            return Ok(value);
        }
    }
    Err(DecodeError::malformed_varint())
}

/// Returns the number of bytes `value` occupies as a variable-length integer.
#[must_use]
pub const fn encoded_len_varint(value: u64) -> usize {
    // 1 + floor(bit_length / 7), with bit_length of 0 counted as 1
    (((value | 1).leading_zeros() ^ 63) * 9 + 73) as usize / 64
}

/// Writes the key of field `field_number` with payload type `wire_type`.
pub fn encode_key(field_number: u32, wire_type: WireType, buf: &mut impl BufMut) {
    debug_assert!((MIN_FIELD_NUMBER..=MAX_FIELD_NUMBER).contains(&field_number));
    encode_varint((u64::from(field_number) << 3) | u64::from(wire_type as u8), buf);
}

/// Reads a field key, returning its field number and wire type.
///
/// # Errors
/// Returns an error if the key is not a well-formed varint, has a field number
/// outside [`MIN_FIELD_NUMBER`]`..=`[`MAX_FIELD_NUMBER`], or an unknown wire type.
pub fn decode_key(buf: &mut impl Buf) -> Result<(u32, WireType), DecodeError> {
    let key = decode_varint(buf)?;
    let Ok(key_u32) = u32::try_from(key) else {
        return Err(DecodeError::invalid_key(key));
    };
    let wire_type = WireType::try_from(key & 0x07)?;
    let field_number = key_u32 >> 3;
    if field_number < MIN_FIELD_NUMBER {
        return Err(DecodeError::invalid_key(key));
    }
    Ok((field_number, wire_type))
}

/// Returns the number of bytes the key of `field_number` occupies.
#[must_use]
pub const fn key_len(field_number: u32) -> usize {
    encoded_len_varint((field_number as u64) << 3)
}

/// Checks that a field was encoded with the wire type its schema declares.
///
/// # Errors
/// Returns an error if `expected` and `actual` differ.
pub fn check_wire_type(expected: WireType, actual: WireType) -> Result<(), DecodeError> {
    if expected == actual {
        Ok(())
    } else {
        Err(DecodeError::wire_type_mismatch(expected, actual))
    }
}

/// Reads the length prefix of a length-delimited payload.
///
/// # Errors
/// Returns an error if the prefix is malformed or claims more bytes than remain.
pub fn decode_length(buf: &mut impl Buf) -> Result<usize, DecodeError> {
    let len = decode_varint(buf)?;
    let remaining = buf.remaining();
    match usize::try_from(len) {
        Ok(len) if len <= remaining => Ok(len),
        Ok(len) => Err(DecodeError::truncated(len, remaining)),
        Err(_) => Err(DecodeError::truncated(usize::MAX, remaining)),
    }
}

fn advance(buf: &mut impl Buf, len: usize) -> Result<(), DecodeError> {
    let remaining = buf.remaining();
    if len > remaining {
        return Err(DecodeError::truncated(len, remaining));
    }
    buf.advance(len);
    Ok(())
}

/// Consumes and discards the payload of a field the message does not know.
///
/// Groups are skipped up to their matching end group key, including any
/// groups nested within.
///
/// # Errors
/// Returns an error if the payload is truncated or malformed, or if
/// `wire_type` is an end group without a preceding start group.
pub fn skip_field(
    wire_type: WireType,
    field_number: u32,
    buf: &mut impl Buf,
    ctx: DecodeContext,
) -> Result<(), DecodeError> {
    trace!(field_number, %wire_type, "skipping unknown field");
    match wire_type {
        WireType::Varint => {
            decode_varint(buf)?;
        }
        WireType::SixtyFourBit => advance(buf, 8)?,
        WireType::ThirtyTwoBit => advance(buf, 4)?,
        WireType::LengthDelimited => {
            let len = decode_length(buf)?;
            buf.advance(len);
        }
        WireType::StartGroup => {
            let ctx = ctx.enter_recursion()?;
            loop {
                let (inner_number, inner_type) = decode_key(buf)?;
                if inner_type == WireType::EndGroup {
                    if inner_number != field_number {
                        return Err(DecodeError::unexpected_end_group(inner_number));
                    }
                    break;
                }
                skip_field(inner_type, inner_number, buf, ctx)?;
            }
        }
        WireType::EndGroup => return Err(DecodeError::unexpected_end_group(field_number)),
    }
    Ok(())
}

/// Merges every field in `buf` into `message` until `buf` is exhausted.
///
/// # Errors
/// Returns the first error encountered while reading a key or merging a field.
pub fn merge_fields<M: Message>(
    message: &mut M,
    buf: &mut impl Buf,
    ctx: DecodeContext,
) -> Result<(), DecodeError> {
    while buf.has_remaining() {
        let (field_number, wire_type) = decode_key(buf)?;
        message.merge_field(field_number, wire_type, buf, ctx)?;
    }
    Ok(())
}

fn len_to_u64(len: usize) -> u64 {
    len.try_into().expect(
        "running on a machine with at most 64 bit pointer width and can convert from usize to \
         u64",
    )
}

fn length_delimited_len(field_number: u32, payload_len: usize) -> usize {
    key_len(field_number) + encoded_len_varint(len_to_u64(payload_len)) + payload_len
}

/// `bytes` fields, held as [`::bytes::Bytes`].
pub mod bytes {
    use ::bytes::{
        Buf,
        BufMut,
        Bytes,
    };

    use super::{
        check_wire_type,
        decode_length,
        encode_key,
        encode_varint,
        len_to_u64,
        length_delimited_len,
        WireType,
    };
    use crate::DecodeError;

    pub fn encode(field_number: u32, value: &[u8], buf: &mut impl BufMut) {
        encode_key(field_number, WireType::LengthDelimited, buf);
        encode_varint(len_to_u64(value.len()), buf);
        buf.put_slice(value);
    }

    /// Replaces `value` with the payload read from `buf`.
    ///
    /// The payload is not copied if `buf` is itself backed by [`Bytes`].
    ///
    /// # Errors
    /// Returns an error if the wire type is not length-delimited or the payload
    /// is truncated.
    pub fn merge(
        wire_type: WireType,
        value: &mut Bytes,
        buf: &mut impl Buf,
    ) -> Result<(), DecodeError> {
        check_wire_type(WireType::LengthDelimited, wire_type)?;
        let len = decode_length(buf)?;
        *value = buf.copy_to_bytes(len);
        Ok(())
    }

    #[must_use]
    pub fn encoded_len(field_number: u32, value: &[u8]) -> usize {
        length_delimited_len(field_number, value.len())
    }
}

/// `string` fields, which must hold valid UTF-8.
pub mod string {
    use ::bytes::{
        Buf,
        BufMut,
    };

    use super::{
        check_wire_type,
        decode_length,
        WireType,
    };
    use crate::DecodeError;

    pub fn encode(field_number: u32, value: &str, buf: &mut impl BufMut) {
        super::bytes::encode(field_number, value.as_bytes(), buf);
    }

    /// Replaces `value` with the string read from `buf`.
    ///
    /// # Errors
    /// Returns an error if the wire type is not length-delimited, the payload is
    /// truncated, or the payload is not valid UTF-8.
    pub fn merge(
        wire_type: WireType,
        value: &mut String,
        buf: &mut impl Buf,
    ) -> Result<(), DecodeError> {
        check_wire_type(WireType::LengthDelimited, wire_type)?;
        let len = decode_length(buf)?;
        let raw = buf.copy_to_bytes(len);
        let text = std::str::from_utf8(&raw).map_err(DecodeError::invalid_utf8)?;
        text.clone_into(value);
        Ok(())
    }

    #[must_use]
    pub fn encoded_len(field_number: u32, value: &str) -> usize {
        super::bytes::encoded_len(field_number, value.as_bytes())
    }
}

/// `uint32` fields, encoded as varints.
pub mod uint32 {
    use ::bytes::{
        Buf,
        BufMut,
    };

    use super::{
        check_wire_type,
        decode_varint,
        encode_key,
        encode_varint,
        encoded_len_varint,
        key_len,
        WireType,
    };
    use crate::DecodeError;

    pub fn encode(field_number: u32, value: u32, buf: &mut impl BufMut) {
        encode_key(field_number, WireType::Varint, buf);
        encode_varint(u64::from(value), buf);
    }

    /// Replaces `value` with the integer read from `buf`.
    ///
    /// Values wider than 32 bits are truncated to their low 32 bits.
    ///
    /// # Errors
    /// Returns an error if the wire type is not varint or the varint is malformed.
    pub fn merge(
        wire_type: WireType,
        value: &mut u32,
        buf: &mut impl Buf,
    ) -> Result<(), DecodeError> {
        check_wire_type(WireType::Varint, wire_type)?;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "protobuf uint32 fields keep the low 32 bits of wider values"
        )]
        let decoded = decode_varint(buf)? as u32;
        *value = decoded;
        Ok(())
    }

    #[must_use]
    pub fn encoded_len(field_number: u32, value: u32) -> usize {
        key_len(field_number) + encoded_len_varint(u64::from(value))
    }
}

/// Fields holding a nested message.
pub mod message {
    use ::bytes::{
        Buf,
        BufMut,
    };

    use super::{
        check_wire_type,
        decode_length,
        encode_key,
        encode_varint,
        len_to_u64,
        length_delimited_len,
        merge_fields,
        DecodeContext,
        WireType,
    };
    use crate::{
        DecodeError,
        Message,
    };

    pub fn encode<M: Message>(field_number: u32, message: &M, buf: &mut impl BufMut) {
        encode_key(field_number, WireType::LengthDelimited, buf);
        encode_varint(len_to_u64(message.encoded_len()), buf);
        message.encode_raw(buf);
    }

    /// Merges the nested message read from `buf` into `message`.
    ///
    /// The nested message's fields cannot read past its length prefix.
    ///
    /// # Errors
    /// Returns an error if the wire type is not length-delimited, the recursion
    /// limit is reached, or merging any nested field fails.
    pub fn merge<M: Message>(
        wire_type: WireType,
        message: &mut M,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        check_wire_type(WireType::LengthDelimited, wire_type)?;
        let ctx = ctx.enter_recursion()?;
        let len = decode_length(buf)?;
        let mut nested = (&mut *buf).take(len);
        merge_fields(message, &mut nested, ctx)
    }

    #[must_use]
    pub fn encoded_len<M: Message>(field_number: u32, message: &M) -> usize {
        length_delimited_len(field_number, message.encoded_len())
    }
}

#[cfg(test)]
mod tests;
