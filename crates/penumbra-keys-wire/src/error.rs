use std::fmt::{
    self,
    Display,
    Formatter,
};

use crate::encoding::WireType;

/// A record holds a combination of field values that its schema forbids.
///
/// Returned by [`crate::Message::check_invariants`], and wrapped by both
/// [`DecodeError`] and [`EncodeError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{message}` violates an invariant: {reason}")]
pub struct InvalidInvariant {
    message: &'static str,
    reason: &'static str,
}

impl InvalidInvariant {
    #[must_use]
    pub const fn new(message: &'static str, reason: &'static str) -> Self {
        Self {
            message,
            reason,
        }
    }

    /// The name of the message that violated the invariant.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.message
    }

    #[must_use]
    pub const fn reason(&self) -> &'static str {
        self.reason
    }
}

/// An error returned when decoding a message from the wire format failed.
///
/// Besides the reason for the failure (see [`DecodeError::kind`]) the error
/// records the path of `Message.field` pairs under which the failure occurred,
/// from the outermost message inwards.
#[derive(Debug, thiserror::Error)]
#[error("failed decoding protobuf message{}", DisplayPath(.stack))]
pub struct DecodeError {
    #[source]
    kind: DecodeErrorKind,
    // pushed while unwinding, so the innermost field comes first
    stack: Vec<(&'static str, &'static str)>,
}

impl DecodeError {
    fn new(kind: DecodeErrorKind) -> Self {
        Self {
            kind,
            stack: Vec::new(),
        }
    }

    pub(crate) fn malformed_varint() -> Self {
        Self::new(DecodeErrorKind::MalformedVarint)
    }

    pub(crate) fn truncated(needed: usize, remaining: usize) -> Self {
        Self::new(DecodeErrorKind::TruncatedInput {
            needed,
            remaining,
        })
    }

    pub(crate) fn wire_type_mismatch(expected: WireType, actual: WireType) -> Self {
        Self::new(DecodeErrorKind::WireTypeMismatch {
            expected,
            actual,
        })
    }

    pub(crate) fn invalid_wire_type(value: u64) -> Self {
        Self::new(DecodeErrorKind::InvalidWireType {
            value,
        })
    }

    pub(crate) fn invalid_key(key: u64) -> Self {
        Self::new(DecodeErrorKind::InvalidKey {
            key,
        })
    }

    pub(crate) fn invalid_utf8(source: std::str::Utf8Error) -> Self {
        Self::new(DecodeErrorKind::InvalidUtf8 {
            source,
        })
    }

    pub(crate) fn unexpected_end_group(field_number: u32) -> Self {
        Self::new(DecodeErrorKind::UnexpectedEndGroup {
            field_number,
        })
    }

    pub(crate) fn recursion_limit_reached(limit: u32) -> Self {
        Self::new(DecodeErrorKind::RecursionLimitReached {
            limit,
        })
    }

    /// Returns the reason decoding failed.
    #[must_use]
    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    /// Returns the `Message.field` pairs leading to the failure, outermost first.
    pub fn path(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.stack.iter().rev().copied()
    }

    /// Records that the error occurred while decoding `field` of `message`.
    ///
    /// Called by [`crate::Message::merge_field`] implementations when a
    /// field's payload could not be merged.
    #[doc(hidden)]
    pub fn push(&mut self, message: &'static str, field: &'static str) {
        self.stack.push((message, field));
    }
}

impl From<InvalidInvariant> for DecodeError {
    fn from(source: InvalidInvariant) -> Self {
        Self::new(DecodeErrorKind::InvalidInvariant(source))
    }
}

struct DisplayPath<'a>(&'a [(&'static str, &'static str)]);

impl Display for DisplayPath<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut fields = self.0.iter().rev();
        let Some((message, field)) = fields.next() else {
            return Ok(());
        };
        write!(f, " at `{message}.{field}")?;
        for (message, field) in fields {
            write!(f, " > {message}.{field}")?;
        }
        f.write_str("`")
    }
}

/// The reason decoding a message failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    #[error("variable-length integer is longer than 10 bytes or overflows 64 bits")]
    MalformedVarint,
    #[error("input truncated: needed {needed} bytes, but only {remaining} remain")]
    TruncatedInput { needed: usize, remaining: usize },
    #[error("expected wire type `{expected}`, got `{actual}`")]
    WireTypeMismatch {
        expected: WireType,
        actual: WireType,
    },
    #[error("`{value}` is not a valid wire type")]
    InvalidWireType { value: u64 },
    #[error("`{key}` is not a valid field key")]
    InvalidKey { key: u64 },
    #[error("string field does not contain valid UTF-8")]
    InvalidUtf8 { source: std::str::Utf8Error },
    #[error("found end group key of field `{field_number}` without a matching start group")]
    UnexpectedEndGroup { field_number: u32 },
    #[error("nesting of messages and groups exceeds the recursion limit of {limit}")]
    RecursionLimitReached { limit: u32 },
    #[error("decoded record is invalid")]
    InvalidInvariant(#[source] InvalidInvariant),
}

/// An error returned when encoding a message failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(transparent)]
pub struct EncodeError(EncodeErrorKind);

impl EncodeError {
    pub(crate) fn insufficient_capacity(required: usize, remaining: usize) -> Self {
        Self(EncodeErrorKind::InsufficientCapacity {
            required,
            remaining,
        })
    }

    pub(crate) fn invalid_invariant(source: InvalidInvariant) -> Self {
        Self(EncodeErrorKind::InvalidInvariant(source))
    }

    /// Returns the reason encoding failed.
    #[must_use]
    pub fn kind(&self) -> &EncodeErrorKind {
        &self.0
    }
}

/// The reason encoding a message failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum EncodeErrorKind {
    #[error("encoding requires {required} bytes, but the buffer only has {remaining} remaining")]
    InsufficientCapacity { required: usize, remaining: usize },
    #[error("record cannot be encoded")]
    InvalidInvariant(#[source] InvalidInvariant),
}
