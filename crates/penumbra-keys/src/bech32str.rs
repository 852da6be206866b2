//! Bech32m text forms of fixed-length key material.

use bech32::{
    primitives::decode::{
        CheckedHrpstring,
        CheckedHrpstringError,
    },
    Bech32m,
    Hrp,
};

pub(crate) const SPEND_KEY_PREFIX: Hrp = Hrp::parse_unchecked("penumbraspendkey");
pub(crate) const FULL_VIEWING_KEY_PREFIX: Hrp = Hrp::parse_unchecked("penumbrafullviewingkey");
pub(crate) const WALLET_ID_PREFIX: Hrp = Hrp::parse_unchecked("penumbrawalletid");
pub(crate) const IDENTITY_KEY_PREFIX: Hrp = Hrp::parse_unchecked("penumbravalid");
pub(crate) const GOVERNANCE_KEY_PREFIX: Hrp = Hrp::parse_unchecked("penumbragovern");

/// Writes `bytes` as a lower case bech32m string with the human readable `prefix`.
pub(crate) fn encode(
    f: &mut std::fmt::Formatter<'_>,
    prefix: Hrp,
    bytes: &[u8],
) -> std::fmt::Result {
    use bech32::EncodeError;
    match bech32::encode_lower_to_fmt::<Bech32m, _>(f, prefix, bytes) {
        Ok(()) => Ok(()),
        Err(EncodeError::Fmt(err)) => Err(err),
        Err(err) => panic!(
            "only formatting errors are valid when encoding fixed-length keys; all other error \
             variants (only TooLong as of bech32-0.11.0) are guaranteed to not happen for \
             payloads of at most 64 bytes:\n{err:?}",
        ),
    }
}

/// Parses a bech32m string with the human readable `prefix` into `N` bytes.
pub(crate) fn decode<const N: usize>(input: &str, prefix: Hrp) -> Result<[u8; N], Error> {
    let checked = CheckedHrpstring::new::<Bech32m>(input).map_err(Error::decode)?;
    if checked.hrp() != prefix {
        return Err(Error::unexpected_prefix(prefix, checked.hrp()));
    }
    let bytes: Vec<u8> = checked.byte_iter().collect();
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| Error::incorrect_length(N, bytes.len()))
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub(crate) struct Error(ErrorKind);

impl Error {
    fn decode(source: CheckedHrpstringError) -> Self {
        Self(ErrorKind::Decode {
            source,
        })
    }

    fn unexpected_prefix(expected: Hrp, received: Hrp) -> Self {
        Self(ErrorKind::UnexpectedPrefix {
            expected,
            received,
        })
    }

    fn incorrect_length(expected: usize, received: usize) -> Self {
        Self(ErrorKind::IncorrectLength {
            expected,
            received,
        })
    }
}

#[derive(Debug, thiserror::Error)]
enum ErrorKind {
    #[error("failed decoding provided bech32m string")]
    Decode { source: CheckedHrpstringError },
    #[error("expected bech32m human readable prefix `{expected}`, got `{received}`")]
    UnexpectedPrefix { expected: Hrp, received: Hrp },
    #[error("expected {expected} bytes, got {received}")]
    IncorrectLength { expected: usize, received: usize },
}
