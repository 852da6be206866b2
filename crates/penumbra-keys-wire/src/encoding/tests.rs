use ::bytes::{
    Buf as _,
    Bytes,
};
use hex_literal::hex;
use insta::assert_snapshot;

use super::*;
use crate::DecodeErrorKind;

fn varint_bytes(value: u64) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_varint(value, &mut buf);
    buf
}

#[track_caller]
fn assert_decode_kind(expected: &DecodeErrorKind, error: &DecodeError) {
    assert_eq!(expected, error.kind(), "unexpected decode error: {error}");
}

#[test]
fn varints_are_encoded_least_significant_group_first() {
    assert_snapshot!(hex::encode(varint_bytes(0)), @"00");
    assert_snapshot!(hex::encode(varint_bytes(1)), @"01");
    assert_snapshot!(hex::encode(varint_bytes(127)), @"7f");
    assert_snapshot!(hex::encode(varint_bytes(128)), @"8001");
    assert_snapshot!(hex::encode(varint_bytes(300)), @"ac02");
    assert_snapshot!(hex::encode(varint_bytes(u64::from(u32::MAX))), @"ffffffff0f");
    assert_snapshot!(hex::encode(varint_bytes(u64::MAX)), @"ffffffffffffffffff01");
}

#[test]
fn encoded_len_varint_matches_encoding() {
    let mut value = 1u64;
    while value != 0 {
        for candidate in [value - 1, value, value | (value >> 1)] {
            assert_eq!(
                varint_bytes(candidate).len(),
                encoded_len_varint(candidate),
                "length mismatch for {candidate}",
            );
        }
        value <<= 1;
    }
    assert_eq!(MAX_VARINT_LEN, encoded_len_varint(u64::MAX));
}

#[test]
fn varints_decode_to_their_encoded_value() {
    for value in [0, 1, 127, 128, 300, 16_384, u64::from(u32::MAX), u64::MAX] {
        let encoded = varint_bytes(value);
        let mut buf = &encoded[..];
        assert_eq!(value, decode_varint(&mut buf).unwrap());
        assert!(buf.is_empty());
    }
}

#[test]
fn varint_longer_than_ten_bytes_is_malformed() {
    let input = [0xff; 11];
    let error = decode_varint(&mut &input[..]).unwrap_err();
    assert_decode_kind(&DecodeErrorKind::MalformedVarint, &error);
}

#[test]
fn varint_overflowing_64_bits_is_malformed() {
    let input = hex!("ffffffffffffffffff02");
    let error = decode_varint(&mut &input[..]).unwrap_err();
    assert_decode_kind(&DecodeErrorKind::MalformedVarint, &error);
}

#[test]
fn varint_cut_short_is_truncated() {
    let error = decode_varint(&mut &hex!("ac")[..]).unwrap_err();
    assert_decode_kind(
        &DecodeErrorKind::TruncatedInput {
            needed: 1,
            remaining: 0,
        },
        &error,
    );
}

#[test]
fn keys_split_into_field_number_and_wire_type() {
    let mut buf = Vec::new();
    encode_key(2, WireType::Varint, &mut buf);
    encode_key(99, WireType::LengthDelimited, &mut buf);
    encode_key(MAX_FIELD_NUMBER, WireType::ThirtyTwoBit, &mut buf);
    assert_snapshot!(hex::encode(&buf), @"109a06fdffffff0f");

    let mut input = &buf[..];
    assert_eq!((2, WireType::Varint), decode_key(&mut input).unwrap());
    assert_eq!(
        (99, WireType::LengthDelimited),
        decode_key(&mut input).unwrap()
    );
    assert_eq!(
        (MAX_FIELD_NUMBER, WireType::ThirtyTwoBit),
        decode_key(&mut input).unwrap()
    );
    assert_eq!(key_len(MAX_FIELD_NUMBER), 5);
}

#[test]
fn field_number_zero_is_an_invalid_key() {
    let error = decode_key(&mut &[0x02][..]).unwrap_err();
    assert_decode_kind(
        &DecodeErrorKind::InvalidKey {
            key: 2,
        },
        &error,
    );
}

#[test]
fn key_wider_than_32_bits_is_invalid() {
    let input = varint_bytes(1 << 32 | 0x08);
    let error = decode_key(&mut &input[..]).unwrap_err();
    assert_decode_kind(
        &DecodeErrorKind::InvalidKey {
            key: 1 << 32 | 0x08,
        },
        &error,
    );
}

#[test]
fn wire_types_six_and_seven_are_invalid() {
    for (key, wire_type) in [(0x0e_u8, 6), (0x0f, 7)] {
        let error = decode_key(&mut &[key][..]).unwrap_err();
        assert_decode_kind(
            &DecodeErrorKind::InvalidWireType {
                value: wire_type,
            },
            &error,
        );
    }
}

#[test]
fn length_prefix_longer_than_input_is_truncated() {
    let error = decode_length(&mut &hex!("05010203")[..]).unwrap_err();
    assert_decode_kind(
        &DecodeErrorKind::TruncatedInput {
            needed: 5,
            remaining: 3,
        },
        &error,
    );
}

#[test]
fn every_wire_type_is_skipped() {
    // field 99 as varint, 64-bit, length-delimited and 32-bit, followed by a marker byte
    let cases: [(WireType, &[u8]); 4] = [
        (WireType::Varint, &hex!("ac02ff")),
        (WireType::SixtyFourBit, &hex!("0102030405060708ff")),
        (WireType::LengthDelimited, &hex!("03616263ff")),
        (WireType::ThirtyTwoBit, &hex!("01020304ff")),
    ];
    for (wire_type, payload) in cases {
        let mut buf = payload;
        skip_field(wire_type, 99, &mut buf, DecodeContext::default()).unwrap();
        assert_eq!(&[0xff][..], buf, "wrong remainder after skipping {wire_type}");
    }
}

#[test]
fn fixed_width_fields_cut_short_are_truncated() {
    let error = skip_field(
        WireType::SixtyFourBit,
        1,
        &mut &hex!("010203")[..],
        DecodeContext::default(),
    )
    .unwrap_err();
    assert_decode_kind(
        &DecodeErrorKind::TruncatedInput {
            needed: 8,
            remaining: 3,
        },
        &error,
    );
}

#[test]
fn nested_groups_are_skipped_up_to_their_end() {
    let mut input = Vec::new();
    // payload of field 5 (start group already consumed): a varint field, a nested
    // group 6 containing a string, then the end of group 5
    encode_key(1, WireType::Varint, &mut input);
    encode_varint(7, &mut input);
    encode_key(6, WireType::StartGroup, &mut input);
    super::string::encode(2, "hi", &mut input);
    encode_key(6, WireType::EndGroup, &mut input);
    encode_key(5, WireType::EndGroup, &mut input);
    input.push(0xff);

    let mut buf = &input[..];
    skip_field(WireType::StartGroup, 5, &mut buf, DecodeContext::default()).unwrap();
    assert_eq!(&[0xff][..], buf);
}

#[test]
fn mismatched_end_group_is_rejected() {
    let mut input = Vec::new();
    encode_key(6, WireType::EndGroup, &mut input);
    let error = skip_field(
        WireType::StartGroup,
        5,
        &mut &input[..],
        DecodeContext::default(),
    )
    .unwrap_err();
    assert_decode_kind(
        &DecodeErrorKind::UnexpectedEndGroup {
            field_number: 6,
        },
        &error,
    );
}

#[test]
fn lone_end_group_is_rejected() {
    let error = skip_field(
        WireType::EndGroup,
        5,
        &mut &[0u8; 0][..],
        DecodeContext::default(),
    )
    .unwrap_err();
    assert_decode_kind(
        &DecodeErrorKind::UnexpectedEndGroup {
            field_number: 5,
        },
        &error,
    );
}

#[test]
fn deeply_nested_groups_hit_the_recursion_limit() {
    let depth = RECURSION_LIMIT + 10;
    let mut input = Vec::new();
    for _ in 0..depth {
        encode_key(1, WireType::StartGroup, &mut input);
    }
    for _ in 0..=depth {
        encode_key(1, WireType::EndGroup, &mut input);
    }
    let error = skip_field(
        WireType::StartGroup,
        1,
        &mut &input[..],
        DecodeContext::default(),
    )
    .unwrap_err();
    assert_decode_kind(
        &DecodeErrorKind::RecursionLimitReached {
            limit: RECURSION_LIMIT,
        },
        &error,
    );
}

#[test]
fn bytes_merge_shares_the_input_buffer() {
    let input = Bytes::from_static(&hex!("03616263ff"));
    let mut buf = input.clone();
    let mut value = Bytes::new();
    super::bytes::merge(WireType::LengthDelimited, &mut value, &mut buf).unwrap();
    assert_eq!(&b"abc"[..], value);
    assert_eq!(input[1..4].as_ptr(), value.as_ptr());
    assert_eq!(1, buf.remaining());
}

#[test]
fn string_merge_rejects_invalid_utf8() {
    let mut value = String::new();
    let error = super::string::merge(
        WireType::LengthDelimited,
        &mut value,
        &mut &hex!("02c328")[..],
    )
    .unwrap_err();
    assert!(
        matches!(error.kind(), DecodeErrorKind::InvalidUtf8 { .. }),
        "unexpected decode error: {error}",
    );
    assert!(value.is_empty());
}

#[test]
fn uint32_merge_keeps_low_bits_of_wider_values() {
    let input = varint_bytes(1 << 32 | 7);
    let mut value = 0;
    super::uint32::merge(WireType::Varint, &mut value, &mut &input[..]).unwrap();
    assert_eq!(7, value);
}

#[test]
fn scalar_fields_reject_foreign_wire_types() {
    let mut account = 0;
    let error =
        super::uint32::merge(WireType::LengthDelimited, &mut account, &mut &hex!("0107")[..])
            .unwrap_err();
    assert_decode_kind(
        &DecodeErrorKind::WireTypeMismatch {
            expected: WireType::Varint,
            actual: WireType::LengthDelimited,
        },
        &error,
    );

    let mut inner = Bytes::new();
    let error = super::bytes::merge(WireType::Varint, &mut inner, &mut &hex!("07")[..])
        .unwrap_err();
    assert_decode_kind(
        &DecodeErrorKind::WireTypeMismatch {
            expected: WireType::LengthDelimited,
            actual: WireType::Varint,
        },
        &error,
    );
}

#[test]
fn length_delimited_encoded_len_counts_key_prefix_and_payload() {
    assert_eq!(2, super::bytes::encoded_len(1, &[]));
    assert_eq!(82, super::bytes::encoded_len(1, &[0; 80]));
    assert_eq!(3 + 200, super::bytes::encoded_len(1, &[0; 200]));
    assert_eq!(2, super::uint32::encoded_len(2, 7));
    assert_eq!(6, super::uint32::encoded_len(2, u32::MAX));
}
