use bytes::Bytes;
use hex_literal::hex;
use insta::assert_snapshot;

use super::{
    Address,
    AddressIndex,
    AddressView,
};
use crate::{
    keys::WalletId,
    raw::keys::v1alpha1 as raw,
    DecodeError,
    Protobuf as _,
};

const TEST_ADDRESS: &str = "penumbrav2t13vh0fkf3qkqjacpm59g23ufea9n5us45e4p5h6hty8vg73r2t8g5l3kynad87u0n9eragf3hhkgkhqe5vhngq2cw493k48c9qg9ms4epllcmndd6ly4v4dw2jcnxaxzjqnlvnw";
const TEST_COMPAT_ADDRESS: &str = "penumbracompat113vh0fkf3qkqjacpm59g23ufea9n5us45e4p5h6hty8vg73r2t8g5l3kynad87u0n9eragf3hhkgkhqe5vhngq2cw493k48c9qg9ms4epllcmndd6ly4v4dw2jcnxaxzjzymzc7";
const TEST_ADDRESS_BYTES: [u8; 80] = hex!(
    "8b2ef4d93105812ee03ba150a8f139e9674e42b4cd434beaeb21d88f446a59d1"
    "4fc6c49f5a7f71f32e47d42637bd916b833465e6802b0ea9636a9f05020bb857"
    "21fff1b9b5baf92acab5ca96266e9852"
);

fn test_address() -> Address {
    Address::from_array(TEST_ADDRESS_BYTES)
}

fn raw_address(inner: &[u8], alt_bech32m: &str) -> raw::Address {
    raw::Address {
        inner: Bytes::copy_from_slice(inner),
        alt_bech32m: alt_bech32m.to_string(),
    }
}

#[test]
fn bech32m_text_round_trips() {
    let address: Address = TEST_ADDRESS.parse().unwrap();
    assert_eq!(test_address(), address);
    assert_eq!(TEST_ADDRESS, address.to_string());
    assert_eq!(TEST_ADDRESS, format!("{address:?}"));
}

#[test]
fn compat_text_parses_to_same_address() {
    assert_eq!(TEST_COMPAT_ADDRESS, test_address().compat_encoding());
    let address: Address = TEST_COMPAT_ADDRESS.parse().unwrap();
    assert_eq!(test_address(), address);
}

#[test]
fn short_form_keeps_24_data_characters() {
    assert_snapshot!(
        test_address().display_short_form(),
        @"penumbrav2t13vh0fkf3qkqjacpm59g23ufe…"
    );
}

#[test]
fn other_prefixes_are_rejected() {
    let other = "penumbrav3t13vh0fkf3qkqjacpm59g23ufea9n5us45e4p5h6hty8vg73r2t8g5l3kynad87u0n9eragf3hhkgkhqe5vhngq2cw493k48c9qg9ms4epllcmndd6ly4v4dw2jcnxaxzj3v4j3d";
    let error = other.parse::<Address>().unwrap_err();
    assert_snapshot!(
        error.to_string(),
        @"expected address with human readable prefix `penumbrav2t`, got `penumbrav3t`"
    );
}

#[test]
fn compat_text_with_other_prefix_is_rejected() {
    let other = "penumbracompat1x13vh0fkf3qkqjacpm59g23ufea9n5us45e4p5h6hty8vg73r2t8g5l3kynad87u0n9eragf3hhkgkhqe5vhngq2cw493k48c9qg9ms4epllcmndd6ly4v4dw2jcnxaxzjk5nhxn";
    let error = other.parse::<Address>().unwrap_err();
    assert_snapshot!(
        error.to_string(),
        @"expected address with human readable prefix `penumbracompat1`, got `penumbracompat1x`"
    );
}

#[test]
fn addresses_order_by_their_bytes() {
    let low = Address::from_array([0; 80]);
    let high = Address::from_array([1; 80]);
    assert!(low < high);
}

#[test]
fn raw_address_with_inner_bytes_is_accepted() {
    let address = Address::try_from_raw(raw_address(&TEST_ADDRESS_BYTES, "")).unwrap();
    assert_eq!(test_address(), address);
}

#[test]
fn raw_address_with_alt_bech32m_is_accepted() {
    let address = Address::try_from_raw(raw_address(&[], TEST_ADDRESS)).unwrap();
    assert_eq!(test_address(), address);

    let address = Address::try_from_raw(raw_address(&[], TEST_COMPAT_ADDRESS)).unwrap();
    assert_eq!(test_address(), address);
}

#[test]
fn raw_address_of_wrong_length_is_rejected() {
    let error = Address::try_from_raw(raw_address(&[1; 79], "")).unwrap_err();
    assert_snapshot!(error.to_string(), @"expected an address of 80 bytes, got `79`");
}

#[test]
fn raw_address_with_both_fields_is_rejected() {
    let error =
        Address::try_from_raw(raw_address(&TEST_ADDRESS_BYTES, TEST_ADDRESS)).unwrap_err();
    assert_snapshot!(
        error.to_string(),
        @"address protobuf must not set both its `inner` and `alt_bech32m` fields"
    );
}

#[test]
fn empty_raw_address_is_rejected() {
    let error = Address::try_from_raw(raw::Address::default()).unwrap_err();
    assert_snapshot!(
        error.to_string(),
        @"address protobuf set neither its `inner` nor its `alt_bech32m` field"
    );
}

#[test]
fn address_is_emitted_as_inner_bytes() {
    let raw = test_address().into_raw();
    assert_eq!(&TEST_ADDRESS_BYTES[..], &raw.inner[..]);
    assert!(raw.alt_bech32m.is_empty());

    let bytes = test_address().encode_to_vec();
    assert_eq!(hex!("0a50")[..], bytes[..2]);
    assert_eq!(TEST_ADDRESS_BYTES[..], bytes[2..]);
}

#[test]
fn decoding_both_set_address_fails_on_the_wire() {
    let mut bytes = Vec::new();
    penumbra_keys_wire::encoding::bytes::encode(1, &TEST_ADDRESS_BYTES, &mut bytes);
    penumbra_keys_wire::encoding::string::encode(2, TEST_ADDRESS, &mut bytes);
    let error = Address::decode(&bytes[..]).unwrap_err();
    assert!(matches!(error, DecodeError::Wire(_)), "got {error:?}");
}

#[test]
fn decoding_short_address_fails_validation() {
    let error = Address::decode(&hex!("0a03010203")[..]).unwrap_err();
    assert!(matches!(error, DecodeError::Invalid(_)), "got {error:?}");
}

#[test]
fn address_index_without_randomizer_is_not_ephemeral() {
    let index = AddressIndex::try_from_raw(raw::AddressIndex {
        account: 7,
        randomizer: Bytes::new(),
    })
    .unwrap();
    assert_eq!(AddressIndex::new(7), index);
    assert!(!index.is_ephemeral());
    assert_eq!(vec![0x10, 0x07], index.encode_to_vec());
}

#[test]
fn address_index_with_randomizer_round_trips() {
    let index = AddressIndex {
        account: 1,
        randomizer: [0xaa; 12],
    };
    assert!(index.is_ephemeral());
    let raw = index.to_raw();
    assert_eq!(&[0xaa; 12][..], &raw.randomizer[..]);
    assert_eq!(index, AddressIndex::decode(&index.encode_to_vec()[..]).unwrap());
}

#[test]
fn address_index_with_short_randomizer_is_rejected() {
    let error = AddressIndex::try_from_raw(raw::AddressIndex {
        account: 0,
        randomizer: Bytes::from_static(&[1; 5]),
    })
    .unwrap_err();
    assert_snapshot!(error.to_string(), @"expected a randomizer of 0 or 12 bytes, got `5`");
}

#[test]
fn address_view_round_trips() {
    let decoded = AddressView::Decoded {
        address: test_address(),
        index: AddressIndex::new(3),
        wallet_id: WalletId::from_array([4; 32]),
    };
    let opaque = AddressView::Opaque {
        address: test_address(),
    };
    for view in [decoded, opaque] {
        assert_eq!(test_address(), view.address());
        let bytes = view.encode_to_vec();
        assert_eq!(view, AddressView::decode(&bytes[..]).unwrap());
    }
}

#[test]
fn unset_address_view_is_rejected() {
    let error = AddressView::try_from_raw(raw::AddressView::default()).unwrap_err();
    assert_snapshot!(
        error.to_string(),
        @"neither the `decoded` nor the `opaque` variant was set"
    );
}

#[test]
fn decoded_view_requires_wallet_id() {
    let raw = raw::AddressView {
        address_view: Some(raw::address_view::AddressView::Decoded(
            raw::address_view::Decoded {
                address: Some(test_address().into_raw()),
                index: Some(AddressIndex::new(0).into_raw()),
                wallet_id: None,
            },
        )),
    };
    let error = AddressView::try_from_raw(raw).unwrap_err();
    assert_snapshot!(error.to_string(), @"the `decoded.wallet_id` field was not set");
}

#[test]
fn opaque_view_with_invalid_address_is_rejected() {
    let raw = raw::AddressView {
        address_view: Some(raw::address_view::AddressView::Opaque(
            raw::address_view::Opaque {
                address: Some(raw_address(&[0; 12], "")),
            },
        )),
    };
    let error = AddressView::try_from_raw(raw).unwrap_err();
    assert_snapshot!(error.to_string(), @"the `address` field was invalid");
}

#[cfg(feature = "test-utils")]
#[test]
fn dummy_addresses_differ() {
    let mut rng = rand::rngs::OsRng;
    assert_ne!(Address::dummy(&mut rng), Address::dummy(&mut rng));
}

#[cfg(feature = "serde")]
mod json {
    use insta::assert_json_snapshot;

    use super::{
        test_address,
        TEST_ADDRESS_BYTES,
    };
    use crate::{
        raw::keys::v1alpha1 as raw,
        Address,
        AddressIndex,
        AddressView,
        WalletId,
    };

    #[test]
    fn raw_address_index_uses_proto3_names() {
        let raw = raw::AddressIndex {
            account: 7,
            randomizer: vec![1; 12].into(),
        };
        assert_json_snapshot!(raw, @r###"
        {
          "account": 7,
          "randomizer": "AQEBAQEBAQEBAQEB"
        }
        "###);
    }

    #[test]
    fn raw_defaults_are_omitted() {
        assert_json_snapshot!(raw::AddressIndex::default(), @"{}");
        assert_json_snapshot!(raw::Address::default(), @"{}");
    }

    #[test]
    fn raw_address_view_is_keyed_by_variant() {
        let raw = raw::AddressView {
            address_view: Some(raw::address_view::AddressView::Decoded(
                raw::address_view::Decoded {
                    address: Some(raw::Address {
                        inner: vec![0xff; 3].into(),
                        alt_bech32m: String::new(),
                    }),
                    index: None,
                    wallet_id: Some(raw::WalletId {
                        inner: vec![0; 3].into(),
                    }),
                },
            )),
        };
        assert_json_snapshot!(raw, @r###"
        {
          "decoded": {
            "address": {
              "inner": "////"
            },
            "walletId": {
              "inner": "AAAA"
            }
          }
        }
        "###);
        let json = serde_json::to_string(&raw).unwrap();
        assert_eq!(raw, serde_json::from_str(&json).unwrap());
    }

    #[test]
    fn raw_address_accepts_alt_bech32m_json() {
        let raw: raw::Address =
            serde_json::from_str(r#"{"altBech32m": "penumbrav2t1qqqq"}"#).unwrap();
        assert!(raw.inner.is_empty());
        assert_eq!("penumbrav2t1qqqq", raw.alt_bech32m);
    }

    #[test]
    fn domain_types_serialize_through_their_raw_records() {
        use base64::Engine as _;

        let json = serde_json::to_value(test_address()).unwrap();
        assert_eq!(
            serde_json::json!({
                "inner": base64::engine::general_purpose::STANDARD.encode(TEST_ADDRESS_BYTES),
            }),
            json,
        );
        assert_eq!(test_address(), serde_json::from_value::<Address>(json).unwrap());

        let view = AddressView::Decoded {
            address: test_address(),
            index: AddressIndex::new(2),
            wallet_id: WalletId::from_array([9; 32]),
        };
        let json = serde_json::to_string(&view).unwrap();
        assert_eq!(view, serde_json::from_str::<AddressView>(&json).unwrap());
    }

    #[test]
    fn invalid_domain_json_is_rejected() {
        assert!(serde_json::from_str::<Address>(r#"{"inner": "AAAA"}"#).is_err());
        assert!(serde_json::from_str::<WalletId>(r#"{"inner": "AAAA"}"#).is_err());
    }
}
