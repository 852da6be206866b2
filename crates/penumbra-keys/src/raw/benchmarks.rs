//! To run the benchmark, from the root of the workspace, run:
//! ```sh
//! cargo bench --features=benchmark -qp penumbra-keys
//! ```
use bytes::Bytes;
use penumbra_keys_wire::Message;

use super::keys::v1alpha1::{
    address_view,
    Address,
    AddressIndex,
    AddressView,
    WalletId,
};

fn decoded_view() -> AddressView {
    AddressView {
        address_view: Some(address_view::AddressView::Decoded(address_view::Decoded {
            address: Some(Address {
                inner: Bytes::from_static(&[0x5a; 80]),
                alt_bech32m: String::new(),
            }),
            index: Some(AddressIndex {
                account: 1_000,
                randomizer: Bytes::from_static(&[0x11; 12]),
            }),
            wallet_id: Some(WalletId {
                inner: Bytes::from_static(&[0x22; 32]),
            }),
        })),
    }
}

/// Benchmarks encoding a fully populated `AddressView` into a fresh vector.
#[divan::bench]
fn encode_address_view(bencher: divan::Bencher) {
    let view = decoded_view();
    bencher.bench(|| divan::black_box(&view).encode_to_vec().unwrap());
}

/// Benchmarks decoding a fully populated `AddressView` from a contiguous `Bytes`, which shares
/// its buffer with the decoded byte fields.
#[divan::bench]
fn decode_address_view_from_bytes(bencher: divan::Bencher) {
    let encoded = Bytes::from(decoded_view().encode_to_vec().unwrap());
    bencher
        .with_inputs(|| encoded.clone())
        .bench_values(|buf| AddressView::decode(buf).unwrap());
}

/// Benchmarks decoding a fully populated `AddressView` from a borrowed slice, which copies the
/// decoded byte fields.
#[divan::bench]
fn decode_address_view_from_slice(bencher: divan::Bencher) {
    let encoded = decoded_view().encode_to_vec().unwrap();
    bencher.bench(|| AddressView::decode(divan::black_box(&encoded[..])).unwrap());
}
