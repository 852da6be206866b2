//! Wire-level records of the protobuf schemas, one module per package.
//!
//! Each record mirrors its protobuf message field by field and implements
//! [`penumbra_keys_wire::Message`] by hand. Records perform no validation
//! beyond the invariants the schema states; see the domain types in the crate
//! root for that.

use penumbra_keys_wire::DecodeError;

#[path = ""]
pub mod keys {
    #[path = "penumbra.core.keys.v1alpha1.rs"]
    pub mod v1alpha1;
}

/// Returns a closure recording that an error occurred in `field` of `message`.
fn in_field(
    message: &'static str,
    field: &'static str,
) -> impl FnOnce(DecodeError) -> DecodeError {
    move |mut error| {
        error.push(message, field);
        error
    }
}

#[cfg(feature = "benchmark")]
mod benchmarks;
