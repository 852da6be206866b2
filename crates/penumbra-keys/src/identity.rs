//! Keys identifying validators and their governance authority.

use crate::{
    bech32str::{
        GOVERNANCE_KEY_PREFIX,
        IDENTITY_KEY_PREFIX,
    },
    keys::fixed_key,
};

pub const IDENTITY_KEY_LEN_BYTES: usize = 32;
pub const GOVERNANCE_KEY_LEN_BYTES: usize = 32;
pub const CONSENSUS_KEY_LEN_BYTES: usize = 32;

fixed_key! {
    /// A validator's identity key (decaf377-rdsa spendauth verification key).
    IdentityKey([u8; IDENTITY_KEY_LEN_BYTES]) => IdentityKey.ik,
    text = bech32m(IDENTITY_KEY_PREFIX),
}

fixed_key! {
    /// A validator's governance key (decaf377-rdsa spendauth verification key).
    GovernanceKey([u8; GOVERNANCE_KEY_LEN_BYTES]) => GovernanceKey.gk,
    text = bech32m(GOVERNANCE_KEY_PREFIX),
}

fixed_key! {
    /// A validator's consensus key, as used by the consensus engine.
    ConsensusKey([u8; CONSENSUS_KEY_LEN_BYTES]) => ConsensusKey.inner,
    text = hex,
}
