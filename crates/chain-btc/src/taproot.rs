//! BIP-86 key-path Taproot addresses.
//!
//! The internal key is the x-only form of the derived key; the output key is
//! its BIP-341 tweak with no script tree. The address is the bech32m encoding
//! of the output key as a version 1 witness program.

use bech32::segwit;
use bitcoin::secp256k1::{PublicKey, Secp256k1};
use bitcoin::taproot::TapTweakHash;

use crate::address::{encode_segwit, parse_compressed};
use crate::error::BtcError;
use crate::network::NetworkParams;

/// Compute the tweaked x-only output key for a compressed internal key.
pub fn tweaked_output_key(pubkey_bytes: &[u8; 33]) -> Result<[u8; 32], BtcError> {
    parse_compressed(pubkey_bytes)?;
    let public_key = PublicKey::from_slice(pubkey_bytes)
        .map_err(|e| BtcError::InvalidPublicKey(e.to_string()))?;
    let (internal_key, _parity) = public_key.x_only_public_key();

    // Same tweak as `TapTweak::tap_tweak(None)`, without its panic path.
    let secp = Secp256k1::verification_only();
    let tweak = TapTweakHash::from_key_and_tweak(internal_key, None).to_scalar();
    let (output_key, _parity) = internal_key
        .add_tweak(&secp, &tweak)
        .map_err(|_| BtcError::TweakOutOfRange)?;

    Ok(output_key.serialize())
}

/// Derive a P2TR (Taproot bech32m) address from a compressed public key.
pub fn pubkey_to_p2tr_address(
    pubkey_bytes: &[u8; 33],
    network: &NetworkParams,
) -> Result<String, BtcError> {
    let output_key = tweaked_output_key(pubkey_bytes)?;
    encode_segwit(network, segwit::VERSION_1, &output_key)
}
