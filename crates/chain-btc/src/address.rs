use bech32::{segwit, Fe32, Hrp};
use crypto_utils::base58::encode_versioned_hash;
use crypto_utils::hash::hash160;
use k256::PublicKey;

use crate::error::BtcError;
use crate::network::NetworkParams;

/// Check that `pubkey_bytes` is a compressed secp256k1 point on the curve.
pub(crate) fn parse_compressed(pubkey_bytes: &[u8; 33]) -> Result<PublicKey, BtcError> {
    if pubkey_bytes[0] != 0x02 && pubkey_bytes[0] != 0x03 {
        return Err(BtcError::InvalidPublicKey(format!(
            "expected compressed key prefix 0x02/0x03, got 0x{:02x}",
            pubkey_bytes[0]
        )));
    }
    PublicKey::from_sec1_bytes(pubkey_bytes).map_err(|e| {
        BtcError::InvalidPublicKey(format!("failed to parse compressed public key: {e}"))
    })
}

/// Encode a SegWit witness program under the network's bech32 hrp.
pub(crate) fn encode_segwit(
    network: &NetworkParams,
    version: Fe32,
    program: &[u8],
) -> Result<String, BtcError> {
    let hrp = Hrp::parse(network.require_hrp()?)
        .map_err(|e| BtcError::EncodingError(format!("invalid hrp: {e}")))?;
    segwit::encode(hrp, version, program).map_err(|e| BtcError::EncodingError(e.to_string()))
}

/// Derive a P2PKH (legacy) address from a compressed public key.
///
/// `base58check(pub_key_hash || hash160(pubkey))`: `1...` on Bitcoin,
/// `L...` on Litecoin, `D...` on Dogecoin.
pub fn pubkey_to_p2pkh_address(
    pubkey_bytes: &[u8; 33],
    network: &NetworkParams,
) -> Result<String, BtcError> {
    parse_compressed(pubkey_bytes)?;
    Ok(encode_versioned_hash(
        network.pub_key_hash,
        &hash160(pubkey_bytes),
    ))
}

/// Derive a P2SH-P2WPKH (wrapped SegWit) address from a compressed public key.
///
/// The redeem script is `OP_0 PUSH20 hash160(pubkey)`; the address commits to
/// its hash160 under the network's script-hash version byte.
pub fn pubkey_to_p2sh_p2wpkh_address(
    pubkey_bytes: &[u8; 33],
    network: &NetworkParams,
) -> Result<String, BtcError> {
    parse_compressed(pubkey_bytes)?;
    let mut redeem_script = [0u8; 22];
    redeem_script[0] = 0x00;
    redeem_script[1] = 0x14;
    redeem_script[2..].copy_from_slice(&hash160(pubkey_bytes));
    Ok(encode_versioned_hash(
        network.script_hash,
        &hash160(&redeem_script),
    ))
}

/// Derive a P2WPKH (native SegWit bech32) address from a compressed public key.
///
/// Takes a 33-byte compressed secp256k1 public key and returns a bech32 address
/// string: `bc1q...` for Bitcoin mainnet, `tb1q...` for testnet, `ltc1q...`
/// for Litecoin. Fails for networks without a bech32 hrp.
pub fn pubkey_to_p2wpkh_address(
    pubkey_bytes: &[u8; 33],
    network: &NetworkParams,
) -> Result<String, BtcError> {
    parse_compressed(pubkey_bytes)?;
    encode_segwit(network, segwit::VERSION_0, &hash160(pubkey_bytes))
}
