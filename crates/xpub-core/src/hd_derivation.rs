use crypto_utils::hash::hmac_sha512;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, ProjectivePoint, PublicKey, Scalar};

use crate::error::XpubError;
use crate::extended_key::ExtendedPublicKey;

/// First hardened child index. Public derivation stops below it.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Non-hardened public child derivation (BIP-32 CKDpub).
///
/// - I = HMAC-SHA512(key = parent chain code, data = serP(parent) || ser32(index))
/// - child key = I[0..32]·G + parent
/// - child chain code = I[32..64]
pub fn derive_child(
    parent_pubkey: &[u8; 33],
    parent_chain_code: &[u8; 32],
    index: u32,
) -> Result<([u8; 33], [u8; 32]), XpubError> {
    if index >= HARDENED_OFFSET {
        return Err(XpubError::DerivationFailed(format!(
            "index {index} requires hardened derivation"
        )));
    }

    let i = hmac_sha512(parent_chain_code, &[parent_pubkey, &index.to_be_bytes()])?;
    let (il, ir) = i.split_at(32);

    let tweak: Option<Scalar> = Scalar::from_repr(FieldBytes::clone_from_slice(il)).into();
    let tweak = tweak.ok_or_else(|| {
        XpubError::DerivationFailed(format!("IL is not below the curve order at index {index}"))
    })?;

    let parent = PublicKey::from_sec1_bytes(parent_pubkey)
        .map_err(|e| XpubError::DerivationFailed(format!("invalid parent key: {e}")))?;

    let child = ProjectivePoint::GENERATOR * tweak + parent.to_projective();
    let child = PublicKey::from_affine(child.to_affine()).map_err(|_| {
        XpubError::DerivationFailed(format!("child at index {index} is the point at infinity"))
    })?;

    let mut public_key = [0u8; 33];
    public_key.copy_from_slice(child.to_encoded_point(true).as_bytes());
    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(ir);

    Ok((public_key, chain_code))
}

/// Key at `m/account`, cached so each index costs one derivation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchKey {
    pub account: u32,
    pub public_key: [u8; 33],
    pub chain_code: [u8; 32],
}

impl BranchKey {
    pub fn derive(xpub: &ExtendedPublicKey, account: u32) -> Result<Self, XpubError> {
        let (public_key, chain_code) = derive_child(&xpub.public_key, &xpub.chain_code, account)?;
        Ok(Self {
            account,
            public_key,
            chain_code,
        })
    }

    /// The extended key itself, for families that take a single step from it.
    pub fn root(xpub: &ExtendedPublicKey) -> Self {
        Self {
            account: 0,
            public_key: xpub.public_key,
            chain_code: xpub.chain_code,
        }
    }

    pub fn child(&self, index: u32) -> Result<DerivedKey, XpubError> {
        let (public_key, chain_code) = derive_child(&self.public_key, &self.chain_code, index)?;
        Ok(DerivedKey {
            public_key,
            chain_code,
            account: self.account,
            index,
        })
    }
}

/// Key at `m/account/index`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedKey {
    pub public_key: [u8; 33],
    pub chain_code: [u8; 32],
    pub account: u32,
    pub index: u32,
}

impl DerivedKey {
    pub fn derivation_path(&self) -> String {
        format!("m/{}/{}", self.account, self.index)
    }
}

/// Derive `m/account/index` from an extended public key.
pub fn derive_at(
    xpub: &ExtendedPublicKey,
    account: u32,
    index: u32,
) -> Result<DerivedKey, XpubError> {
    BranchKey::derive(xpub, account)?.child(index)
}
