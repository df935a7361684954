use crate::codec::{read_point, write_point, Readable, Writable};
use crate::commitment::COMMITMENT_BITS;
use crate::curves::{DleqCurve, Ed25519, Secp256k1};
use crate::error::{DleqError, ReadError};
use curve25519_dalek::edwards::EdwardsPoint;
use k256::ProjectivePoint;
use log::*;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::io::{self, Read, Write};
use subtle::Choice;
use zeroize::Zeroizing;

pub const ED25519_PRIVATE_KEY_SIZE: usize = 32;
pub const ED25519_PUBLIC_KEY_SIZE: usize = 32;
pub const SECP256K1_PRIVATE_KEY_SIZE: usize = 32;
pub const SECP256K1_PUBLIC_KEY_SIZE: usize = 33;
pub const PUBLIC_KEY_PAIR_SIZE: usize = ED25519_PUBLIC_KEY_SIZE + SECP256K1_PUBLIC_KEY_SIZE;

/// Bits 252..256 of the little-endian encoding, which must be clear.
const HIGH_NIBBLE_MASK: u8 = 0xf0;

/// A secret scalar that is a valid private key on both Ed25519 and secp256k1.
///
/// The value lies in `[1, 2^252)`, below both group orders, so it denotes the same integer on both curves. It is
/// stored as 32 little-endian bytes and zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(Zeroizing<[u8; 32]>);

impl PrivateKey {
    /// Samples a uniformly random key from `[1, 2^252)`.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, DleqError> {
        let mut bytes = Zeroizing::new([0u8; 32]);
        loop {
            rng.try_fill_bytes(bytes.as_mut_slice()).map_err(|_| DleqError::RandomnessFailure)?;
            bytes[31] &= !HIGH_NIBBLE_MASK;
            if bytes.iter().any(|b| *b != 0) {
                return Ok(Self(bytes));
            }
        }
    }

    /// Reads a key from its 32-byte little-endian encoding (the Ed25519 scalar encoding).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DleqError> {
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| DleqError::InvalidPrivateKey)?;
        let key = Self(Zeroizing::new(bytes));
        key.validate()?;
        Ok(key)
    }

    /// Wraps bytes without the range check.
    #[cfg(test)]
    pub(crate) fn from_raw(bytes: [u8; 32]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn from_hex(hex: &str) -> Result<Self, DleqError> {
        if hex.len() != 2 * ED25519_PRIVATE_KEY_SIZE {
            return Err(DleqError::InvalidPrivateKey);
        }
        let mut bytes = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(hex.as_bytes(), bytes.as_mut_slice())?;
        Self::from_bytes(bytes.as_slice())
    }

    pub fn as_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0.as_slice()))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Checks the `[1, 2^252)` range. Keys built by this module are always valid; the check guards the proving entry
    /// point.
    pub fn validate(&self) -> Result<(), DleqError> {
        let non_zero = self.0.iter().any(|b| *b != 0);
        let in_range = self.0[31] & HIGH_NIBBLE_MASK == 0;
        if non_zero && in_range {
            Ok(())
        } else {
            Err(DleqError::InvalidPrivateKey)
        }
    }

    /// The key as a scalar of curve `C`. No reduction takes place since the key is below both orders.
    pub fn to_scalar<C: DleqCurve>(&self) -> Zeroizing<C::Scalar> {
        Zeroizing::new(C::reduce(&self.0))
    }

    /// The key in Ed25519's scalar encoding (32 bytes, little-endian).
    pub fn to_ed25519_bytes(&self) -> Zeroizing<[u8; ED25519_PRIVATE_KEY_SIZE]> {
        Zeroizing::new(Ed25519::encode_scalar(&self.to_scalar::<Ed25519>()))
    }

    /// The key in secp256k1's scalar encoding (32 bytes, big-endian).
    pub fn to_secp256k1_bytes(&self) -> Zeroizing<[u8; SECP256K1_PRIVATE_KEY_SIZE]> {
        Zeroizing::new(Secp256k1::encode_scalar(&self.to_scalar::<Secp256k1>()))
    }

    /// Bit `index` of the little-endian binary representation.
    pub(crate) fn bit(&self, index: usize) -> Choice {
        debug_assert!(index < COMMITMENT_BITS);
        Choice::from((self.0[index / 8] >> (index % 8)) & 1)
    }
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey")
    }
}

/// The public keys `s·G` on Ed25519 and on secp256k1 for a single secret `s`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "PublicKeyPairHex", try_from = "PublicKeyPairHex")]
pub struct PublicKeyPair {
    ed25519: EdwardsPoint,
    secp256k1: ProjectivePoint,
}

impl PublicKeyPair {
    pub fn from_private_key(key: &PrivateKey) -> Self {
        let ed25519 = EdwardsPoint::mul_base(&key.to_scalar::<Ed25519>());
        let secp256k1 = Secp256k1::generator() * *key.to_scalar::<Secp256k1>();
        Self { ed25519, secp256k1 }
    }

    pub(crate) fn from_points(ed25519: EdwardsPoint, secp256k1: ProjectivePoint) -> Self {
        Self { ed25519, secp256k1 }
    }

    pub fn ed25519(&self) -> &EdwardsPoint {
        &self.ed25519
    }

    pub fn secp256k1(&self) -> &ProjectivePoint {
        &self.secp256k1
    }

    /// The compressed Edwards Y encoding of the Ed25519 key.
    pub fn ed25519_bytes(&self) -> [u8; ED25519_PUBLIC_KEY_SIZE] {
        self.ed25519.compress().to_bytes()
    }

    /// The SEC1 compressed encoding of the secp256k1 key.
    pub fn secp256k1_bytes(&self) -> [u8; SECP256K1_PUBLIC_KEY_SIZE] {
        let mut bytes = [0u8; SECP256K1_PUBLIC_KEY_SIZE];
        bytes.copy_from_slice(&Secp256k1::encode_point(&self.secp256k1));
        bytes
    }

    /// Both keys back to back: 32 bytes of Ed25519 key, then 33 bytes of secp256k1 key.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_PAIR_SIZE] {
        let mut bytes = [0u8; PUBLIC_KEY_PAIR_SIZE];
        bytes[..ED25519_PUBLIC_KEY_SIZE].copy_from_slice(&self.ed25519_bytes());
        bytes[ED25519_PUBLIC_KEY_SIZE..].copy_from_slice(&self.secp256k1_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DleqError> {
        Ok(Self::from_slice(bytes)?)
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(hex: &str) -> Result<Self, DleqError> {
        let bytes = hex::decode(hex)?;
        Self::from_bytes(&bytes)
    }
}

impl Readable for PublicKeyPair {
    fn read<R: Read>(reader: &mut R) -> Result<Self, ReadError> {
        let ed25519 = read_point::<Ed25519, R>(reader, "PublicKeyPair.ed25519")?;
        let secp256k1 = read_point::<Secp256k1, R>(reader, "PublicKeyPair.secp256k1")?;
        Ok(Self { ed25519, secp256k1 })
    }
}

impl Writable for PublicKeyPair {
    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_point::<Ed25519, W>(writer, &self.ed25519)?;
        write_point::<Secp256k1, W>(writer, &self.secp256k1)
    }
}

impl Display for PublicKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ed25519: {}, secp256k1: {}",
            hex::encode(self.ed25519_bytes()),
            hex::encode(self.secp256k1_bytes())
        )
    }
}

#[derive(Serialize, Deserialize)]
struct PublicKeyPairHex {
    ed25519: String,
    secp256k1: String,
}

impl From<PublicKeyPair> for PublicKeyPairHex {
    fn from(keys: PublicKeyPair) -> Self {
        Self { ed25519: hex::encode(keys.ed25519_bytes()), secp256k1: hex::encode(keys.secp256k1_bytes()) }
    }
}

impl TryFrom<PublicKeyPairHex> for PublicKeyPair {
    type Error = DleqError;

    fn try_from(value: PublicKeyPairHex) -> Result<Self, Self::Error> {
        let mut bytes = hex::decode(value.ed25519)?;
        bytes.extend(hex::decode(value.secp256k1)?);
        Self::from_bytes(&bytes)
    }
}

/// Generates a fresh private key and its public keys on both curves.
pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<(PrivateKey, PublicKeyPair), DleqError> {
    let key = PrivateKey::random(rng)?;
    let public_keys = PublicKeyPair::from_private_key(&key);
    debug!("Generated DLEq key pair. {public_keys}");
    Ok((key, public_keys))
}
