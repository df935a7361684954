//! Pedersen commitments to the individual bits of the secret, on both curves at once.
//!
//! For bit `b_i` the prover publishes `C_ed,i = b_i·G_ed + r_ed,i·H_ed` and `C_secp,i = b_i·G_secp + r_secp,i·H_secp`
//! with independent blinders. The bit itself only ever lives in a [`Choice`], and `G` versus the identity is picked
//! with a constant-time select.

use crate::codec::{read_point, write_point, Readable, Writable};
use crate::curves::{select_generator, DleqCurve, Ed25519, Secp256k1};
use crate::error::{DleqError, ReadError};
use crate::keys::PrivateKey;
use curve25519_dalek::edwards::EdwardsPoint;
use k256::ProjectivePoint;
use log::*;
use rand_core::{CryptoRng, RngCore};
use std::io::{self, Read, Write};
use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Number of committed bits. Every integer below `2^252` is smaller than both group orders.
pub const COMMITMENT_BITS: usize = 252;

/// The opening of a commitment to one bit on curve `C`.
pub struct BitOpening<C: DleqCurve> {
    bit: u8,
    blinder: C::Scalar,
}

impl<C: DleqCurve> BitOpening<C> {
    pub fn new(bit: Choice, blinder: C::Scalar) -> Self {
        Self { bit: bit.unwrap_u8(), blinder }
    }

    pub fn bit(&self) -> Choice {
        Choice::from(self.bit)
    }

    pub fn blinder(&self) -> &C::Scalar {
        &self.blinder
    }

    /// `b·G + r·H`
    pub fn commit(&self) -> C::Point {
        select_generator::<C>(self.bit()) + C::blinding_generator() * self.blinder
    }

    /// Whether `commitment - r·H` is exactly `b·G`, i.e. this opening decodes back to its own bit.
    pub fn opens(&self, commitment: &C::Point) -> Choice {
        let unblinded = *commitment - C::blinding_generator() * self.blinder;
        unblinded.ct_eq(&select_generator::<C>(self.bit()))
    }
}

impl<C: DleqCurve> Drop for BitOpening<C> {
    fn drop(&mut self) {
        self.bit.zeroize();
        self.blinder.zeroize();
    }
}

/// The openings of the commitments to the same bit on both curves.
pub struct BitOpeningPair {
    pub ed25519: BitOpening<Ed25519>,
    pub secp256k1: BitOpening<Secp256k1>,
}

impl BitOpeningPair {
    fn sample<R: RngCore + CryptoRng>(bit: Choice, rng: &mut R) -> Result<Self, DleqError> {
        let ed25519 = BitOpening::new(bit, Ed25519::random_scalar(rng)?);
        let secp256k1 = BitOpening::new(bit, Secp256k1::random_scalar(rng)?);
        Ok(Self { ed25519, secp256k1 })
    }

    pub fn bit(&self) -> Choice {
        self.ed25519.bit()
    }

    pub fn commit(&self) -> CommitmentPair {
        CommitmentPair { ed25519: self.ed25519.commit(), secp256k1: self.secp256k1.commit() }
    }

    pub fn opens(&self, commitment: &CommitmentPair) -> Choice {
        self.ed25519.opens(&commitment.ed25519)
            & self.secp256k1.opens(&commitment.secp256k1)
            & self.ed25519.bit.ct_eq(&self.secp256k1.bit)
    }
}

/// Commitments to the same bit on Ed25519 and secp256k1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitmentPair {
    pub ed25519: EdwardsPoint,
    pub secp256k1: ProjectivePoint,
}

impl Readable for CommitmentPair {
    fn read<R: Read>(reader: &mut R) -> Result<Self, ReadError> {
        let ed25519 = read_point::<Ed25519, R>(reader, "CommitmentPair.ed25519")?;
        let secp256k1 = read_point::<Secp256k1, R>(reader, "CommitmentPair.secp256k1")?;
        Ok(Self { ed25519, secp256k1 })
    }
}

impl Writable for CommitmentPair {
    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_point::<Ed25519, W>(writer, &self.ed25519)?;
        write_point::<Secp256k1, W>(writer, &self.secp256k1)
    }
}

/// Commits to every bit of `key` on both curves.
///
/// Blinders are drawn from `rng` one bit at a time; the point arithmetic then runs per bit in parallel when the
/// `parallel` feature is enabled.
pub fn commit_to_bits<R: RngCore + CryptoRng>(
    key: &PrivateKey,
    rng: &mut R,
) -> Result<(Vec<BitOpeningPair>, Vec<CommitmentPair>), DleqError> {
    key.validate()?;
    let openings = (0..COMMITMENT_BITS)
        .map(|i| BitOpeningPair::sample(key.bit(i), rng))
        .collect::<Result<Vec<_>, _>>()?;
    let commitments = cfg_iter!(openings).map(BitOpeningPair::commit).collect::<Vec<_>>();
    debug_assert!(openings.iter().zip(&commitments).all(|(o, c)| bool::from(o.opens(c))));
    debug_assert!(recomposes(key, &openings));
    trace!("Committed to {} bits on both curves", commitments.len());
    Ok((openings, commitments))
}

/// `Σ b_i·2^i` over the openings equals the key, as an integer.
fn recomposes(key: &PrivateKey, openings: &[BitOpeningPair]) -> bool {
    let mut bytes = [0u8; 32];
    for (i, opening) in openings.iter().enumerate() {
        bytes[i / 8] |= opening.bit().unwrap_u8() << (i % 8);
    }
    let result = &bytes == key.as_bytes();
    bytes.zeroize();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    #[test]
    fn commitments_open_to_their_bits() {
        let mut rng = OsRng;
        let key = PrivateKey::random(&mut rng).unwrap();
        let (openings, commitments) = commit_to_bits(&key, &mut rng).unwrap();
        assert_eq!(openings.len(), COMMITMENT_BITS);
        assert_eq!(commitments.len(), COMMITMENT_BITS);
        for (i, (opening, commitment)) in openings.iter().zip(&commitments).enumerate() {
            assert!(bool::from(opening.opens(commitment)), "bit {i} does not open");
            assert_eq!(opening.bit().unwrap_u8(), key.bit(i).unwrap_u8());
        }
        assert!(recomposes(&key, &openings));
    }

    #[test]
    fn an_opening_does_not_open_the_other_bit() {
        let mut rng = OsRng;
        let blinder = Ed25519::random_scalar(&mut rng).unwrap();
        let zero = BitOpening::<Ed25519>::new(Choice::from(0), blinder);
        let one = BitOpening::<Ed25519>::new(Choice::from(1), blinder);
        assert!(!bool::from(one.opens(&zero.commit())));
        assert_eq!(one.commit() - zero.commit(), Ed25519::generator());
    }

    #[test]
    fn blinders_hide_equal_bits() {
        let mut rng = OsRng;
        let a = BitOpeningPair::sample(Choice::from(1), &mut rng).unwrap();
        let b = BitOpeningPair::sample(Choice::from(1), &mut rng).unwrap();
        assert_ne!(a.commit(), b.commit());
    }

    #[test]
    fn commitment_pairs_encode_to_65_bytes() {
        let opening = BitOpeningPair::sample(Choice::from(0), &mut OsRng).unwrap();
        let commitment = opening.commit();
        let bytes = commitment.serialize();
        assert_eq!(bytes.len(), 65);
        assert_eq!(CommitmentPair::from_slice(&bytes).unwrap(), commitment);
    }
}
