//! Fiat-Shamir transcript for the cross-group proof.
//!
//! The order in which values are appended is part of the proof format. Prover and verifier both go through
//! [`DleqTranscript`], in this order:
//!
//! 1. domain tag, both curve identifiers and the number of committed bits;
//! 2. every commitment pair, lowest bit first;
//! 3. every OR-proof announcement (branch 0 then branch 1, Ed25519 before secp256k1), then the bit challenge;
//! 4. the bit challenge, both public keys and the aggregation announcements, then the aggregation challenge.
//!
//! Challenges are reduced modulo the Ed25519 group order `l`, the smaller of the two orders, so the same integer is
//! a valid scalar on both curves.

use crate::commitment::{CommitmentPair, COMMITMENT_BITS};
use crate::curves::{DleqCurve, Ed25519, Secp256k1, SCALAR_SIZE};
use crate::error::{DleqError, ReadError};
use crate::or_proof::BitAnnouncements;
use blake2::Blake2b512;
use curve25519_dalek::Scalar;
use digest::{Digest, Update};
use flexible_transcript::{RecommendedTranscript, Transcript};
use rand_core::{CryptoRng, RngCore};
use std::ops::Sub;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

pub const DOMAIN_SEPARATOR: &[u8] = b"Ed25519/Secp256k1 cross-group DLEq v1";
const BIT_SLICE_DOMAIN: &[u8] = b"Ed25519/Secp256k1 cross-group DLEq v1 bit slice";

/// A Fiat-Shamir challenge: an integer in `[0, l)`, where `l` is the Ed25519 group order.
///
/// Because `l` is smaller than the secp256k1 order, the challenge is used unchanged on both curves. Challenge
/// arithmetic (splitting a challenge between the two branches of an OR-proof) is carried out modulo `l`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Challenge(Scalar);

impl Challenge {
    pub fn from_wide(bytes: &[u8; 64]) -> Self {
        Self(Scalar::from_bytes_mod_order_wide(bytes))
    }

    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, DleqError> {
        Ed25519::random_scalar(rng).map(Self)
    }

    /// The canonical little-endian encoding of the challenge.
    pub fn to_bytes(&self) -> [u8; SCALAR_SIZE] {
        self.0.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8; SCALAR_SIZE]) -> Result<Self, ReadError> {
        Ed25519::decode_scalar(bytes).map(Self).ok_or_else(|| ReadError::new("challenge", "challenge is not below l"))
    }

    /// The challenge as a scalar of curve `C`, reduced modulo that curve's order.
    pub fn for_curve<C: DleqCurve>(&self) -> C::Scalar {
        C::reduce(&self.to_bytes())
    }

    /// The challenge that bit `index` must answer, derived from the global bit challenge.
    pub fn slice(&self, index: usize) -> Self {
        let digest = Blake2b512::new()
            .chain(BIT_SLICE_DOMAIN)
            .chain(self.to_bytes())
            .chain((index as u16).to_le_bytes())
            .finalize();
        let mut wide = [0u8; 64];
        wide.copy_from_slice(digest.as_slice());
        Self::from_wide(&wide)
    }
}

impl Sub for Challenge {
    type Output = Challenge;

    fn sub(self, rhs: Challenge) -> Challenge {
        Challenge(self.0 - rhs.0)
    }
}

impl ConditionallySelectable for Challenge {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Challenge(Scalar::conditional_select(&a.0, &b.0, choice))
    }
}

impl ConstantTimeEq for Challenge {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.ct_eq(&other.0)
    }
}

impl Zeroize for Challenge {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

#[derive(Clone)]
pub struct DleqTranscript(RecommendedTranscript);

impl DleqTranscript {
    /// Starts a transcript bound to both curves and the fixed bit length.
    pub fn new() -> Self {
        let mut t = RecommendedTranscript::new(DOMAIN_SEPARATOR);
        t.append_message(b"curve", Ed25519::ID);
        t.append_message(b"curve", Secp256k1::ID);
        t.append_message(b"bits", (COMMITMENT_BITS as u16).to_le_bytes());
        Self(t)
    }

    pub fn append_commitments(&mut self, commitments: &[CommitmentPair]) {
        self.0.domain_separate(b"commitments");
        for commitment in commitments {
            self.append_point::<Ed25519>(b"commitment_ed", &commitment.ed25519);
            self.append_point::<Secp256k1>(b"commitment_secp", &commitment.secp256k1);
        }
    }

    /// Appends the announcements of every bit, branch 0 then branch 1, Ed25519 before secp256k1.
    pub fn append_bit_announcements(&mut self, announcements: &[BitAnnouncements]) {
        for a in announcements {
            self.append_point::<Ed25519>(b"announcement_0_ed", &a.a0_ed);
            self.append_point::<Secp256k1>(b"announcement_0_secp", &a.a0_secp);
            self.append_point::<Ed25519>(b"announcement_1_ed", &a.a1_ed);
            self.append_point::<Secp256k1>(b"announcement_1_secp", &a.a1_secp);
        }
    }

    pub fn append_point<C: DleqCurve>(&mut self, label: &'static [u8], point: &C::Point) {
        self.0.append_message(label, C::encode_point(point));
    }

    pub fn append_challenge(&mut self, label: &'static [u8], challenge: &Challenge) {
        self.0.append_message(label, challenge.to_bytes());
    }

    pub fn domain_separate(&mut self, label: &'static [u8]) {
        self.0.domain_separate(label);
    }

    pub fn challenge(&mut self, label: &'static [u8]) -> Challenge {
        let output = self.0.challenge(label);
        let mut wide = [0u8; 64];
        wide.copy_from_slice(&AsRef::<[u8]>::as_ref(&output)[..64]);
        Challenge::from_wide(&wide)
    }
}

impl Default for DleqTranscript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    #[test]
    fn challenges_are_deterministic_and_order_sensitive() {
        let a = Ed25519::generator();
        let b = Ed25519::blinding_generator();

        let mut t1 = DleqTranscript::new();
        t1.append_point::<Ed25519>(b"p", &a);
        t1.append_point::<Ed25519>(b"p", &b);
        let mut t2 = DleqTranscript::new();
        t2.append_point::<Ed25519>(b"p", &a);
        t2.append_point::<Ed25519>(b"p", &b);
        let mut t3 = DleqTranscript::new();
        t3.append_point::<Ed25519>(b"p", &b);
        t3.append_point::<Ed25519>(b"p", &a);

        let c1 = t1.challenge(b"c");
        assert_eq!(c1, t2.challenge(b"c"));
        assert_ne!(c1, t3.challenge(b"c"));
        // The transcript keeps absorbing after a challenge
        assert_ne!(c1, t1.challenge(b"c"));
    }

    #[test]
    fn challenge_is_the_same_integer_on_both_curves() {
        let c = Challenge::random(&mut OsRng).unwrap();
        let ed = c.for_curve::<Ed25519>();
        let secp = c.for_curve::<Secp256k1>();
        let mut be = ed.to_bytes();
        be.reverse();
        assert_eq!(Secp256k1::encode_scalar(&secp), be);
    }

    #[test]
    fn slices_differ_per_bit() {
        let c = Challenge::random(&mut OsRng).unwrap();
        assert_eq!(c.slice(3), c.slice(3));
        assert_ne!(c.slice(3), c.slice(4));
        assert_ne!(c.slice(0), c);
    }

    #[test]
    fn challenge_encoding_rejects_values_above_l() {
        assert!(Challenge::from_bytes(&[0xff; 32]).is_err());
        let c = Challenge::random(&mut OsRng).unwrap();
        assert_eq!(Challenge::from_bytes(&c.to_bytes()).unwrap(), c);
    }
}
