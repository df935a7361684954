//! Per-bit disjunctive proofs.
//!
//! For every commitment pair the prover shows, jointly on both curves, that either
//! `C_ed = x·H_ed and C_secp = y·H_secp` (the bit is 0) or `C_ed - G_ed = x·H_ed and C_secp - G_secp = y·H_secp`
//! (the bit is 1), without revealing which. Both branches are always computed: the true one as an ordinary Schnorr
//! proof and the other one simulated from a random challenge and random responses. The bit only ever drives
//! constant-time selects.
//!
//! The challenges of the two branches sum to the per-bit slice of the global bit challenge, modulo `l`. Only branch 0's
//! challenge is published; the verifier derives branch 1's.

use crate::codec::{read_array, read_scalar, write_scalar, Readable, Writable};
use crate::commitment::{BitOpening, BitOpeningPair, CommitmentPair, COMMITMENT_BITS};
use crate::curves::{DleqCurve, Ed25519, Secp256k1, SCALAR_SIZE};
use crate::error::{DleqError, ProofRejection, ReadError};
use crate::transcript::{Challenge, DleqTranscript};
use curve25519_dalek::edwards::EdwardsPoint;
use k256::ProjectivePoint;
use log::*;
use rand_core::{CryptoRng, RngCore};
use std::io::{self, Read, Write};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// `e_0`, then `z_0` and `z_1` on each curve.
pub const BIT_PROOF_SIZE: usize = 5 * SCALAR_SIZE;

/// The first move of one bit's OR-proof: one announcement per branch per curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitAnnouncements {
    pub a0_ed: EdwardsPoint,
    pub a0_secp: ProjectivePoint,
    pub a1_ed: EdwardsPoint,
    pub a1_secp: ProjectivePoint,
}

/// The prover's per-curve randomness for one bit: the nonce of the real branch and the response of the simulated one.
struct BranchSecrets<C: DleqCurve> {
    nonce: C::Scalar,
    fake_response: C::Scalar,
}

impl<C: DleqCurve> BranchSecrets<C> {
    fn sample<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, DleqError> {
        let nonce = C::random_scalar(rng)?;
        let fake_response = C::random_scalar(rng)?;
        Ok(Self { nonce, fake_response })
    }

    /// Returns `(A_0, A_1)`: `k·H` in the slot of the committed bit, `z_f·H - e_f·D_f` in the other.
    fn announce(&self, opening: &BitOpening<C>, commitment: &C::Point, fake_challenge: &Challenge) -> (C::Point, C::Point) {
        let h = C::blinding_generator();
        let bit = opening.bit();
        let real = h * self.nonce;
        // The simulated branch claims the opposite bit: C - G when the bit is 0, C when it is 1
        let fake_statement = C::Point::conditional_select(&(*commitment - C::generator()), commitment, bit);
        let fake = h * self.fake_response - fake_statement * fake_challenge.for_curve::<C>();
        let a0 = C::Point::conditional_select(&real, &fake, bit);
        let a1 = C::Point::conditional_select(&fake, &real, bit);
        (a0, a1)
    }

    /// Returns `(z_0, z_1)`, completing the real branch with `z = k + e_real·r`.
    fn respond(&self, opening: &BitOpening<C>, real_challenge: &Challenge) -> (C::Scalar, C::Scalar) {
        let bit = opening.bit();
        let real = self.nonce + real_challenge.for_curve::<C>() * *opening.blinder();
        let z0 = C::Scalar::conditional_select(&real, &self.fake_response, bit);
        let z1 = C::Scalar::conditional_select(&self.fake_response, &real, bit);
        (z0, z1)
    }
}

impl<C: DleqCurve> Drop for BranchSecrets<C> {
    fn drop(&mut self) {
        self.nonce.zeroize();
        self.fake_response.zeroize();
    }
}

/// An OR-proof that has been announced but not yet answered.
pub struct PendingBitProof {
    fake_challenge: Challenge,
    ed25519: BranchSecrets<Ed25519>,
    secp256k1: BranchSecrets<Secp256k1>,
}

impl PendingBitProof {
    pub fn sample<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, DleqError> {
        let fake_challenge = Challenge::random(rng)?;
        let ed25519 = BranchSecrets::sample(rng)?;
        let secp256k1 = BranchSecrets::sample(rng)?;
        Ok(Self { fake_challenge, ed25519, secp256k1 })
    }

    pub fn announce(&self, opening: &BitOpeningPair, commitment: &CommitmentPair) -> BitAnnouncements {
        let (a0_ed, a1_ed) = self.ed25519.announce(&opening.ed25519, &commitment.ed25519, &self.fake_challenge);
        let (a0_secp, a1_secp) =
            self.secp256k1.announce(&opening.secp256k1, &commitment.secp256k1, &self.fake_challenge);
        BitAnnouncements { a0_ed, a0_secp, a1_ed, a1_secp }
    }

    /// Splits `challenge` (this bit's slice of the bit challenge) between the branches and answers both.
    pub fn finish(&self, opening: &BitOpeningPair, challenge: &Challenge) -> BitProof {
        let bit = opening.bit();
        let real_challenge = *challenge - self.fake_challenge;
        let (z0_ed, z1_ed) = self.ed25519.respond(&opening.ed25519, &real_challenge);
        let (z0_secp, z1_secp) = self.secp256k1.respond(&opening.secp256k1, &real_challenge);
        let e0 = Challenge::conditional_select(&real_challenge, &self.fake_challenge, bit);
        BitProof { e0, z0_ed, z0_secp, z1_ed, z1_secp }
    }
}

impl Drop for PendingBitProof {
    fn drop(&mut self) {
        self.fake_challenge.zeroize();
    }
}

/// The published part of one bit's OR-proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitProof {
    pub(crate) e0: Challenge,
    pub(crate) z0_ed: curve25519_dalek::Scalar,
    pub(crate) z0_secp: k256::Scalar,
    pub(crate) z1_ed: curve25519_dalek::Scalar,
    pub(crate) z1_secp: k256::Scalar,
}

impl BitProof {
    /// Recomputes the announcements `A_j = z_j·H - e_j·(C - j·G)` that this proof answers under `challenge`.
    pub fn announcements(&self, commitment: &CommitmentPair, challenge: &Challenge) -> BitAnnouncements {
        let e1 = *challenge - self.e0;
        let (a0_ed, a1_ed) = recompute::<Ed25519>(&commitment.ed25519, &self.e0, &e1, &self.z0_ed, &self.z1_ed);
        let (a0_secp, a1_secp) =
            recompute::<Secp256k1>(&commitment.secp256k1, &self.e0, &e1, &self.z0_secp, &self.z1_secp);
        BitAnnouncements { a0_ed, a0_secp, a1_ed, a1_secp }
    }
}

fn recompute<C: DleqCurve>(
    commitment: &C::Point,
    e0: &Challenge,
    e1: &Challenge,
    z0: &C::Scalar,
    z1: &C::Scalar,
) -> (C::Point, C::Point) {
    let h = C::blinding_generator();
    let a0 = h * *z0 - *commitment * e0.for_curve::<C>();
    let a1 = h * *z1 - (*commitment - C::generator()) * e1.for_curve::<C>();
    (a0, a1)
}

impl Readable for BitProof {
    fn read<R: Read>(reader: &mut R) -> Result<Self, ReadError> {
        let e0 = Challenge::from_bytes(&read_array::<SCALAR_SIZE, R>(reader, "BitProof.e0")?)
            .map_err(|e| ReadError::new("BitProof.e0", e.to_string()))?;
        let z0_ed = read_scalar::<Ed25519, R>(reader, "BitProof.z0_ed")?;
        let z0_secp = read_scalar::<Secp256k1, R>(reader, "BitProof.z0_secp")?;
        let z1_ed = read_scalar::<Ed25519, R>(reader, "BitProof.z1_ed")?;
        let z1_secp = read_scalar::<Secp256k1, R>(reader, "BitProof.z1_secp")?;
        Ok(Self { e0, z0_ed, z0_secp, z1_ed, z1_secp })
    }
}

impl Writable for BitProof {
    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.e0.to_bytes())?;
        write_scalar::<Ed25519, W>(writer, &self.z0_ed)?;
        write_scalar::<Secp256k1, W>(writer, &self.z0_secp)?;
        write_scalar::<Ed25519, W>(writer, &self.z1_ed)?;
        write_scalar::<Secp256k1, W>(writer, &self.z1_secp)
    }
}

/// Runs the OR-proof for every bit and returns the bit challenge together with the proofs.
///
/// The transcript must already hold the commitments. On return it also holds every announcement and the bit challenge.
pub fn prove_bits<R: RngCore + CryptoRng>(
    openings: &[BitOpeningPair],
    commitments: &[CommitmentPair],
    transcript: &mut DleqTranscript,
    rng: &mut R,
) -> Result<(Challenge, Vec<BitProof>), DleqError> {
    let pending = (0..openings.len()).map(|_| PendingBitProof::sample(rng)).collect::<Result<Vec<_>, _>>()?;
    let announcements = cfg_iter!(pending)
        .zip(openings)
        .zip(commitments)
        .map(|((p, opening), commitment)| p.announce(opening, commitment))
        .collect::<Vec<_>>();
    transcript.append_bit_announcements(&announcements);
    let bit_challenge = transcript.challenge(b"bit_challenge");
    let proofs = cfg_iter!(pending)
        .zip(openings)
        .enumerate()
        .map(|(i, (p, opening))| p.finish(opening, &bit_challenge.slice(i)))
        .collect::<Vec<_>>();
    debug!("Built {} bit proofs", proofs.len());
    Ok((bit_challenge, proofs))
}

/// Checks every bit proof against the claimed bit challenge, recomputing the announcements and the challenge itself.
pub fn verify_bits(
    commitments: &[CommitmentPair],
    bit_challenge: &Challenge,
    proofs: &[BitProof],
    transcript: &mut DleqTranscript,
) -> Result<(), ProofRejection> {
    if commitments.len() != COMMITMENT_BITS || proofs.len() != COMMITMENT_BITS {
        warn!("Expected {COMMITMENT_BITS} bit proofs, got {} proofs for {} commitments", proofs.len(), commitments.len());
        return Err(ProofRejection::InvalidBitProof);
    }
    let announcements = cfg_iter!(proofs)
        .zip(commitments)
        .enumerate()
        .map(|(i, (proof, commitment))| proof.announcements(commitment, &bit_challenge.slice(i)))
        .collect::<Vec<_>>();
    transcript.append_bit_announcements(&announcements);
    let recomputed = transcript.challenge(b"bit_challenge");
    if bool::from(recomputed.ct_eq(bit_challenge)) {
        Ok(())
    } else {
        warn!("Recomputed bit challenge does not match the proof");
        Err(ProofRejection::InvalidBitProof)
    }
}
