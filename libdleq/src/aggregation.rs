//! Binds the bit commitments to the public keys.
//!
//! On each curve `D = Σ 2^i·C_i - P` equals `R·H` with `R = Σ 2^i·r_i` exactly when the committed bits recompose the
//! discrete log of `P`. The prover shows knowledge of `R_ed` and `R_secp` with a joint Schnorr proof over `H` under one
//! challenge, without publishing either.

use crate::codec::{read_array, read_scalar, write_scalar, Readable, Writable};
use crate::commitment::{BitOpeningPair, CommitmentPair};
use crate::curves::{points_equal, DleqCurve, Ed25519, Secp256k1, SCALAR_SIZE};
use crate::error::{DleqError, ProofRejection, ReadError};
use crate::keys::PublicKeyPair;
use crate::transcript::{Challenge, DleqTranscript};
use curve25519_dalek::edwards::EdwardsPoint;
use k256::ProjectivePoint;
use log::*;
use rand_core::{CryptoRng, RngCore};
use std::io::{self, Read, Write};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// `z_ed`, `z_secp` and `e_agg`.
pub const AGGREGATION_PROOF_SIZE: usize = 3 * SCALAR_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AggregationProof {
    pub(crate) response_ed: curve25519_dalek::Scalar,
    pub(crate) response_secp: k256::Scalar,
    pub(crate) challenge: Challenge,
}

/// `Σ 2^i·C_i - P`
fn difference<'a, C, I>(commitments: I, public_key: &C::Point) -> C::Point
where
    C: DleqCurve,
    I: DoubleEndedIterator<Item = &'a C::Point>,
{
    C::weighted_sum(commitments) - *public_key
}

fn differences(commitments: &[CommitmentPair], keys: &PublicKeyPair) -> (EdwardsPoint, ProjectivePoint) {
    let d_ed = difference::<Ed25519, _>(commitments.iter().map(|c| &c.ed25519), keys.ed25519());
    let d_secp = difference::<Secp256k1, _>(commitments.iter().map(|c| &c.secp256k1), keys.secp256k1());
    (d_ed, d_secp)
}

/// Absorbs the aggregation statement and announcements and squeezes the aggregation challenge.
pub(crate) fn aggregation_challenge(
    transcript: &mut DleqTranscript,
    bit_challenge: &Challenge,
    keys: &PublicKeyPair,
    announcement_ed: &EdwardsPoint,
    announcement_secp: &ProjectivePoint,
) -> Challenge {
    transcript.append_challenge(b"bit_challenge", bit_challenge);
    transcript.append_point::<Ed25519>(b"public_key_ed", keys.ed25519());
    transcript.append_point::<Secp256k1>(b"public_key_secp", keys.secp256k1());
    transcript.append_point::<Ed25519>(b"announcement_ed", announcement_ed);
    transcript.append_point::<Secp256k1>(b"announcement_secp", announcement_secp);
    transcript.challenge(b"aggregation_challenge")
}

impl AggregationProof {
    /// Proves that the commitments aggregate to `keys`.
    ///
    /// `transcript` must have gone through the bit stage, ending with `bit_challenge`.
    pub fn prove<R: RngCore + CryptoRng>(
        openings: &[BitOpeningPair],
        commitments: &[CommitmentPair],
        keys: &PublicKeyPair,
        bit_challenge: &Challenge,
        transcript: &mut DleqTranscript,
        rng: &mut R,
    ) -> Result<Self, DleqError> {
        let blinder_ed = Zeroizing::new(Ed25519::weighted_scalar_sum(openings.iter().map(|o| o.ed25519.blinder())));
        let blinder_secp =
            Zeroizing::new(Secp256k1::weighted_scalar_sum(openings.iter().map(|o| o.secp256k1.blinder())));
        debug_assert!({
            let (d_ed, d_secp) = differences(commitments, keys);
            points_equal::<Ed25519>(&d_ed, &(Ed25519::blinding_generator() * *blinder_ed))
                && points_equal::<Secp256k1>(&d_secp, &(Secp256k1::blinding_generator() * *blinder_secp))
        });

        let nonce_ed = Zeroizing::new(Ed25519::random_scalar(rng)?);
        let nonce_secp = Zeroizing::new(Secp256k1::random_scalar(rng)?);
        let announcement_ed = Ed25519::blinding_generator() * *nonce_ed;
        let announcement_secp = Secp256k1::blinding_generator() * *nonce_secp;
        let challenge = aggregation_challenge(transcript, bit_challenge, keys, &announcement_ed, &announcement_secp);
        let response_ed = *nonce_ed + challenge.for_curve::<Ed25519>() * *blinder_ed;
        let response_secp = *nonce_secp + challenge.for_curve::<Secp256k1>() * *blinder_secp;
        trace!("Aggregation proof built");
        Ok(Self { response_ed, response_secp, challenge })
    }

    /// Recomputes the announcements `A = z·H - e_agg·D` on both curves.
    pub fn announcements(
        &self,
        commitments: &[CommitmentPair],
        keys: &PublicKeyPair,
    ) -> (EdwardsPoint, ProjectivePoint) {
        let (d_ed, d_secp) = differences(commitments, keys);
        let a_ed = Ed25519::blinding_generator() * self.response_ed - d_ed * self.challenge.for_curve::<Ed25519>();
        let a_secp =
            Secp256k1::blinding_generator() * self.response_secp - d_secp * self.challenge.for_curve::<Secp256k1>();
        (a_ed, a_secp)
    }

    /// Checks the proof. `transcript` must be in the state the prover's was in when [`AggregationProof::prove`] ran.
    pub fn verify(
        &self,
        commitments: &[CommitmentPair],
        keys: &PublicKeyPair,
        bit_challenge: &Challenge,
        transcript: &mut DleqTranscript,
    ) -> Result<(), ProofRejection> {
        let (a_ed, a_secp) = self.announcements(commitments, keys);
        let recomputed = aggregation_challenge(transcript, bit_challenge, keys, &a_ed, &a_secp);
        if bool::from(recomputed.ct_eq(&self.challenge)) {
            Ok(())
        } else {
            warn!("Aggregation challenge mismatch for public keys {keys}");
            Err(ProofRejection::AggregationMismatch)
        }
    }

    pub fn challenge(&self) -> &Challenge {
        &self.challenge
    }
}

impl Readable for AggregationProof {
    fn read<R: Read>(reader: &mut R) -> Result<Self, ReadError> {
        let response_ed = read_scalar::<Ed25519, R>(reader, "AggregationProof.z_ed")?;
        let response_secp = read_scalar::<Secp256k1, R>(reader, "AggregationProof.z_secp")?;
        let challenge = Challenge::from_bytes(&read_array::<SCALAR_SIZE, R>(reader, "AggregationProof.e_agg")?)
            .map_err(|e| ReadError::new("AggregationProof.e_agg", e.to_string()))?;
        Ok(Self { response_ed, response_secp, challenge })
    }
}

impl Writable for AggregationProof {
    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_scalar::<Ed25519, W>(writer, &self.response_ed)?;
        write_scalar::<Secp256k1, W>(writer, &self.response_secp)?;
        writer.write_all(&self.challenge.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::commit_to_bits;
    use crate::keys::generate;
    use rand_core::OsRng;

    fn setup() -> (Vec<BitOpeningPair>, Vec<CommitmentPair>, PublicKeyPair, Challenge) {
        let mut rng = OsRng;
        let (key, keys) = generate(&mut rng).unwrap();
        let (openings, commitments) = commit_to_bits(&key, &mut rng).unwrap();
        let bit_challenge = Challenge::random(&mut rng).unwrap();
        (openings, commitments, keys, bit_challenge)
    }

    #[test]
    fn honest_aggregation_verifies() {
        let (openings, commitments, keys, e_bits) = setup();
        let transcript = DleqTranscript::new();
        let proof =
            AggregationProof::prove(&openings, &commitments, &keys, &e_bits, &mut transcript.clone(), &mut OsRng)
                .unwrap();
        assert!(proof.verify(&commitments, &keys, &e_bits, &mut transcript.clone()).is_ok());
    }

    #[test]
    fn other_keys_do_not_verify() {
        let (openings, commitments, keys, e_bits) = setup();
        let (_, other) = generate(&mut OsRng).unwrap();
        let transcript = DleqTranscript::new();
        let proof =
            AggregationProof::prove(&openings, &commitments, &keys, &e_bits, &mut transcript.clone(), &mut OsRng)
                .unwrap();
        let err = proof.verify(&commitments, &other, &e_bits, &mut transcript.clone()).unwrap_err();
        assert_eq!(err, ProofRejection::AggregationMismatch);
        // Swapping only one half of the pair is caught too
        let mixed = PublicKeyPair::from_points(*keys.ed25519(), *other.secp256k1());
        let err = proof.verify(&commitments, &mixed, &e_bits, &mut transcript.clone()).unwrap_err();
        assert_eq!(err, ProofRejection::AggregationMismatch);
    }

    #[test]
    fn tampered_response_or_bit_challenge_is_rejected() {
        let (openings, commitments, keys, e_bits) = setup();
        let transcript = DleqTranscript::new();
        let proof =
            AggregationProof::prove(&openings, &commitments, &keys, &e_bits, &mut transcript.clone(), &mut OsRng)
                .unwrap();
        let mut tampered = proof;
        tampered.response_secp += k256::Scalar::ONE;
        assert!(tampered.verify(&commitments, &keys, &e_bits, &mut transcript.clone()).is_err());
        let other_bits = e_bits.slice(0);
        assert!(proof.verify(&commitments, &keys, &other_bits, &mut transcript.clone()).is_err());
    }

    #[test]
    fn aggregation_proof_encodes_to_96_bytes() {
        let (openings, commitments, keys, e_bits) = setup();
        let proof =
            AggregationProof::prove(&openings, &commitments, &keys, &e_bits, &mut DleqTranscript::new(), &mut OsRng)
                .unwrap();
        let bytes = proof.serialize();
        assert_eq!(bytes.len(), AGGREGATION_PROOF_SIZE);
        assert_eq!(AggregationProof::from_slice(&bytes).unwrap(), proof);
    }
}
