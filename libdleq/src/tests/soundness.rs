//! A proof with any single field altered must be rejected, and at the right stage.

use crate::aggregation::aggregation_challenge;
use crate::curves::{DleqCurve, Ed25519, Secp256k1};
use crate::keys::{generate, PublicKeyPair};
use crate::or_proof::verify_bits;
use crate::proof::{prove_new, verify, DleqProof};
use crate::transcript::DleqTranscript;
use crate::{DleqError, ProofRejection};
use rand_core::OsRng;
use std::sync::LazyLock;

static PROOF: LazyLock<DleqProof> = LazyLock::new(|| prove_new(&mut OsRng).unwrap().0);

fn rejection(proof: &DleqProof) -> ProofRejection {
    match verify(&proof.to_bytes()) {
        Err(DleqError::InvalidProof(rejection)) => rejection,
        other => panic!("expected a rejection, got {other:?}"),
    }
}

#[test]
fn tampered_commitments_are_rejected() {
    env_logger::try_init().ok();
    let mut proof = PROOF.clone();
    proof.commitments[5].ed25519 += Ed25519::generator();
    assert_eq!(rejection(&proof), ProofRejection::InvalidBitProof);

    let mut proof = PROOF.clone();
    proof.commitments[200].secp256k1 += Secp256k1::blinding_generator();
    assert_eq!(rejection(&proof), ProofRejection::InvalidBitProof);

    // Reordered commitments no longer match their OR-proofs
    let mut proof = PROOF.clone();
    proof.commitments.swap(0, 1);
    assert_eq!(rejection(&proof), ProofRejection::InvalidBitProof);
}

#[test]
fn tampered_or_proof_responses_are_rejected() {
    env_logger::try_init().ok();
    let mut proof = PROOF.clone();
    proof.bit_proofs[3].z1_ed += curve25519_dalek::Scalar::ONE;
    assert_eq!(rejection(&proof), ProofRejection::InvalidBitProof);

    let mut proof = PROOF.clone();
    proof.bit_proofs[251].z0_secp += k256::Scalar::ONE;
    assert_eq!(rejection(&proof), ProofRejection::InvalidBitProof);

    let mut proof = PROOF.clone();
    proof.bit_proofs[100].e0 = proof.bit_proofs[100].e0 - proof.bit_challenge;
    assert_eq!(rejection(&proof), ProofRejection::InvalidBitProof);

    let mut proof = PROOF.clone();
    proof.bit_challenge = proof.bit_challenge.slice(0);
    assert_eq!(rejection(&proof), ProofRejection::InvalidBitProof);
}

#[test]
fn tampered_aggregation_is_rejected() {
    env_logger::try_init().ok();
    let mut proof = PROOF.clone();
    proof.aggregation.response_ed += curve25519_dalek::Scalar::ONE;
    assert_eq!(rejection(&proof), ProofRejection::AggregationMismatch);

    let mut proof = PROOF.clone();
    proof.aggregation.response_secp += k256::Scalar::ONE;
    assert_eq!(rejection(&proof), ProofRejection::AggregationMismatch);
}

#[test]
fn substituted_key_with_recomputed_challenge_fails_aggregation() {
    env_logger::try_init().ok();
    let mut proof = PROOF.clone();
    let (_, unrelated) = generate(&mut OsRng).unwrap();
    let substituted = PublicKeyPair::from_points(*proof.public_keys.ed25519(), *unrelated.secp256k1());

    // Replay the honest transcript through the bit stage, then squeeze a fresh aggregation challenge over the
    // substituted key, keeping the original announcements and responses.
    let (a_ed, a_secp) = proof.aggregation.announcements(&proof.commitments, &proof.public_keys);
    let mut transcript = DleqTranscript::new();
    transcript.append_commitments(&proof.commitments);
    verify_bits(&proof.commitments, &proof.bit_challenge, &proof.bit_proofs, &mut transcript).unwrap();
    proof.aggregation.challenge =
        aggregation_challenge(&mut transcript, &proof.bit_challenge, &substituted, &a_ed, &a_secp);
    proof.public_keys = substituted;

    assert_eq!(rejection(&proof), ProofRejection::AggregationMismatch);
}
