//! Wire format checks on whole proofs.

use crate::curves::{DleqCurve, Ed25519};
use crate::proof::{prove_new, verify, DleqProof, PROOF_SIZE};
use crate::{DleqError, ProofRejection, Readable};
use curve25519_dalek::constants::EIGHT_TORSION;
use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::traits::Identity;
use rand_core::OsRng;
use std::sync::LazyLock;

static PROOF_BYTES: LazyLock<Vec<u8>> = LazyLock::new(|| prove_new(&mut OsRng).unwrap().0.to_bytes());

/// Offset of the first Ed25519 commitment.
const FIRST_COMMITMENT: usize = 65;

fn malformed_field(bytes: &[u8]) -> String {
    match verify(bytes) {
        Err(DleqError::InvalidProof(ProofRejection::Malformed(e))) => e.field().to_string(),
        other => panic!("expected a malformed proof, got {other:?}"),
    }
}

fn with_bytes_at(offset: usize, replacement: &[u8]) -> Vec<u8> {
    let mut bytes = PROOF_BYTES.clone();
    bytes[offset..offset + replacement.len()].copy_from_slice(replacement);
    bytes
}

#[test]
fn proofs_have_a_fixed_size() {
    assert_eq!(PROOF_BYTES.len(), PROOF_SIZE);
    let proof = DleqProof::from_bytes(&PROOF_BYTES).unwrap();
    assert_eq!(proof.to_bytes(), *PROOF_BYTES);
    assert_eq!(DleqProof::from_hex(&proof.to_hex()).unwrap(), proof);
}

#[test]
fn truncated_and_extended_proofs_are_malformed() {
    env_logger::try_init().ok();
    assert_eq!(malformed_field(&PROOF_BYTES[..PROOF_SIZE - 1]), "DleqProof");
    assert_eq!(malformed_field(&[]), "DleqProof");
    let mut extended = PROOF_BYTES.clone();
    extended.push(0);
    assert_eq!(malformed_field(&extended), "DleqProof");
    // The streaming reader reports the field it ran out in
    let err = DleqProof::from_slice(&PROOF_BYTES[..PROOF_SIZE - 1]).unwrap_err();
    assert_eq!(err.field(), "AggregationProof.e_agg");
    let err = DleqProof::from_slice(&extended).unwrap_err();
    assert_eq!(err.field(), "trailing data");
}

#[test]
fn identity_and_small_order_points_are_rejected() {
    env_logger::try_init().ok();
    let identity = EdwardsPoint::identity().compress().to_bytes();
    assert_eq!(malformed_field(&with_bytes_at(0, &identity)), "PublicKeyPair.ed25519");
    assert_eq!(malformed_field(&with_bytes_at(FIRST_COMMITMENT, &identity)), "CommitmentPair.ed25519");
    let torsion = EIGHT_TORSION[1].compress().to_bytes();
    assert_eq!(malformed_field(&with_bytes_at(FIRST_COMMITMENT, &torsion)), "CommitmentPair.ed25519");
    // A torsion component on a valid point is rejected too
    let twisted = (Ed25519::generator() + EIGHT_TORSION[1]).compress().to_bytes();
    assert_eq!(malformed_field(&with_bytes_at(0, &twisted)), "PublicKeyPair.ed25519");
}

#[test]
fn invalid_secp256k1_points_are_rejected() {
    env_logger::try_init().ok();
    assert_eq!(malformed_field(&with_bytes_at(32, &[0x05])), "PublicKeyPair.secp256k1");
    assert_eq!(malformed_field(&with_bytes_at(FIRST_COMMITMENT + 32, &[0u8; 33])), "CommitmentPair.secp256k1");
}

#[test]
fn non_canonical_scalars_are_rejected() {
    env_logger::try_init().ok();
    let overflow = [0xffu8; 32];
    assert_eq!(malformed_field(&with_bytes_at(PROOF_SIZE - 32, &overflow)), "AggregationProof.e_agg");
    assert_eq!(malformed_field(&with_bytes_at(PROOF_SIZE - 64, &overflow)), "AggregationProof.z_secp");
    assert_eq!(malformed_field(&with_bytes_at(PROOF_SIZE - 96, &overflow)), "AggregationProof.z_ed");
    let bit_challenge = 65 + 252 * 65;
    assert_eq!(malformed_field(&with_bytes_at(bit_challenge, &overflow)), "DleqProof.bit_challenge");
    assert_eq!(malformed_field(&with_bytes_at(bit_challenge + 32, &overflow)), "BitProof.e0");
}

#[test]
fn hex_input_is_checked() {
    assert!(matches!(DleqProof::from_hex("not hex"), Err(DleqError::InvalidHex(_))));
    let err = DleqProof::from_hex("00ff").unwrap_err();
    assert!(err.is_rejection());
}
