//! The complete cross-group proof: building it, encoding it and checking it.

use crate::aggregation::{AggregationProof, AGGREGATION_PROOF_SIZE};
use crate::codec::{read_array, Readable, Writable};
use crate::commitment::{commit_to_bits, CommitmentPair, COMMITMENT_BITS};
use crate::curves::{DleqCurve, Ed25519, Secp256k1, SCALAR_SIZE};
use crate::error::{DleqError, ProofRejection, ReadError};
use crate::keys::{PrivateKey, PublicKeyPair, PUBLIC_KEY_PAIR_SIZE};
use crate::or_proof::{prove_bits, verify_bits, BitProof, BIT_PROOF_SIZE};
use crate::transcript::{Challenge, DleqTranscript};
use log::*;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::io::{self, Read, Write};

/// Size of one commitment pair on the wire.
pub const COMMITMENT_PAIR_SIZE: usize = Ed25519::POINT_SIZE + Secp256k1::POINT_SIZE;

/// Size of an encoded [`DleqProof`]. Every proof has exactly this length.
pub const PROOF_SIZE: usize = PUBLIC_KEY_PAIR_SIZE
    + COMMITMENT_BITS * COMMITMENT_PAIR_SIZE
    + SCALAR_SIZE
    + COMMITMENT_BITS * BIT_PROOF_SIZE
    + AGGREGATION_PROOF_SIZE;

/// A non-interactive proof that one secret `s` is the discrete log of both public keys it carries, `s·G_ed` on
/// Ed25519 and `s·G_secp` on secp256k1.
///
/// The encoding is, in order: the public key pair, the commitment pair of every bit, the bit challenge, the OR-proof of
/// every bit and the aggregation proof. There are no length prefixes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DleqProof {
    pub(crate) public_keys: PublicKeyPair,
    pub(crate) commitments: Vec<CommitmentPair>,
    pub(crate) bit_challenge: Challenge,
    pub(crate) bit_proofs: Vec<BitProof>,
    pub(crate) aggregation: AggregationProof,
}

/// Progress of a single verification. Checks run in this order and the first failure ends the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationState {
    /// The proof bytes decoded into valid points and scalars.
    Decoded,
    BitProofsChecked,
    AggregationChecked,
    Accepted(PublicKeyPair),
    Rejected(ProofRejection),
}

impl VerificationState {
    pub fn is_final(&self) -> bool {
        matches!(self, VerificationState::Accepted(_) | VerificationState::Rejected(_))
    }

    fn advance(self, proof: &DleqProof, transcript: &mut DleqTranscript) -> Self {
        match self {
            VerificationState::Decoded => {
                match verify_bits(&proof.commitments, &proof.bit_challenge, &proof.bit_proofs, transcript) {
                    Ok(()) => VerificationState::BitProofsChecked,
                    Err(rejection) => VerificationState::Rejected(rejection),
                }
            }
            VerificationState::BitProofsChecked => {
                match proof.aggregation.verify(&proof.commitments, &proof.public_keys, &proof.bit_challenge, transcript)
                {
                    Ok(()) => VerificationState::AggregationChecked,
                    Err(rejection) => VerificationState::Rejected(rejection),
                }
            }
            VerificationState::AggregationChecked => VerificationState::Accepted(proof.public_keys),
            state => state,
        }
    }
}

impl DleqProof {
    pub fn public_keys(&self) -> &PublicKeyPair {
        &self.public_keys
    }

    pub fn commitments(&self) -> &[CommitmentPair] {
        &self.commitments
    }

    /// Checks the proof and returns the public keys it proves. Nothing is returned unless every check passes.
    pub fn verify(&self) -> Result<PublicKeyPair, DleqError> {
        let mut transcript = DleqTranscript::new();
        transcript.append_commitments(&self.commitments);
        let mut state = VerificationState::Decoded;
        loop {
            trace!("DLEq verification: {state:?}");
            state = match state {
                VerificationState::Accepted(keys) => {
                    debug!("DLEq proof accepted for {keys}");
                    return Ok(keys);
                }
                VerificationState::Rejected(rejection) => {
                    warn!("DLEq proof rejected: {rejection}");
                    return Err(rejection.into());
                }
                state => state.advance(self, &mut transcript),
            };
        }
    }

    /// Like [`DleqProof::verify`], but also requires the proof to be for `expected`.
    pub fn verify_for(&self, expected: &PublicKeyPair) -> Result<(), DleqError> {
        let keys = self.verify()?;
        if &keys == expected {
            Ok(())
        } else {
            warn!("DLEq proof is valid for {keys}, but {expected} was expected");
            Err(ProofRejection::UnexpectedPublicKeys.into())
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        Writable::serialize(self)
    }

    /// Decodes a proof. Bad lengths, non-canonical encodings and invalid points are rejections.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DleqError> {
        if bytes.len() != PROOF_SIZE {
            let reason = format!("expected {PROOF_SIZE} bytes, got {}", bytes.len());
            return Err(ProofRejection::Malformed(ReadError::new("DleqProof", reason)).into());
        }
        Self::from_slice(bytes).map_err(|e| ProofRejection::Malformed(e).into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(hex: &str) -> Result<Self, DleqError> {
        let bytes = hex::decode(hex.trim())?;
        Self::from_bytes(&bytes)
    }
}

impl Readable for DleqProof {
    fn read<R: Read>(reader: &mut R) -> Result<Self, ReadError> {
        let public_keys = PublicKeyPair::read(reader)?;
        let commitments = (0..COMMITMENT_BITS).map(|_| CommitmentPair::read(reader)).collect::<Result<Vec<_>, _>>()?;
        let bit_challenge = Challenge::from_bytes(&read_array::<SCALAR_SIZE, R>(reader, "DleqProof.bit_challenge")?)
            .map_err(|e| ReadError::new("DleqProof.bit_challenge", e.to_string()))?;
        let bit_proofs = (0..COMMITMENT_BITS).map(|_| BitProof::read(reader)).collect::<Result<Vec<_>, _>>()?;
        let aggregation = AggregationProof::read(reader)?;
        Ok(Self { public_keys, commitments, bit_challenge, bit_proofs, aggregation })
    }
}

impl Writable for DleqProof {
    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.public_keys.write(writer)?;
        for commitment in &self.commitments {
            commitment.write(writer)?;
        }
        writer.write_all(&self.bit_challenge.to_bytes())?;
        for proof in &self.bit_proofs {
            proof.write(writer)?;
        }
        self.aggregation.write(writer)
    }
}

impl Serialize for DleqProof {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for DleqProof {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        DleqProof::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// Proves that `key` is the discrete log of its public keys on both curves.
///
/// Fails with [`DleqError::InvalidPrivateKey`] if the key is zero or not below `2^252`.
pub fn prove<R: RngCore + CryptoRng>(key: &PrivateKey, rng: &mut R) -> Result<DleqProof, DleqError> {
    key.validate()?;
    let public_keys = PublicKeyPair::from_private_key(key);
    let (openings, commitments) = commit_to_bits(key, rng)?;
    let mut transcript = DleqTranscript::new();
    transcript.append_commitments(&commitments);
    let (bit_challenge, bit_proofs) = prove_bits(&openings, &commitments, &mut transcript, rng)?;
    let aggregation =
        AggregationProof::prove(&openings, &commitments, &public_keys, &bit_challenge, &mut transcript, rng)?;
    debug!("Built DLEq proof for {public_keys}");
    Ok(DleqProof { public_keys, commitments, bit_challenge, bit_proofs, aggregation })
}

/// Generates a fresh key and proves it in one step.
pub fn prove_new<R: RngCore + CryptoRng>(rng: &mut R) -> Result<(DleqProof, PrivateKey), DleqError> {
    let key = PrivateKey::random(rng)?;
    let proof = prove(&key, rng)?;
    Ok((proof, key))
}

/// Decodes and verifies an encoded proof, returning the public keys it proves.
pub fn verify(bytes: &[u8]) -> Result<PublicKeyPair, DleqError> {
    DleqProof::from_bytes(bytes)?.verify()
}
