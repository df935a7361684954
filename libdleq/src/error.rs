use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error reading field '{field}': {error}")]
pub struct ReadError {
    field: String,
    error: String,
}

impl ReadError {
    pub fn new(field: impl Into<String>, error: impl Into<String>) -> Self {
        Self { field: field.into(), error: error.into() }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

#[derive(Debug, Error)]
pub enum DleqError {
    #[error("The entropy source failed to provide random bytes.")]
    RandomnessFailure,
    #[error("Invalid encoding. {0}")]
    InvalidEncoding(#[from] ReadError),
    #[error("The private key is zero or does not fit in the range shared by Ed25519 and secp256k1.")]
    InvalidPrivateKey,
    #[error("DLEQ proof rejected. {0}")]
    InvalidProof(#[from] ProofRejection),
    #[error("Invalid hex string: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl DleqError {
    /// True when the error is an ordinary negative verification result rather than a caller or environment fault.
    pub fn is_rejection(&self) -> bool {
        matches!(self, DleqError::InvalidProof(_))
    }
}

/// The reason a proof was rejected during verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProofRejection {
    #[error("The proof is malformed: {0}")]
    Malformed(ReadError),
    #[error("At least one bit commitment is not provably a commitment to 0 or 1.")]
    InvalidBitProof,
    #[error("The bit commitments do not aggregate to the claimed public keys.")]
    AggregationMismatch,
    #[error("The proof is valid, but for a different pair of public keys.")]
    UnexpectedPublicKeys,
}

impl From<ReadError> for ProofRejection {
    fn from(value: ReadError) -> Self {
        ProofRejection::Malformed(value)
    }
}
