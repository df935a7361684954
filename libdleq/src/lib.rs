//! Cross-group discrete log equality proofs between Ed25519 and secp256k1.
//!
//! A [`DleqProof`] convinces a verifier that the Ed25519 public key `s·G_ed` and the secp256k1 public key `s·G_secp`
//! share the same secret `s`, without revealing it. The secret is limited to `[1, 2^252)` so that it is the same
//! integer on both curves. The prover commits to each of its 252 bits on both curves, proves with a disjunctive proof
//! that every pair of commitments hides the same bit, 0 or 1, and finally shows that the weighted sum of the
//! commitments opens to the public keys.
//!
//! ```no_run
//! use rand_core::OsRng;
//!
//! let (key, public_keys) = libdleq::generate(&mut OsRng)?;
//! let proof = libdleq::prove(&key, &mut OsRng)?;
//! let proven = libdleq::verify(&proof.to_bytes())?;
//! assert_eq!(proven, public_keys);
//! # Ok::<(), libdleq::DleqError>(())
//! ```
//!
//! With the default `parallel` feature the per-bit work runs on rayon's thread pool.

/// Iterates over a collection by reference, in parallel when the `parallel` feature is enabled.
macro_rules! cfg_iter {
    ($e:expr) => {{
        #[cfg(feature = "parallel")]
        let it = $e.par_iter();
        #[cfg(not(feature = "parallel"))]
        let it = $e.iter();
        it
    }};
}

pub mod aggregation;
pub mod codec;
pub mod commitment;
pub mod curves;
pub mod error;
pub mod keys;
pub mod or_proof;
pub mod proof;
pub mod transcript;

#[cfg(test)]
mod tests;

pub use codec::{Readable, Writable};
pub use commitment::COMMITMENT_BITS;
pub use curves::{DleqCurve, Ed25519, Secp256k1};
pub use error::{DleqError, ProofRejection, ReadError};
pub use keys::{generate, PrivateKey, PublicKeyPair};
pub use proof::{prove, prove_new, verify, DleqProof, VerificationState, PROOF_SIZE};
