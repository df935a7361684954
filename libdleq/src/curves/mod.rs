//! Curve adapters
//!
//! The proof runs the same Pedersen and Schnorr arithmetic on two groups of different prime order. [`DleqCurve`]
//! is the uniform surface the rest of the crate uses for either group; [`Ed25519`] and [`Secp256k1`] are the two
//! implementations. Generic code picks the curve through a type parameter, so every call states which group it is
//! working in.

mod ed25519;
mod secp256k1;

pub use ed25519::Ed25519;
pub use secp256k1::Secp256k1;

use crate::error::DleqError;
use rand_core::{CryptoRng, RngCore};
use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::{Zeroize, Zeroizing};

/// The size in bytes of a scalar on either curve.
pub const SCALAR_SIZE: usize = 32;

pub trait DleqCurve: Copy + Debug + Send + Sync + 'static {
    type Scalar: Copy
        + Debug
        + Default
        + Eq
        + Send
        + Sync
        + Add<Output = Self::Scalar>
        + Sub<Output = Self::Scalar>
        + Mul<Output = Self::Scalar>
        + Neg<Output = Self::Scalar>
        + ConditionallySelectable
        + ConstantTimeEq
        + Zeroize;

    type Point: Copy
        + Debug
        + Eq
        + Send
        + Sync
        + Add<Output = Self::Point>
        + Sub<Output = Self::Point>
        + Mul<Self::Scalar, Output = Self::Point>
        + ConditionallySelectable
        + ConstantTimeEq;

    /// Identifier mixed into the Fiat-Shamir transcript.
    const ID: &'static [u8];
    /// Size of a canonical compressed point encoding.
    const POINT_SIZE: usize;

    /// The canonical base point `G`.
    fn generator() -> Self::Point;

    /// The Pedersen blinding base `H`. Nobody knows its discrete log with respect to `G`.
    fn blinding_generator() -> Self::Point;

    fn identity() -> Self::Point;

    fn scalar_one() -> Self::Scalar;

    /// Interprets 32 little-endian bytes as an integer and reduces it modulo the group order.
    fn reduce(le_bytes: &[u8; SCALAR_SIZE]) -> Self::Scalar;

    /// Reduces a 512-bit little-endian integer modulo the group order. Used for uniform sampling.
    fn scalar_from_wide(le_bytes: &[u8; 64]) -> Self::Scalar;

    fn encode_point(point: &Self::Point) -> Vec<u8>;

    /// Decodes a point, rejecting non-canonical encodings, the identity and points outside the prime-order group.
    fn decode_point(bytes: &[u8]) -> Result<Self::Point, &'static str>;

    /// The curve's canonical scalar encoding (little-endian for Ed25519, big-endian for secp256k1).
    fn encode_scalar(scalar: &Self::Scalar) -> [u8; SCALAR_SIZE];

    /// Decodes a scalar, rejecting values that are not fully reduced.
    fn decode_scalar(bytes: &[u8; SCALAR_SIZE]) -> Option<Self::Scalar>;

    fn is_identity(point: &Self::Point) -> Choice {
        point.ct_eq(&Self::identity())
    }

    /// Samples a uniformly random scalar from the injected entropy source.
    fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self::Scalar, DleqError> {
        let mut wide = Zeroizing::new([0u8; 64]);
        rng.try_fill_bytes(wide.as_mut_slice()).map_err(|_| DleqError::RandomnessFailure)?;
        Ok(Self::scalar_from_wide(&wide))
    }

    /// Computes `Σ 2^i · points[i]` by doubling from the most significant term down.
    fn weighted_sum<'a, I>(points: I) -> Self::Point
    where
        I: DoubleEndedIterator<Item = &'a Self::Point>,
    {
        points.rev().fold(Self::identity(), |acc, point| acc + acc + *point)
    }

    /// Computes `Σ 2^i · scalars[i]` modulo the group order.
    fn weighted_scalar_sum<'a, I>(scalars: I) -> Self::Scalar
    where
        I: DoubleEndedIterator<Item = &'a Self::Scalar>,
    {
        scalars.rev().fold(Self::Scalar::default(), |acc, scalar| acc + acc + *scalar)
    }
}

/// `G` if `bit` is set, otherwise the identity. Does not branch on `bit`.
pub fn select_generator<C: DleqCurve>(bit: Choice) -> C::Point {
    C::Point::conditional_select(&C::identity(), &C::generator(), bit)
}

pub(crate) fn points_equal<C: DleqCurve>(a: &C::Point, b: &C::Point) -> bool {
    a.ct_eq(b).into()
}
