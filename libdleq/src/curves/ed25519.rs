use super::{DleqCurve, SCALAR_SIZE};
use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::traits::{Identity, IsIdentity};
use curve25519_dalek::Scalar;
use std::sync::LazyLock;

/// Monero's `H`, the Pedersen blinding generator used for RingCT amounts.
const BLINDING_GENERATOR_HEX: &str = "8b655970153799af2aeadc9ff1add0ea6c7251d54154cfa92c173a0dd39c1f94";

static BLINDING_GENERATOR: LazyLock<EdwardsPoint> = LazyLock::new(|| {
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(BLINDING_GENERATOR_HEX, &mut bytes).expect("Hardcoded Ed25519 generator is not valid hex");
    Ed25519::decode_point(&bytes).expect("Hardcoded Ed25519 generator is not a valid point")
});

/// The Ed25519 group (prime-order subgroup of Curve25519), as used for Monero keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ed25519;

impl DleqCurve for Ed25519 {
    type Scalar = Scalar;
    type Point = EdwardsPoint;

    const ID: &'static [u8] = b"ed25519";
    const POINT_SIZE: usize = 32;

    fn generator() -> EdwardsPoint {
        ED25519_BASEPOINT_POINT
    }

    fn blinding_generator() -> EdwardsPoint {
        *BLINDING_GENERATOR
    }

    fn identity() -> EdwardsPoint {
        EdwardsPoint::identity()
    }

    fn scalar_one() -> Scalar {
        Scalar::ONE
    }

    fn reduce(le_bytes: &[u8; SCALAR_SIZE]) -> Scalar {
        Scalar::from_bytes_mod_order(*le_bytes)
    }

    fn scalar_from_wide(le_bytes: &[u8; 64]) -> Scalar {
        Scalar::from_bytes_mod_order_wide(le_bytes)
    }

    fn encode_point(point: &EdwardsPoint) -> Vec<u8> {
        point.compress().to_bytes().to_vec()
    }

    fn decode_point(bytes: &[u8]) -> Result<EdwardsPoint, &'static str> {
        let repr: [u8; 32] = bytes.try_into().map_err(|_| "an Ed25519 point is exactly 32 bytes")?;
        let point = CompressedEdwardsY(repr).decompress().ok_or("not a point on Ed25519")?;
        if point.compress().to_bytes() != repr {
            return Err("non-canonical Ed25519 point encoding");
        }
        if point.is_identity() {
            return Err("the identity point is not allowed");
        }
        if !point.is_torsion_free() {
            return Err("point is not in the prime-order subgroup");
        }
        Ok(point)
    }

    fn encode_scalar(scalar: &Scalar) -> [u8; SCALAR_SIZE] {
        scalar.to_bytes()
    }

    fn decode_scalar(bytes: &[u8; SCALAR_SIZE]) -> Option<Scalar> {
        Option::from(Scalar::from_canonical_bytes(*bytes))
    }
}
