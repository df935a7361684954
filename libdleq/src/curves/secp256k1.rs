use super::{DleqCurve, SCALAR_SIZE};
use k256::elliptic_curve::group::GroupEncoding;
use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::{Field, PrimeField};
use k256::{CompressedPoint, FieldBytes, ProjectivePoint, Scalar, U256};
use std::sync::LazyLock;

/// The BIP-341 "nothing up my sleeve" point, `lift_x(sha256(G))`.
const BLINDING_GENERATOR_HEX: &str = "0250929b74c1a04954b78b4b6035e97a5e078a5a0f28ec96d547bfee9ace803ac0";

static BLINDING_GENERATOR: LazyLock<ProjectivePoint> = LazyLock::new(|| {
    let mut bytes = [0u8; 33];
    hex::decode_to_slice(BLINDING_GENERATOR_HEX, &mut bytes).expect("Hardcoded secp256k1 generator is not valid hex");
    Secp256k1::decode_point(&bytes).expect("Hardcoded secp256k1 generator is not a valid point")
});

/// 2^256 mod n, used to fold the high half of a wide integer back into the field.
static TWO_POW_256: LazyLock<Scalar> = LazyLock::new(|| {
    let two_pow_64 = Scalar::from(u64::MAX) + Scalar::ONE;
    two_pow_64.square().square()
});

/// The secp256k1 group, as used for Bitcoin and Ethereum keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Secp256k1;

impl DleqCurve for Secp256k1 {
    type Scalar = Scalar;
    type Point = ProjectivePoint;

    const ID: &'static [u8] = b"secp256k1";
    const POINT_SIZE: usize = 33;

    fn generator() -> ProjectivePoint {
        ProjectivePoint::GENERATOR
    }

    fn blinding_generator() -> ProjectivePoint {
        *BLINDING_GENERATOR
    }

    fn identity() -> ProjectivePoint {
        ProjectivePoint::IDENTITY
    }

    fn scalar_one() -> Scalar {
        Scalar::ONE
    }

    fn reduce(le_bytes: &[u8; SCALAR_SIZE]) -> Scalar {
        let mut be = *le_bytes;
        be.reverse();
        <Scalar as Reduce<U256>>::reduce_bytes(&FieldBytes::from(be))
    }

    fn scalar_from_wide(le_bytes: &[u8; 64]) -> Scalar {
        let mut low = [0u8; SCALAR_SIZE];
        let mut high = [0u8; SCALAR_SIZE];
        low.copy_from_slice(&le_bytes[..32]);
        high.copy_from_slice(&le_bytes[32..]);
        Self::reduce(&high) * *TWO_POW_256 + Self::reduce(&low)
    }

    fn encode_point(point: &ProjectivePoint) -> Vec<u8> {
        point.to_affine().to_bytes().to_vec()
    }

    fn decode_point(bytes: &[u8]) -> Result<ProjectivePoint, &'static str> {
        if bytes.len() != Self::POINT_SIZE {
            return Err("a compressed secp256k1 point is exactly 33 bytes");
        }
        let repr = CompressedPoint::clone_from_slice(bytes);
        let point: ProjectivePoint =
            Option::from(ProjectivePoint::from_bytes(&repr)).ok_or("not a point on secp256k1")?;
        if bool::from(Self::is_identity(&point)) {
            return Err("the identity point is not allowed");
        }
        Ok(point)
    }

    fn encode_scalar(scalar: &Scalar) -> [u8; SCALAR_SIZE] {
        scalar.to_bytes().into()
    }

    fn decode_scalar(bytes: &[u8; SCALAR_SIZE]) -> Option<Scalar> {
        Option::from(Scalar::from_repr(FieldBytes::from(*bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_reduction_matches_field_arithmetic() {
        // 2^256 + 5, little-endian
        let mut wide = [0u8; 64];
        wide[0] = 5;
        wide[32] = 1;
        let expected = *TWO_POW_256 + Scalar::from(5u64);
        assert_eq!(Secp256k1::scalar_from_wide(&wide), expected);
    }

    #[test]
    fn two_pow_256_is_the_order_complement() {
        let mut be = [0u8; 32];
        hex::decode_to_slice("000000000000000000000000000000014551231950b75fc4402da1732fc9bebf", &mut be).unwrap();
        assert_eq!(*TWO_POW_256, Scalar::from_repr(FieldBytes::from(be)).unwrap());
    }

    #[test]
    fn reduce_reads_little_endian() {
        let mut le = [0u8; 32];
        le[0] = 0x01;
        le[1] = 0x02;
        assert_eq!(Secp256k1::reduce(&le), Scalar::from(0x0201u64));
    }

    #[test]
    fn rejects_uncompressed_and_off_curve_points() {
        let mut bytes = Secp256k1::encode_point(&Secp256k1::generator());
        bytes[0] = 0x04;
        assert!(Secp256k1::decode_point(&bytes).is_err());
        // x = 2^256 - 1 is larger than the field modulus
        let mut off_curve = [0xffu8; 33];
        off_curve[0] = 0x02;
        assert!(Secp256k1::decode_point(&off_curve).is_err());
    }

    #[test]
    fn blinding_generator_is_nums_point() {
        let h = Secp256k1::blinding_generator();
        assert_eq!(hex::encode(Secp256k1::encode_point(&h)), BLINDING_GENERATOR_HEX);
    }
}
