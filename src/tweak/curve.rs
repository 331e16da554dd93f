use bitcoin::secp256k1::{
    self, Parity, PublicKey, Scalar, Secp256k1, VerifyOnly, XOnlyPublicKey,
};

use crate::{
    constants::COMPRESSED_PUBKEY_SIZE,
    error::{Error, Result},
};

/// The point arithmetic the scan tweak protocol needs.
///
/// Protocol code only ever goes through this trait, so the engine behind it
/// can be replaced without touching tweak computation.
pub trait CurveArithmetic {
    type Point: Clone + Send;

    /// Parses a 33 byte compressed point.
    fn parse_compressed(&self, bytes: &[u8]) -> Option<Self::Point>;

    /// Lifts an x coordinate to the point with even y.
    fn lift_x_even(&self, x: &[u8; 32]) -> Option<Self::Point>;

    /// Sums `points`. Returns `None` for an empty slice or when the sum is
    /// the point at infinity.
    fn add_points(&self, points: &[Self::Point]) -> Option<Self::Point>;

    /// Multiplies `point` by the big-endian scalar `scalar`.
    fn mul_scalar(&self, point: &Self::Point, scalar: &[u8; 32]) -> Result<Self::Point>;

    fn compress(&self, point: &Self::Point) -> [u8; COMPRESSED_PUBKEY_SIZE];
}

/// [`CurveArithmetic`] backed by libsecp256k1.
#[derive(Debug, Clone)]
pub struct Secp256k1Curve {
    secp: Secp256k1<VerifyOnly>,
}

impl Secp256k1Curve {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::verification_only(),
        }
    }
}

impl Default for Secp256k1Curve {
    fn default() -> Self {
        Self::new()
    }
}

impl CurveArithmetic for Secp256k1Curve {
    type Point = PublicKey;

    fn parse_compressed(&self, bytes: &[u8]) -> Option<PublicKey> {
        if bytes.len() != COMPRESSED_PUBKEY_SIZE {
            return None;
        }
        PublicKey::from_slice(bytes).ok()
    }

    fn lift_x_even(&self, x: &[u8; 32]) -> Option<PublicKey> {
        XOnlyPublicKey::from_slice(x)
            .ok()
            .map(|xonly| PublicKey::from_x_only_public_key(xonly, Parity::Even))
    }

    fn add_points(&self, points: &[PublicKey]) -> Option<PublicKey> {
        if points.is_empty() {
            return None;
        }
        let refs: Vec<&PublicKey> = points.iter().collect();
        PublicKey::combine_keys(&refs).ok()
    }

    fn mul_scalar(&self, point: &PublicKey, scalar: &[u8; 32]) -> Result<PublicKey> {
        let scalar = Scalar::from_be_bytes(*scalar)
            .map_err(|_| Error::Secp256k1(secp256k1::Error::InvalidTweak))?;
        Ok(point.mul_tweak(&self.secp, &scalar)?)
    }

    fn compress(&self, point: &PublicKey) -> [u8; COMPRESSED_PUBKEY_SIZE] {
        point.serialize()
    }
}
