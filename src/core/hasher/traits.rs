//! Trait definitions for perceptual signatures.

use crate::error::HashError;
use image::DynamicImage;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Cells per side of the luminance grid
pub const GRID_SIZE: u32 = 8;

/// Width of every signature produced in a scan
pub const SIGNATURE_BITS: u32 = GRID_SIZE * GRID_SIZE;

/// Bumped whenever the grid size or bit rule changes. Signatures from
/// different versions must never be compared.
pub const SIGNATURE_VERSION: u32 = 1;

/// A fixed-width 64-bit perceptual signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PerceptualSignature(u64);

impl PerceptualSignature {
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Hamming distance: the number of bits that differ
    pub fn distance(&self, other: &Self) -> u32 {
        (self.0 ^ other.0).count_ones()
    }

    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 16 {
            return None;
        }
        u64::from_str_radix(hex, 16).ok().map(Self)
    }
}

impl std::fmt::Display for PerceptualSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for PerceptualSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PerceptualSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid signature: {hex}")))
    }
}

/// Computes a perceptual signature from a decoded image
pub trait SignatureAlgorithm: Send + Sync {
    fn hash_image(&self, image: &DynamicImage) -> Result<PerceptualSignature, HashError>;

    /// Short name used in reports
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        let sig = PerceptualSignature::from_bits(0xFF00_AA55_1234_5678);
        assert_eq!(sig.distance(&sig), 0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = PerceptualSignature::from_bits(0xFF00);
        let b = PerceptualSignature::from_bits(0x00FF);
        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn distance_counts_differing_bits() {
        let a = PerceptualSignature::from_bits(u64::MAX);
        let b = PerceptualSignature::from_bits(0);
        assert_eq!(a.distance(&b), 64);
    }

    #[test]
    fn hex_is_zero_padded() {
        let sig = PerceptualSignature::from_bits(0xDEAD);
        assert_eq!(sig.to_hex(), "000000000000dead");
        assert_eq!(PerceptualSignature::from_hex("000000000000dead"), Some(sig));
        assert_eq!(PerceptualSignature::from_hex("dead"), None);
    }

    #[test]
    fn serializes_as_hex_string() {
        let sig = PerceptualSignature::from_bits(1);
        let json = serde_json::to_string(&sig).unwrap();
        assert_eq!(json, "\"0000000000000001\"");
        let back: PerceptualSignature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sig);
    }
}
