//! Hashing primitive contract and the bcrypt implementation
//!
//! The tuner never hashes anything itself. It drives a [`HashPrimitive`],
//! which must embed the cost it was given in every hash it produces and be
//! able to read that cost back.

use std::str::FromStr;

use bcrypt::HashParts;

use crate::{Error, Result};

/// Adaptive hash function with an integer work factor
///
/// Generation latency is assumed to grow with cost, roughly doubling per
/// step. The tuner relies on this when it extrapolates.
pub trait HashPrimitive: Send + Sync {
    /// Lowest accepted cost (inclusive)
    const MIN_COST: u32;

    /// Highest accepted cost (inclusive)
    const MAX_COST: u32;

    /// Hash `secret` with a fresh salt at `cost`
    fn generate(&self, secret: &[u8], cost: u32) -> Result<String>;

    /// Succeeds only if `hash` was produced from `secret`
    ///
    /// Returns [`Error::Mismatch`] for a well-formed hash of another secret
    /// and [`Error::MalformedHash`] when `hash` cannot be parsed.
    fn compare(&self, hash: &str, secret: &[u8]) -> Result<()>;

    /// Read the cost encoded in `hash`
    fn extract_cost(&self, hash: &str) -> Result<u32>;
}

/// bcrypt via the `bcrypt` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct Bcrypt;

impl HashPrimitive for Bcrypt {
    const MIN_COST: u32 = 4;
    const MAX_COST: u32 = 31;

    fn generate(&self, secret: &[u8], cost: u32) -> Result<String> {
        bcrypt::hash(secret, cost).map_err(|e| Error::Primitive(e.to_string()))
    }

    fn compare(&self, hash: &str, secret: &[u8]) -> Result<()> {
        match bcrypt::verify(secret, hash) {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::Mismatch),
            Err(e) => Err(Error::MalformedHash(e.to_string())),
        }
    }

    fn extract_cost(&self, hash: &str) -> Result<u32> {
        HashParts::from_str(hash)
            .map(|parts| parts.get_cost())
            .map_err(|e| Error::MalformedHash(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"012Abc!@#z";

    #[test]
    fn test_cost_round_trip() {
        for cost in [Bcrypt::MIN_COST, Bcrypt::MIN_COST + 1] {
            let hash = Bcrypt.generate(SECRET, cost).unwrap();
            assert_eq!(Bcrypt.extract_cost(&hash).unwrap(), cost);
        }
    }

    #[test]
    fn test_compare() {
        let hash = Bcrypt.generate(SECRET, Bcrypt::MIN_COST).unwrap();
        assert!(Bcrypt.compare(&hash, SECRET).is_ok());
        assert!(matches!(
            Bcrypt.compare(&hash, b"spaceballs"),
            Err(Error::Mismatch)
        ));
    }

    #[test]
    fn test_malformed_hash() {
        assert!(matches!(
            Bcrypt.extract_cost("012Abc!@#z"),
            Err(Error::MalformedHash(_))
        ));
        assert!(matches!(
            Bcrypt.compare("012Abc!@#z", SECRET),
            Err(Error::MalformedHash(_))
        ));
    }

    #[test]
    fn test_cost_out_of_range() {
        assert!(matches!(
            Bcrypt.generate(SECRET, Bcrypt::MIN_COST - 1),
            Err(Error::Primitive(_))
        ));
        assert!(matches!(
            Bcrypt.generate(SECRET, 0),
            Err(Error::Primitive(_))
        ));
    }
}
