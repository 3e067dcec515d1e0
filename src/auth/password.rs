//! Password hashing and verification.
//!
//! Hashes are self-describing strings of the form
//! `sha256$<salt-hex>$<digest-hex>`: a fresh random salt per call, a SHA-256
//! digest of salt followed by the secret, and a literal algorithm tag so the
//! encoding round-trips exactly. Verification recomputes the digest and
//! compares in constant time; any malformed or unrecognized input verifies
//! false rather than erroring, so callers cannot distinguish "wrong password"
//! from "corrupt hash" through error type or timing.

use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const ALGORITHM_TAG: &str = "sha256";
const SALT_LEN_BYTES: usize = 16;

/// Hash a secret with a fresh random salt.
///
/// Two calls with the same secret yield different encoded strings (distinct
/// salts), both of which verify.
pub fn hash_password(secret: &str) -> String {
    let mut salt = [0u8; SALT_LEN_BYTES];
    OsRng.fill_bytes(&mut salt);
    let digest = digest(&salt, secret);
    format!("{ALGORITHM_TAG}${}${}", hex::encode(salt), hex::encode(digest))
}

/// Verify a secret against an encoded hash.
///
/// Returns false for wrong passwords and for anything that is not a
/// well-formed `sha256$salt$digest` string.
pub fn verify_password(secret: &str, encoded: &str) -> bool {
    let (salt, stored) = match parse(encoded) {
        Some(parts) => parts,
        None => return false,
    };
    let computed = digest(&salt, secret);
    // ConstantTimeEq on slices short-circuits only on length mismatch.
    computed.as_slice().ct_eq(stored.as_slice()).into()
}

fn digest(salt: &[u8], secret: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(secret.as_bytes());
    hasher.finalize().into()
}

fn parse(encoded: &str) -> Option<(Vec<u8>, Vec<u8>)> {
    let mut fields = encoded.split('$');
    let algo = fields.next()?;
    let salt_hex = fields.next()?;
    let digest_hex = fields.next()?;
    if fields.next().is_some() || algo != ALGORITHM_TAG {
        return None;
    }
    let salt = hex::decode(salt_hex).ok()?;
    let digest = hex::decode(digest_hex).ok()?;
    Some((salt, digest))
}
