use sha2::Digest;
use sha2::Sha256;

/// Lowercase hex SHA-256 digest of an opaque token.
///
/// Stores persist the fingerprint and look tokens up by it, so a leaked
/// table does not hand out usable credentials. Opaque tokens carry enough
/// entropy that an unsalted digest is sufficient.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}
