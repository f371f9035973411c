/// Password hashing and verification using bcrypt
use api_error::Result;

/// Work factor. Each unit doubles the cost of an offline guess.
const HASH_COST: u32 = 10;

/// Hash a plaintext password with a fresh random salt.
///
/// One-way by construction: the plaintext is never reconstructable and never
/// stored. Hashing on registration is the only mutating use.
pub fn hash_password(password: &str) -> Result<String> {
    Ok(bcrypt::hash(password, HASH_COST)?)
}

/// Compare a plaintext password against a stored hash.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    Ok(bcrypt::verify(password, password_hash)?)
}
