use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

pub const MIN_LEN: usize = 6;

/// Argon2id, 19MB memory, 2 iterations, parallelism 1.
fn hasher() -> Result<Argon2<'static>, String> {
    let params = Params::new(19 * 1024, 2, 1, None).map_err(|e| format!("Invalid params: {e}"))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

pub fn hash(senha: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()?
        .hash_password(senha.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| format!("Hashing failed: {e}"))
}

/// Parameters are read back from the stored PHC string.
pub fn verify(senha: &str, stored: &str) -> Result<bool, String> {
    let parsed = PasswordHash::new(stored).map_err(|e| format!("Invalid hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(senha.as_bytes(), &parsed)
        .is_ok())
}

pub fn check_length(senha: &str) -> Result<(), String> {
    if senha.chars().count() < MIN_LEN {
        return Err(format!("Password must be at least {MIN_LEN} characters"));
    }
    Ok(())
}
