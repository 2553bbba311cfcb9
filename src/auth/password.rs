use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Constant-time check of `plain` against a stored PHC hash string.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_password_verifies_against_its_hash() {
        let hash = hash_password("p").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("p", &hash).expect("verify"));
    }

    #[test]
    fn two_accounts_with_one_password_store_different_hashes() {
        let alice = hash_password("shared").unwrap();
        let bob = hash_password("shared").unwrap();
        assert_ne!(alice, bob);
        assert!(verify_password("shared", &alice).unwrap());
        assert!(verify_password("shared", &bob).unwrap());
    }

    #[test]
    fn near_miss_password_is_refused() {
        let hash = hash_password("p").expect("hash");
        assert!(!verify_password("P", &hash).expect("verify"));
        assert!(!verify_password("p ", &hash).expect("verify"));
    }

    #[test]
    fn stored_plaintext_is_not_a_usable_hash() {
        assert!(verify_password("p", "p").is_err());
    }
}
