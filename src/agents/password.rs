use argon2::Argon2;
use base64ct::{Base64, Encoding};
use rand::{rngs::OsRng, RngCore};
use tracing::error;

/// Raw salt bytes drawn per agent; stored Base64-encoded.
pub const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

pub fn generate_salt() -> anyhow::Result<String> {
    let mut bytes = [0u8; SALT_LEN];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        error!(error = %e, "os rng failure");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Base64::encode_string(&bytes))
}

/// Derive the stored hash for `plain` under `salt`.
///
/// The result depends only on the two inputs, so verification re-derives it
/// and compares.
pub fn derive_hash(plain: &str, salt: &str) -> anyhow::Result<String> {
    let mut out = [0u8; HASH_LEN];
    Argon2::default()
        .hash_password_into(plain.as_bytes(), salt.as_bytes(), &mut out)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password_into error");
            anyhow::anyhow!(e.to_string())
        })?;
    Ok(Base64::encode_string(&out))
}

pub fn verify_password(plain: &str, salt: &str, expected_hash: &str) -> anyhow::Result<bool> {
    Ok(derive_hash(plain, salt)? == expected_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let salt = generate_salt().expect("salt");
        let hash = derive_hash("Secur3P@ssw0rd!", &salt).expect("hashing should succeed");
        assert!(verify_password("Secur3P@ssw0rd!", &salt, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let salt = generate_salt().expect("salt");
        let hash = derive_hash("correct-horse-battery-staple", &salt).unwrap();
        assert!(!verify_password("wrong-password", &salt, &hash).unwrap());
    }

    #[test]
    fn derivation_is_deterministic_and_never_plaintext() {
        let a = derive_hash("pw", "c2FsdHNhbHRzYWx0c2FsdA==").unwrap();
        let b = derive_hash("pw", "c2FsdHNhbHRzYWx0c2FsdA==").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, "pw");
    }

    #[test]
    fn same_password_different_salts_differ() {
        let s1 = generate_salt().unwrap();
        let s2 = generate_salt().unwrap();
        assert_ne!(s1, s2);
        assert_ne!(derive_hash("pw", &s1).unwrap(), derive_hash("pw", &s2).unwrap());
    }

    #[test]
    fn salt_is_fixed_length_text() {
        let salt = generate_salt().unwrap();
        assert_eq!(salt.len(), 24);
        assert_eq!(Base64::decode_vec(&salt).unwrap().len(), SALT_LEN);
    }

    #[test]
    fn short_salt_is_an_error() {
        let err = derive_hash("pw", "abc").unwrap_err();
        assert!(!err.to_string().is_empty());
    }
}
