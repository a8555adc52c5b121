use actix_web::web;
use pbkdf2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::{Params, Pbkdf2};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::errors::Error;

const KEY_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;
const RESET_TOKEN_BYTES: usize = 32;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash un mot de passe avec PBKDF2-HMAC-SHA256 (format PHC)
/// Format: $pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>
pub fn hash_password(password: &str, rounds: u32) -> Result<String, String> {
    // Générer un salt aléatoire de 16 bytes
    let mut salt = [0u8; SALT_LENGTH];
    OsRng.fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|e| format!("Invalid salt: {}", e))?;

    let params = Params {
        rounds,
        output_length: KEY_LENGTH,
    };

    Pbkdf2
        .hash_password_customized(password.as_bytes(), None, None, params, &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| format!("Failed to hash password: {}", e))
}

/// Vérifie un mot de passe contre un hash PHC
/// Les itérations sont lues dans le hash; la comparaison est en temps constant
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, String> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| format!("Invalid hash format: {}", e))?;

    match Pbkdf2.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(format!("Password verification error: {}", e)),
    }
}

/// Version async de hash_password, exécutée sur le pool bloquant d'actix
pub async fn hash_password_blocking(password: String, rounds: u32) -> Result<String, Error> {
    web::block(move || hash_password(&password, rounds))
        .await?
        .map_err(Error::internal)
}

/// Version async de verify_password, exécutée sur le pool bloquant d'actix
pub async fn verify_password_blocking(password: String, stored_hash: String) -> Result<bool, Error> {
    web::block(move || verify_password(&password, &stored_hash))
        .await?
        .map_err(Error::internal)
}

/// Génère un token de reset : 32 bytes aléatoires (OS) encodés en hexadécimal
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUNDS: u32 = 1_000;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret1", ROUNDS).unwrap();

        assert!(hash.starts_with("$pbkdf2-sha256$"));
        assert!(hash.contains("i=1000"));
        assert!(!hash.contains("secret1"));
        assert!(verify_password("secret1", &hash).unwrap());
        assert!(!verify_password("secret2", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_hashes() {
        let hash1 = hash_password("same_password", ROUNDS).unwrap();
        let hash2 = hash_password("same_password", ROUNDS).unwrap();

        // Salt différent à chaque fois
        assert_ne!(hash1, hash2);
        assert!(verify_password("same_password", &hash1).unwrap());
        assert!(verify_password("same_password", &hash2).unwrap());
    }

    #[test]
    fn test_rounds_are_read_from_hash() {
        let hash = hash_password("secret1", 2_000).unwrap();
        assert!(hash.contains("i=2000"));
        assert!(verify_password("secret1", &hash).unwrap());
    }

    #[test]
    fn test_invalid_hash_format() {
        assert!(verify_password("secret1", "not-a-hash").is_err());
    }

    #[test]
    fn test_generate_reset_token() {
        let token1 = generate_reset_token();
        let token2 = generate_reset_token();

        assert_ne!(token1, token2);
        assert_eq!(token1.len(), 64);
        assert!(token1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[actix_web::test]
    async fn test_blocking_helpers() {
        let hash = hash_password_blocking("secret1".to_string(), ROUNDS).await.unwrap();
        assert!(verify_password_blocking("secret1".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password_blocking("wrong".to_string(), hash).await.unwrap());
    }
}
