use anyhow::{Context, Result};

/// Hash a password using bcrypt with the given cost factor.
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost).context("Failed to hash password")
}

/// Verify a password against a stored bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).context("Failed to verify password")
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: &str, cost: u32) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .context("password hashing task failed")?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(password: &str, hash: &str) -> Result<bool> {
    let (password, hash) = (password.to_owned(), hash.to_owned());
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .context("password verification task failed")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    const TEST_COST: u32 = 4;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("pw123", TEST_COST).unwrap();
        assert!(verify_password("pw123", &hash).unwrap());
        assert!(!verify_password("pw124", &hash).unwrap());
    }

    #[test]
    fn hash_never_contains_raw_password() {
        let hash = hash_password("correct horse battery", TEST_COST).unwrap();
        assert!(!hash.contains("correct horse battery"));
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn salted_hashes_differ() {
        let hash1 = hash_password("same_password", TEST_COST).unwrap();
        let hash2 = hash_password("same_password", TEST_COST).unwrap();
        assert_ne!(hash1, hash2);
        assert!(verify_password("same_password", &hash1).unwrap());
        assert!(verify_password("same_password", &hash2).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("pw", "not-a-bcrypt-hash").is_err());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn verify_leaves_the_runtime_free() {
        let hash = hash_password("pw123", 8).unwrap();
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = {
            let ticks = ticks.clone();
            tokio::spawn(async move {
                loop {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                }
            })
        };

        assert!(verify_password_blocking("pw123", &hash).await.unwrap());
        assert!(!verify_password_blocking("pw124", &hash).await.unwrap());
        ticker.abort();

        // A single-threaded runtime only ticks if bcrypt ran elsewhere.
        assert!(ticks.load(Ordering::SeqCst) > 0);
    }

    #[tokio::test]
    async fn blocking_hash_round_trips() {
        let hash = hash_password_blocking("pw123", TEST_COST).await.unwrap();
        assert!(verify_password("pw123", &hash).unwrap());
    }
}
