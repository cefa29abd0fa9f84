use std::env;

#[derive(Debug, Clone, Copy)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        // bcrypt accepts 4..=31
        let bcrypt_cost = env::var("BCRYPT_COST")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|c| (4..=31).contains(c))
            .unwrap_or(bcrypt::DEFAULT_COST);

        Self { bcrypt_cost }
    }
}
