use super::parse_bool_env;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitRule {
    const fn new(per_second: u64, burst_size: u32) -> Self {
        Self {
            per_second,
            burst_size,
        }
    }
}

/// Route groups that get their own governor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Auth,
    Citizen,
    Admin,
}

impl Group {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "auth" => Some(Group::Auth),
            "citizen" | "user" | "protected" => Some(Group::Citizen),
            "admin" => Some(Group::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub auth: RateLimitRule,
    pub citizen: RateLimitRule,
    pub admin: RateLimitRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth: RateLimitRule::new(5, 10),
            citizen: RateLimitRule::new(10, 20),
            admin: RateLimitRule::new(20, 40),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.enabled = parse_bool_env("RATE_LIMIT_ENABLED", cfg.enabled);

        if let Ok(raw) = env::var("RATE_LIMIT_CONFIG") {
            if let Err(err) = cfg.apply(&raw) {
                tracing::warn!("Invalid RATE_LIMIT_CONFIG '{}': {}", raw, err);
            }
        }

        cfg
    }

    /// Apply either a global `per:burst` rule or `group=per:burst,...` overrides.
    /// Nothing is changed when any item is invalid.
    fn apply(&mut self, raw: &str) -> Result<(), String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("empty value".to_string());
        }

        if !trimmed.contains('=') {
            let rule = parse_rule(trimmed)?;
            self.auth = rule;
            self.citizen = rule;
            self.admin = rule;
            return Ok(());
        }

        let mut overrides = Vec::new();
        for item in trimmed.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            let (name, raw_rule) = item
                .split_once('=')
                .ok_or_else(|| format!("invalid item '{}', expected name=per:burst", item))?;
            let group = Group::parse(name)
                .ok_or_else(|| format!("unknown group '{}', expected auth/citizen/admin", name))?;
            overrides.push((group, parse_rule(raw_rule.trim())?));
        }

        for (group, rule) in overrides {
            match group {
                Group::Auth => self.auth = rule,
                Group::Citizen => self.citizen = rule,
                Group::Admin => self.admin = rule,
            }
        }
        Ok(())
    }
}

fn parse_rule(raw: &str) -> Result<RateLimitRule, String> {
    let (per_second_raw, burst_raw) = raw
        .split_once(':')
        .ok_or_else(|| format!("invalid rule '{}', expected per:burst", raw))?;

    let per_second: u64 = per_second_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid per_second '{}'", per_second_raw.trim()))?;
    let burst_size: u32 = burst_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid burst_size '{}'", burst_raw.trim()))?;

    if per_second == 0 || burst_size == 0 {
        return Err("per_second and burst_size must be > 0".to_string());
    }

    Ok(RateLimitRule::new(per_second, burst_size))
}
