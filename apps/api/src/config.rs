use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub admin_username: String,
    pub admin_password: String,
    /// Vector search service for company knowledge. `None` → static company profile.
    pub knowledge_search_url: Option<String>,
    pub knowledge_company_id: String,
    pub chat_history_ttl_secs: u64,
    pub hr_contact_email: String,
    pub hr_contact_phone: String,
    pub seed_sample_jobs: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            admin_username: require_env("ADMIN_USERNAME")?,
            admin_password: require_env("ADMIN_PASSWORD")?,
            knowledge_search_url: std::env::var("KNOWLEDGE_SEARCH_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            knowledge_company_id: std::env::var("KNOWLEDGE_COMPANY_ID")
                .unwrap_or_else(|_| "default_company".to_string()),
            chat_history_ttl_secs: std::env::var("CHAT_HISTORY_TTL_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse::<u64>()
                .context("CHAT_HISTORY_TTL_SECS must be a number of seconds")?,
            hr_contact_email: std::env::var("HR_CONTACT_EMAIL")
                .unwrap_or_else(|_| "hr@syscraftonline.com".to_string()),
            hr_contact_phone: std::env::var("HR_CONTACT_PHONE")
                .unwrap_or_else(|_| "+91 76949-29672".to_string()),
            seed_sample_jobs: parse_flag(std::env::var("SEED_SAMPLE_JOBS").ok().as_deref(), true),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

#[cfg(test)]
impl Config {
    /// Config with placeholder values for tests that never touch external services.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/frontdesk_test".to_string(),
            redis_url: "redis://127.0.0.1/".to_string(),
            s3_bucket: "frontdesk-test".to_string(),
            s3_endpoint: "http://127.0.0.1:9000".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            anthropic_api_key: "test".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "secret".to_string(),
            knowledge_search_url: None,
            knowledge_company_id: "default_company".to_string(),
            chat_history_ttl_secs: 60,
            hr_contact_email: "hr@example.com".to_string(),
            hr_contact_phone: "+91 00000-00000".to_string(),
            seed_sample_jobs: false,
            port: 0,
            rust_log: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_accepts_common_spellings() {
        assert!(parse_flag(Some("TRUE"), false));
        assert!(parse_flag(Some(" 1 "), false));
        assert!(!parse_flag(Some("off"), true));
        assert!(!parse_flag(Some("no"), true));
    }

    #[test]
    fn test_parse_flag_falls_back_to_default() {
        assert!(parse_flag(None, true));
        assert!(!parse_flag(Some("maybe"), false));
    }
}
