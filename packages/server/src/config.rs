use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub reddit_subreddits: Vec<String>,
    pub web3career_api_token: String,
    pub vapid_subject: String,
    pub vapid_private_pem: String,
    pub fcm_server_key: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            reddit_subreddits: env::var("REDDIT_SUBREDDITS")
                .unwrap_or_else(|_| "forhire,jobbit".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            web3career_api_token: env::var("WEB3CAREER_API_TOKEN")
                .context("WEB3CAREER_API_TOKEN must be set")?,
            vapid_subject: env::var("VAPID_SUBJECT")
                .unwrap_or_else(|_| "mailto:admin@codebuilder.org".to_string()),
            vapid_private_pem: env::var("VAPID_PRIVATE_PEM")
                .context("VAPID_PRIVATE_PEM must be set")?,
            fcm_server_key: env::var("FCM_SERVER_KEY").context("FCM_SERVER_KEY must be set")?,
        })
    }
}
