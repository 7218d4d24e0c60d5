use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub session_duration_hours: i64,
    pub razorpay_base_url: String,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
    pub razorpay_webhook_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://workdesk.db?mode=rwc".to_string());

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let session_duration_hours = env::var("SESSION_DURATION_HOURS")
            .unwrap_or_else(|_| "9".to_string())
            .parse()
            .unwrap_or(9);

        let razorpay_base_url = env::var("RAZORPAY_BASE_URL")
            .unwrap_or_else(|_| "https://api.razorpay.com".to_string());

        let razorpay_key_id =
            env::var("RAZORPAY_KEY_ID").map_err(|_| ConfigError::MissingRazorpayKeyId)?;

        let razorpay_key_secret =
            env::var("RAZORPAY_KEY_SECRET").map_err(|_| ConfigError::MissingRazorpayKeySecret)?;

        let razorpay_webhook_secret = env::var("RAZORPAY_WEBHOOK_SECRET")
            .map_err(|_| ConfigError::MissingRazorpayWebhookSecret)?;

        Ok(Config {
            database_url,
            server_host,
            server_port,
            session_duration_hours,
            razorpay_base_url,
            razorpay_key_id,
            razorpay_key_secret,
            razorpay_webhook_secret,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("RAZORPAY_KEY_ID environment variable not set")]
    MissingRazorpayKeyId,

    #[error("RAZORPAY_KEY_SECRET environment variable not set")]
    MissingRazorpayKeySecret,

    #[error("RAZORPAY_WEBHOOK_SECRET environment variable not set")]
    MissingRazorpayWebhookSecret,

    #[error("Invalid port number")]
    InvalidPort,
}
