use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Razorpay credentials. The key secret doubles as the HMAC key for
    /// payment verification and must never be serialized into a response.
    pub razorpay_key_id: Option<String>,
    pub razorpay_key_secret: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let razorpay_key_id = env::var("RAZORPAY_KEY_ID").ok().filter(|v| !v.is_empty());
        let razorpay_key_secret = env::var("RAZORPAY_KEY_SECRET")
            .ok()
            .filter(|v| !v.is_empty());
        Ok(Self {
            database_url,
            host,
            port,
            razorpay_key_id,
            razorpay_key_secret,
        })
    }
}
