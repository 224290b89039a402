use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    // Shared throttle counters (optional; throttling is disabled when unset)
    pub redis_url: Option<String>,
    pub throttle_max_requests: u32,
    pub throttle_window_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            redis_url: env::var("REDIS_URL").ok(),
            throttle_max_requests: env::var("THROTTLE_MAX_REQUESTS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),
            throttle_window_secs: env::var("THROTTLE_WINDOW_SECS")
                .unwrap_or_else(|_| "60".into())
                .parse()
                .unwrap_or(60),
        })
    }
}
