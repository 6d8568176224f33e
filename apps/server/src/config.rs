use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{bail, Context};
use axum::http::HeaderValue;
use stockpile_core::stockpile::AverageRoundPrice;

use crate::auth::decode_secret_key;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub jwt_secret: Vec<u8>,
    pub average_round_price: AverageRoundPrice,
    /// JSON file of products upserted at startup.
    pub catalog_seed: Option<PathBuf>,
    /// `None` disables the recurring allocation scheduler.
    pub scheduler_interval: Option<Duration>,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = env_or("STOCKPILE_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid STOCKPILE_LISTEN_ADDR")?;
        let db_path = env_or("STOCKPILE_DB_PATH", "./db/stockpile.db");

        let cors_allow: Vec<String> = env_or("STOCKPILE_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in cors_allow.iter().filter(|o| o.as_str() != "*") {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid origin '{}' in STOCKPILE_CORS_ALLOW_ORIGINS", origin))?;
        }

        let timeout_ms: u64 = env_or("STOCKPILE_REQUEST_TIMEOUT_MS", "30000")
            .parse()
            .context("Invalid STOCKPILE_REQUEST_TIMEOUT_MS")?;

        let Ok(raw_secret) = std::env::var("STOCKPILE_JWT_SECRET") else {
            bail!("STOCKPILE_JWT_SECRET must be set");
        };
        let jwt_secret = decode_secret_key(&raw_secret)?;

        let average_round_price = env_or("STOCKPILE_AVG_ROUND_PRICE", "0.5")
            .parse::<AverageRoundPrice>()
            .context("Invalid STOCKPILE_AVG_ROUND_PRICE")?;

        let catalog_seed = std::env::var("STOCKPILE_CATALOG_SEED")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let scheduler_secs: u64 = env_or("STOCKPILE_SCHEDULER_INTERVAL_SECS", "3600")
            .parse()
            .context("Invalid STOCKPILE_SCHEDULER_INTERVAL_SECS")?;

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            jwt_secret,
            average_round_price,
            catalog_seed,
            scheduler_interval: (scheduler_secs > 0).then(|| Duration::from_secs(scheduler_secs)),
        })
    }
}
