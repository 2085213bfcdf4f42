use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub db: DbConfig,
    pub forecast: ForecastConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub request_timeout_secs: u64,
}
impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig { pub url: String }

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    /// Upper bound on rows fetched per table per request.
    pub fetch_limit: i64,
    /// Days-ahead applied when a historical request omits it.
    pub default_days_ahead: u32,
    /// "HH:MM" cutoff applied when a historical request omits it.
    pub default_cutoff: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("LFS__").split("__"));
        Ok(figment.extract()?)
    }
}
