use std::env;

use anyhow::Context;
use config::{Config, Environment, File};
use dotenvy::dotenv;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_port: String,
    pub transition_policy: String,
    pub authors: AuthorsSettings,
}

/// Connection and resilience settings for the authors service client.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorsSettings {
    pub base_url: String,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_ms: u64,
}

impl Settings {
    /// Layered configuration: baked-in defaults, then `config/default`,
    /// then `config/{RUN_MODE}`, then `APP_`-prefixed environment
    /// variables (`__` separates nesting, e.g. `APP_AUTHORS__BASE_URL`).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        let run_mode = load_env("RUN_MODE", "development");

        let s = Config::builder()
            .set_default("server_port", "3002")?
            .set_default("transition_policy", "default")?
            .set_default("authors.base_url", "http://localhost:3001")?
            .set_default("authors.max_retries", 3_i64)?
            .set_default("authors.retry_delay_ms", 1000_i64)?
            .set_default("authors.timeout_ms", 5000_i64)?
            .add_source(File::with_name("./config/default").required(false))
            .add_source(File::with_name(&format!("./config/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("app").separator("__"))
            .build()?;

        s.try_deserialize().with_context(|| "failed to read config")
    }
}

fn load_env(key: &str, default_value: &'static str) -> String {
    env::var(key).unwrap_or_else(|_| default_value.into())
}
