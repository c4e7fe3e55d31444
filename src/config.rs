use dotenvy::dotenv;
use log::info;
use std::env;
use std::path::PathBuf;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    /// Directory holding the users and tweets documents.
    pub data_dir: PathBuf,
    pub bcrypt_cost: u32,
    pub workers: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let server_host = get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let server_port = parse_or(&get, "SERVER_PORT", 8080)?;
        let data_dir = get("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./database"));
        let bcrypt_cost = parse_or(&get, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(AppError::Config(format!(
                "BCRYPT_COST must be between 4 and 31, got {}",
                bcrypt_cost
            )));
        }
        let workers = parse_or(&get, "WORKERS", num_cpus::get())?;
        if workers == 0 {
            return Err(AppError::Config("WORKERS must be at least 1".to_string()));
        }

        info!("Configuration loaded, data directory {}", data_dir.display());
        Ok(Self {
            server_host,
            server_port,
            data_dir,
            bcrypt_cost,
            workers,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
        None => Ok(default),
    }
}
