//! Service configuration read from the environment.

use std::env;

use crate::models::CompanyDetails;

const DEFAULT_DATABASE_URL: &str = "postgres://docker:pg@0.0.0.0/runs";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    /// Served verbatim from `/company_details`.
    pub company: CompanyDetails,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            port: DEFAULT_PORT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            company: CompanyDetails {
                company_name: "Run Tracker".to_string(),
                slogan: "Every kilometer counts".to_string(),
                contacts: "Moscow".to_string(),
            },
        }
    }
}

impl Config {
    /// Reads the environment, loading a `.env` file first when one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            port: parse_var("PORT", defaults.port)?,
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            company: CompanyDetails {
                company_name: env::var("COMPANY_NAME").unwrap_or(defaults.company.company_name),
                slogan: env::var("COMPANY_SLOGAN").unwrap_or(defaults.company.slogan),
                contacts: env::var("COMPANY_CONTACTS").unwrap_or(defaults.company.contacts),
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
