use log::warn;
use std::env;
use std::time::Duration;

use crate::models::LoginCredentials;

const DEFAULT_DATABASE_URL: &str = "sqlite:./app.db";
const DEFAULT_LOGIN_URL: &str = "http://localhost:5000/api/admin/login";
const DEFAULT_ADMIN_EMAIL: &str = "admin@local.test";
const DEFAULT_ADMIN_PASSWORD: &str = "adminpass";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    pub database_url: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl ArchiveConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub url: String,
    pub email: String,
    pub password: String,
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_LOGIN_URL.to_string(),
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ProbeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let timeout = match lookup("LOGIN_PROBE_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(
                        "Ignoring LOGIN_PROBE_TIMEOUT_SECS={:?}, using {}s",
                        raw, DEFAULT_TIMEOUT_SECS
                    );
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        Self {
            url: lookup("ADMIN_LOGIN_URL").unwrap_or(defaults.url),
            email: lookup("ADMIN_EMAIL").unwrap_or(defaults.email),
            password: lookup("ADMIN_PASSWORD").unwrap_or(defaults.password),
            timeout,
        }
    }

    pub fn credentials(&self) -> LoginCredentials {
        LoginCredentials {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}
