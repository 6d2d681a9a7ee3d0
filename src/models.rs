use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Employer {
    pub id: String,
    pub archived: bool,
    pub archived_at: Option<i64>, // epoch millis
}

impl Employer {
    pub fn archived_at_utc(&self) -> Option<DateTime<Utc>> {
        self.archived_at
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}
