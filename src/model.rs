//! JSON bodies shared by the API and the status client.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const API_MESSAGE: &str = "Stand Capacity Planner API";

/// `database` value when the probe query succeeded
pub const DATABASE_CONNECTED: &str = "connected";

/// Body of `GET /api/health`, built fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    /// ISO-8601, UTC, millisecond precision
    pub timestamp: String,
    /// `connected` or `error: <driver message>`
    pub database: String,
}

impl HealthStatus {
    pub fn new(at: DateTime<Utc>, database: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            database: database.into(),
        }
    }

    pub fn connected(at: DateTime<Utc>) -> Self {
        Self::new(at, DATABASE_CONNECTED)
    }

    pub fn database_error(at: DateTime<Utc>, message: &str) -> Self {
        Self::new(at, format!("error: {}", message))
    }

    pub fn is_database_connected(&self) -> bool {
        self.database == DATABASE_CONNECTED
    }
}

/// Body of `GET /api`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDescriptor {
    pub message: String,
    pub version: String,
    pub endpoints: Endpoints,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub health: String,
    pub stands: String,
    pub capacity: String,
}

impl ApiDescriptor {
    pub fn current() -> Self {
        Self {
            message: API_MESSAGE.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            endpoints: Endpoints {
                health: "/api/health".to_string(),
                stands: "/api/stands".to_string(),
                capacity: "/api/capacity".to_string(),
            },
        }
    }
}

/// Error envelope for every non-2xx JSON response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
