//! Datastore access for the API routes.
//!
//! Handlers only see the [`Datastore`] trait: a reachability probe and a
//! listing query per table. The PostgreSQL implementation lives in
//! [`postgres`]; tests substitute their own.

mod postgres;

pub use postgres::PgStore;

use async_trait::async_trait;
use serde_json::Value;

/// Tables exposed as raw listings, each with the column it is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Stands,
    CapacityPlans,
}

impl Listing {
    pub fn table(self) -> &'static str {
        match self {
            Listing::Stands => "stands",
            Listing::CapacityPlans => "capacity_plans",
        }
    }

    /// Unique column used as the ascending sort key
    pub fn sort_key(self) -> &'static str {
        match self {
            Listing::Stands => "stand_id",
            Listing::CapacityPlans => "id",
        }
    }
}

/// Access to the relational store.
///
/// Every call issues exactly one query and is never retried.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Round-trip a no-op query to verify the database is reachable.
    async fn probe(&self) -> Result<(), DbError>;

    /// All rows of `listing`'s table as JSON objects, ascending by its sort key.
    async fn list(&self, listing: Listing) -> Result<Vec<Value>, DbError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// `message` is what the driver reported, without sqlx's category prefix
    #[error("{message}")]
    Query {
        message: String,
        #[source]
        source: sqlx::Error,
    },
}

impl From<sqlx::Error> for DbError {
    fn from(source: sqlx::Error) -> Self {
        let message = match &source {
            sqlx::Error::Database(db) => db.message().to_string(),
            sqlx::Error::Io(io) => io.to_string(),
            other => other.to_string(),
        };
        DbError::Query { message, source }
    }
}
