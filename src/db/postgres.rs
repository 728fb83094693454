//! PostgreSQL datastore backed by a sqlx connection pool.
//!
//! The pool connects lazily: the process starts and serves `/api/health`
//! even while the database is down, and each query acquires a connection
//! on demand. Pool limits and timeouts default to sqlx's own values unless
//! set in `[database]`.
//!
//! sqlx retries a refused connect inside `acquire` until the acquire timeout
//! runs out and then reports only `PoolTimedOut`. When the pool holds no
//! connection at all, the store therefore opens one directly first, so an
//! unreachable database fails on the first attempt with the driver's error.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{Connection, Postgres};
use tracing::instrument;

use super::{Datastore, DbError, Listing};
use crate::config::DatabaseConfig;

const PROBE_SQL: &str = "SELECT NOW()";

/// Rows are aggregated server-side into one JSON array so column types never
/// need to be known here. An empty table yields `[]` rather than NULL.
const STANDS_SQL: &str =
    "SELECT COALESCE(json_agg(t ORDER BY t.stand_id), '[]'::json) FROM stands AS t";
const CAPACITY_PLANS_SQL: &str =
    "SELECT COALESCE(json_agg(t ORDER BY t.id), '[]'::json) FROM capacity_plans AS t";

fn listing_sql(listing: Listing) -> &'static str {
    match listing {
        Listing::Stands => STANDS_SQL,
        Listing::CapacityPlans => CAPACITY_PLANS_SQL,
    }
}

/// Process-wide pool handle. Cloning shares the same pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    connect_options: PgConnectOptions,
}

impl PgStore {
    /// Build the pool without opening a connection.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let connect_options = connect_options(config);
        let pool = pool_options(config).connect_lazy_with(connect_options.clone());
        Self {
            pool,
            connect_options,
        }
    }

    /// Check out a connection without entering the pool's connect retry loop.
    ///
    /// An idle connection is used as is. An empty pool is preceded by one
    /// direct connect whose error, if any, is returned unchanged.
    async fn acquire(&self) -> Result<PoolConnection<Postgres>, DbError> {
        if let Some(conn) = self.pool.try_acquire() {
            return Ok(conn);
        }
        if self.pool.size() == 0 {
            let conn = PgConnection::connect_with(&self.connect_options).await?;
            if let Err(e) = conn.close().await {
                tracing::debug!(error = %e, "Closing reachability connection failed");
            }
        }
        Ok(self.pool.acquire().await?)
    }

    /// Close every pooled connection; waits for checked-out ones to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.name)
        .username(&config.user)
        .password(&config.password)
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    let mut options = PgPoolOptions::new();
    if let Some(max) = config.max_connections {
        options = options.max_connections(max);
    }
    if let Some(min) = config.min_connections {
        options = options.min_connections(min);
    }
    if let Some(secs) = config.acquire_timeout_seconds {
        options = options.acquire_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = config.idle_timeout_seconds {
        options = options.idle_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = config.max_lifetime_seconds {
        options = options.max_lifetime(Duration::from_secs(secs));
    }
    options
}

#[async_trait]
impl Datastore for PgStore {
    #[instrument(name = "db::probe", skip(self))]
    async fn probe(&self) -> Result<(), DbError> {
        let mut conn = self.acquire().await?;
        let now: DateTime<Utc> = sqlx::query_scalar(PROBE_SQL).fetch_one(&mut *conn).await?;
        tracing::debug!(database_time = %now, "Database probe succeeded");
        Ok(())
    }

    #[instrument(name = "db::list", skip(self), fields(table = listing.table()))]
    async fn list(&self, listing: Listing) -> Result<Vec<Value>, DbError> {
        let mut conn = self.acquire().await?;
        let Json(rows): Json<Vec<Value>> = sqlx::query_scalar(listing_sql(listing))
            .fetch_one(&mut *conn)
            .await?;
        tracing::debug!(rows = rows.len(), "Listing fetched");
        Ok(rows)
    }
}
