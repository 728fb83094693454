//! Stand Capacity Planner backend.
//!
//! A JSON API over PostgreSQL exposing health, stand and capacity-plan
//! listings, plus a status client that checks the API's health once and
//! renders the result.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod frontend;
pub mod http;
pub mod middleware;
pub mod model;
pub mod routes;
pub mod state;
pub mod templates;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
