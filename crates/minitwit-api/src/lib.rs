pub mod error;
pub mod follows;
pub mod latest;
pub mod messages;
pub mod metrics;
pub mod middleware;
pub mod pagination;
pub mod register;
pub mod routes;
pub mod state;

mod db;
mod json;
