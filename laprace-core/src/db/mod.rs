//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - Each logical operation owns one pooled connection for its duration
//! - Rely on DB constraints and classify the failure, no check-then-insert
//! - Multi-row writes run in one transaction, committed only on full success
//! - Point mutations must change exactly one row

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{Connector, RacePool, ResourcePool, SqliteConnector, DEFAULT_POOL_CAPACITY};
pub use repos::*;
