//! Repository implementations for database access
//!
//! Each repository borrows one connection for its lifetime and follows
//! these patterns:
//! - Rows changed by a point mutation are checked, anything but one is
//!   `NoRowsAffected`
//! - Constraint failures are classified, never pre-checked
//! - Multi-row writes use a transaction

pub mod laps;
pub mod race;
pub mod teams;

pub use laps::{derive_lap_times, LapRepo, DEFAULT_RECENT_LIMIT};
pub use race::RaceRepo;
pub use teams::TeamRepo;
