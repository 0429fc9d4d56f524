//! Repository layer for parcel persistence.
//!
//! # Responsibility
//! - Define the data access contract used by services.
//! - Keep SQL inside the SQLite implementation.

pub mod parcel_repo;
