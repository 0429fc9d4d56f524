//! Parcel tracking storage core.
//!
//! A single-table SQLite store for postal parcels plus the small use-case
//! layer on top of it. Address changes and deletion are only allowed while a
//! parcel is `registered`.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::parcel::{
    ClientId, Parcel, ParcelNumber, ParcelStatus, STATUS_DELIVERED, STATUS_REGISTERED,
    STATUS_SENT,
};
pub use repo::parcel_repo::{ParcelRepository, SqliteParcelStore, StoreError, StoreResult};
pub use service::parcel_service::{ParcelService, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
