//! Domain model for tracked parcels.
//!
//! # Responsibility
//! - Define the single persisted record shape (`Parcel`).
//! - Name the well-known lifecycle statuses without closing the status domain.
//!
//! # Invariants
//! - `Parcel::number` is assigned by storage; `0` means "not stored yet".
//! - Status is an open string; only the service layer interprets it.

pub mod parcel;
