//! Parcel domain model.
//!
//! # Responsibility
//! - Define the canonical parcel record stored in the `parcel` table.
//! - Provide the well-known status values used by the parcel lifecycle.
//!
//! # Invariants
//! - `client` and `created_at` never change after creation.
//! - `address` may change, and the parcel may be deleted, only while
//!   `status == "registered"`. Status itself may change at any time.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Storage-assigned parcel identifier.
pub type ParcelNumber = i64;

/// Identifier of the client owning a parcel.
pub type ClientId = i64;

/// Status value every new parcel starts in.
pub const STATUS_REGISTERED: &str = "registered";
/// Status value after the parcel has been handed to delivery.
pub const STATUS_SENT: &str = "sent";
/// Status value once the parcel reached its address.
pub const STATUS_DELIVERED: &str = "delivered";

/// Well-known parcel lifecycle states.
///
/// Storage keeps status as free text; this enum only covers the values the
/// lifecycle transitions understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    /// Accepted, not yet shipped. Address changes and deletion are allowed.
    Registered,
    /// Shipped.
    Sent,
    /// Delivered. Terminal.
    Delivered,
}

impl ParcelStatus {
    /// Returns the stored text form of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Registered => STATUS_REGISTERED,
            Self::Sent => STATUS_SENT,
            Self::Delivered => STATUS_DELIVERED,
        }
    }

    /// Parses a stored status value. Returns `None` for anything outside the
    /// well-known set.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            STATUS_REGISTERED => Some(Self::Registered),
            STATUS_SENT => Some(Self::Sent),
            STATUS_DELIVERED => Some(Self::Delivered),
            _ => None,
        }
    }

    /// Returns the following lifecycle step. `Delivered` stays `Delivered`.
    pub fn next(self) -> Self {
        match self {
            Self::Registered => Self::Sent,
            Self::Sent | Self::Delivered => Self::Delivered,
        }
    }
}

/// One tracked shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    /// Primary key. Ignored on insert; populated on read.
    pub number: ParcelNumber,
    pub client: ClientId,
    /// Free-form status text, see [`ParcelStatus`] for the well-known values.
    pub status: String,
    pub address: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl Parcel {
    /// Creates an unsaved `registered` parcel stamped with the current UTC time.
    pub fn new(client: ClientId, address: impl Into<String>) -> Self {
        Self::with_created_at(client, address, now_rfc3339())
    }

    /// Creates an unsaved `registered` parcel with a caller-provided timestamp.
    ///
    /// Used by imports and tests where the creation time is known up front.
    /// The timestamp is stored as given.
    pub fn with_created_at(
        client: ClientId,
        address: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            number: 0,
            client,
            status: STATUS_REGISTERED.to_string(),
            address: address.into(),
            created_at: created_at.into(),
        }
    }

    /// Returns whether address changes and deletion are currently permitted.
    pub fn is_registered(&self) -> bool {
        self.status == STATUS_REGISTERED
    }

    /// Returns the well-known status, if the stored text is one.
    pub fn known_status(&self) -> Option<ParcelStatus> {
        ParcelStatus::parse(&self.status)
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
