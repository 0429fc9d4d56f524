//! Parcel tracking use-cases.
//!
//! # Responsibility
//! - Register parcels with a fresh `registered` status and timestamp.
//! - Advance parcels along `registered -> sent -> delivered`.
//! - Forward address changes and deletion to the repository rules.
//!
//! # Invariants
//! - The service never bypasses repository status rules.
//! - `next_status` leaves delivered parcels untouched.

use crate::model::parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
use crate::repo::parcel_repo::{ParcelRepository, StoreError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for parcel use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Persistence-layer failure, including the deletion status rule.
    Store(StoreError),
    /// Stored status is outside the lifecycle `next_status` understands.
    UnknownStatus {
        number: ParcelNumber,
        status: String,
    },
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::UnknownStatus { number, status } => {
                write!(f, "parcel {number} has unknown status `{status}`")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::UnknownStatus { .. } => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Use-case wrapper over a parcel repository.
pub struct ParcelService<R: ParcelRepository> {
    repo: R,
}

impl<R: ParcelRepository> ParcelService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new parcel for `client` and returns it with its number set.
    pub fn register(&self, client: ClientId, address: impl Into<String>) -> ServiceResult<Parcel> {
        let mut parcel = Parcel::new(client, address);
        parcel.number = self.repo.add(&parcel)?;

        info!(
            "event=parcel_register module=service status=ok number={} client={}",
            parcel.number, parcel.client
        );
        Ok(parcel)
    }

    /// Lists all parcels of `client`.
    pub fn client_parcels(&self, client: ClientId) -> ServiceResult<Vec<Parcel>> {
        Ok(self.repo.get_by_client(client)?)
    }

    /// Moves the parcel one step forward in its lifecycle.
    ///
    /// Returns the resulting status. Delivered parcels are not written again.
    pub fn next_status(&self, number: ParcelNumber) -> ServiceResult<ParcelStatus> {
        let parcel = self.repo.get(number)?;
        let current = parcel
            .known_status()
            .ok_or_else(|| ServiceError::UnknownStatus {
                number,
                status: parcel.status.clone(),
            })?;

        let next = current.next();
        if next == current {
            return Ok(current);
        }

        self.repo.set_status(number, next.as_str())?;
        info!(
            "event=parcel_next_status module=service status=ok number={} from={} to={}",
            number,
            current.as_str(),
            next.as_str()
        );
        Ok(next)
    }

    /// Changes the delivery address; a no-op unless the parcel is registered.
    pub fn change_address(&self, number: ParcelNumber, address: &str) -> ServiceResult<()> {
        Ok(self.repo.set_address(number, address)?)
    }

    /// Deletes a registered parcel.
    pub fn delete(&self, number: ParcelNumber) -> ServiceResult<()> {
        self.repo.delete(number)?;
        info!("event=parcel_delete module=service status=ok number={number}");
        Ok(())
    }
}
