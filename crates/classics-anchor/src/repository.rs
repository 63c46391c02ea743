use classics_core::{Event, Vehicle};
use thiserror::Error;
use uuid::Uuid;

/// Failure persisting an entity.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Entity does not exist in the store.
    #[error("entity {0} not found")]
    NotFound(Uuid),
    /// I/O failure in the backing store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Entity could not be encoded for storage.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Other backend failure.
    #[error("{0}")]
    Other(String),
}

/// Persists vehicles.
pub trait VehicleRepository {
    /// Replaces the stored vehicle with `vehicle`.
    fn update_vehicle(&self, vehicle: &Vehicle) -> Result<(), RepositoryError>;
}

/// Persists events.
pub trait EventRepository {
    /// Replaces the stored event with `event`.
    fn update_event(&self, event: &Event) -> Result<(), RepositoryError>;
}

impl<T: VehicleRepository + ?Sized> VehicleRepository for &T {
    fn update_vehicle(&self, vehicle: &Vehicle) -> Result<(), RepositoryError> {
        (**self).update_vehicle(vehicle)
    }
}

impl<T: EventRepository + ?Sized> EventRepository for &T {
    fn update_event(&self, event: &Event) -> Result<(), RepositoryError> {
        (**self).update_event(event)
    }
}
