//! Domain ports and supporting types for the hexagonal boundary.

mod contacts_repository;
mod handler;
mod observability;

#[cfg(test)]
pub use contacts_repository::MockContactsRepository;
pub use contacts_repository::{ContactsRepository, ContactsRepositoryError};
#[cfg(test)]
pub use handler::MockHandler;
pub use handler::{Handler, HandlerFn};
#[cfg(test)]
pub use observability::MockObservabilitySink;
pub use observability::{FailureContext, FailureSite, ObservabilitySink};
