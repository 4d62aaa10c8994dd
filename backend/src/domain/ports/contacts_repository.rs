//! Port abstraction for contact storage adapters and their errors.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::contacts::{Contact, ContactKey};

/// Storage errors raised by contact repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactsRepositoryError {
    /// Another contact already uses this email address.
    #[error("email address {email} is already registered")]
    DuplicateEmail {
        /// Conflicting address.
        email: String,
    },
    /// The backing store could not be reached.
    #[error("contact store unavailable: {message}")]
    Unavailable {
        /// Adapter-supplied detail.
        message: String,
    },
}

/// Port for reading and writing contacts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactsRepository: Send + Sync {
    /// Contacts ordered by `(created_at, id)`, strictly after `after`, at
    /// most `limit` rows.
    async fn list(
        &self,
        after: Option<ContactKey>,
        limit: usize,
    ) -> Result<Vec<Contact>, ContactsRepositoryError>;

    /// Store a new contact.
    async fn insert(&self, contact: Contact) -> Result<(), ContactsRepositoryError>;

    /// Fetch a contact by identifier.
    async fn find(&self, id: Uuid) -> Result<Option<Contact>, ContactsRepositoryError>;

    /// Remove a contact, returning it; `None` when it did not exist.
    async fn delete(&self, id: Uuid) -> Result<Option<Contact>, ContactsRepositoryError>;
}
