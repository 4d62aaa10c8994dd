//! In-process contact store.
//!
//! Rows are kept in a `BTreeMap` keyed by `(created_at, id)`, which is the
//! listing order, so keyset reads are a single range scan. Email addresses
//! are unique, compared case-insensitively.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::contacts::{Contact, ContactKey};
use crate::domain::ports::{ContactsRepository, ContactsRepositoryError};

type RowKey = (DateTime<Utc>, Uuid);

#[derive(Debug, Default)]
struct Rows {
    ordered: BTreeMap<RowKey, Contact>,
    by_id: HashMap<Uuid, DateTime<Utc>>,
    emails: HashMap<String, Uuid>,
}

/// Contact repository held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryContactsRepository {
    rows: RwLock<Rows>,
}

impl InMemoryContactsRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored contacts.
    pub async fn len(&self) -> usize {
        self.rows.read().await.ordered.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.ordered.is_empty()
    }
}

fn email_key(email: &str) -> String {
    email.to_lowercase()
}

#[async_trait]
impl ContactsRepository for InMemoryContactsRepository {
    async fn list(
        &self,
        after: Option<ContactKey>,
        limit: usize,
    ) -> Result<Vec<Contact>, ContactsRepositoryError> {
        let rows = self.rows.read().await;
        let lower = match after {
            Some(key) => Bound::Excluded((*key.sort(), *key.tie_breaker())),
            None => Bound::Unbounded,
        };
        Ok(rows
            .ordered
            .range((lower, Bound::Unbounded))
            .take(limit)
            .map(|(_, contact)| contact.clone())
            .collect())
    }

    async fn insert(&self, contact: Contact) -> Result<(), ContactsRepositoryError> {
        let mut rows = self.rows.write().await;
        let email = email_key(contact.email());
        if rows.emails.contains_key(&email) {
            return Err(ContactsRepositoryError::DuplicateEmail {
                email: contact.email().to_owned(),
            });
        }
        rows.emails.insert(email, contact.id());
        rows.by_id.insert(contact.id(), contact.created_at());
        rows.ordered
            .insert((contact.created_at(), contact.id()), contact);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Contact>, ContactsRepositoryError> {
        let rows = self.rows.read().await;
        Ok(rows
            .by_id
            .get(&id)
            .and_then(|created_at| rows.ordered.get(&(*created_at, id)))
            .cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Contact>, ContactsRepositoryError> {
        let mut rows = self.rows.write().await;
        let Some(created_at) = rows.by_id.remove(&id) else {
            return Ok(None);
        };
        let removed = rows.ordered.remove(&(created_at, id));
        if let Some(contact) = &removed {
            rows.emails.remove(&email_key(contact.email()));
        }
        Ok(removed)
    }
}
