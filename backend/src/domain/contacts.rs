//! Contacts: the demonstration resource served through the pipeline.
//!
//! Contacts are listed with keyset pagination ordered by `(created_at, id)`.
//! Deleting is idempotent from the client's point of view: once a contact is
//! gone every further delete yields the same `CONTACT_NOT_FOUND` record.

use std::num::NonZeroUsize;
use std::sync::Arc;

use actix_web::http::StatusCode;
use chrono::{DateTime, Utc};
use color_eyre::eyre::eyre;
use mockable::Clock;
use pagination::{CursorCodec, CursorKey, Page};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::ports::{ContactsRepository, ContactsRepositoryError, HandlerFn};
use super::validation::{ArrayRule, RequestContract, Schema, StringRule, ValidatedInput};
use super::{DomainCode, Endpoint, Failure, OperationalFailure, PaginationMode, Reply};

/// Ordering name embedded in contact cursors.
pub const CONTACTS_ORDERING: &str = "created_at";

/// Raised when a contact id does not resolve.
pub const CONTACT_NOT_FOUND: DomainCode =
    DomainCode::new("CONTACT_NOT_FOUND", StatusCode::NOT_FOUND);

/// Raised when an email address is already registered.
pub const EMAIL_TAKEN: DomainCode = DomainCode::new("EMAIL_TAKEN", StatusCode::CONFLICT);

/// Domain codes the contacts endpoints may raise.
pub const CONTACT_CODES: [DomainCode; 2] = [CONTACT_NOT_FOUND, EMAIL_TAKEN];

const MAX_NAME_LEN: usize = 120;
const MAX_TAGS: usize = 10;
const MAX_TAG_LEN: usize = 32;

/// Resume position for contact listings.
pub type ContactKey = CursorKey<DateTime<Utc>, Uuid>;

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    id: Uuid,
    name: String,
    email: String,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
}

impl Contact {
    /// Assemble a contact from stored parts.
    #[must_use]
    pub const fn new(
        id: Uuid,
        name: String,
        email: String,
        tags: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            tags,
            created_at,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Email address, unique across contacts.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Free-form labels.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        self.tags.as_slice()
    }

    /// Creation time; the primary sort key.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Position of this contact in the listing order.
    #[must_use]
    pub const fn key(&self) -> ContactKey {
        CursorKey::new(self.created_at, self.id)
    }
}

/// Validated create command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewContact {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Optional labels.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body schema for creating a contact.
#[must_use]
pub fn create_schema() -> Schema {
    Schema::new()
        .required("name", StringRule::new().min_len(1).max_len(MAX_NAME_LEN))
        .required("email", StringRule::new().email())
        .optional(
            "tags",
            ArrayRule::of(StringRule::new().min_len(1).max_len(MAX_TAG_LEN)).max_items(MAX_TAGS),
        )
}

fn id_schema() -> Schema {
    Schema::new().required("id", StringRule::new().uuid())
}

/// Application service behind the contacts endpoints.
pub struct ContactsService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    codec: CursorCodec,
}

impl<R> ContactsService<R>
where
    R: ContactsRepository + 'static,
{
    /// Build the service; `codec` mints and reads the listing cursors.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>, codec: CursorCodec) -> Self {
        Self { repo, clock, codec }
    }

    /// One page of contacts.
    ///
    /// # Errors
    /// Invalid cursors, storage failures and serialisation faults.
    pub async fn list(&self, input: ValidatedInput) -> Result<Reply, Failure> {
        let request = input
            .pagination()
            .ok_or_else(|| eyre!("contacts.list requires pagination parameters"))?;
        let after = request.resume_key::<DateTime<Utc>, Uuid>()?;
        let rows = self
            .repo
            .list(after, request.fetch_limit())
            .await
            .map_err(storage_failure)?;
        let limit: NonZeroUsize = request.limit();
        let page = Page::from_overfetch(rows, limit, &self.codec, Contact::key)
            .map_err(Failure::internal)?;
        Reply::list(page)
    }

    /// Create a contact.
    ///
    /// # Errors
    /// `EMAIL_TAKEN` when the address is already registered.
    pub async fn create(&self, input: ValidatedInput) -> Result<Reply, Failure> {
        let command: NewContact = input.body_as()?;
        let contact = Contact::new(
            Uuid::now_v7(),
            command.name,
            command.email,
            command.tags,
            self.clock.utc(),
        );
        self.repo
            .insert(contact.clone())
            .await
            .map_err(storage_failure)?;
        info!(contact_id = %contact.id(), "contact created");
        Reply::created(&contact)
    }

    /// Fetch one contact.
    ///
    /// # Errors
    /// `CONTACT_NOT_FOUND` when the id does not resolve.
    pub async fn get(&self, input: ValidatedInput) -> Result<Reply, Failure> {
        let id: Uuid = input.param_as("id")?;
        let contact = self
            .repo
            .find(id)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| not_found(id))?;
        Reply::item(&contact)
    }

    /// Delete one contact, replying with the removed record.
    ///
    /// # Errors
    /// `CONTACT_NOT_FOUND` when the id does not resolve, including on every
    /// repeat of a successful delete.
    pub async fn delete(&self, input: ValidatedInput) -> Result<Reply, Failure> {
        let id: Uuid = input.param_as("id")?;
        let removed = self
            .repo
            .delete(id)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| not_found(id))?;
        info!(contact_id = %id, "contact deleted");
        Reply::item(&removed)
    }
}

/// Endpoints served by [`ContactsService`].
#[derive(Debug, Clone)]
pub struct ContactEndpoints {
    /// `GET /contacts`.
    pub list: Endpoint,
    /// `POST /contacts`.
    pub create: Endpoint,
    /// `GET /contacts/{id}`.
    pub get: Endpoint,
    /// `DELETE /contacts/{id}`.
    pub delete: Endpoint,
}

impl ContactEndpoints {
    /// Declare the contacts endpoints around a shared service.
    pub fn new<R>(service: Arc<ContactsService<R>>) -> Self
    where
        R: ContactsRepository + 'static,
    {
        let listing = PaginationMode::cursor::<DateTime<Utc>, Uuid>(service.codec.clone());
        let list = Arc::clone(&service);
        let create = Arc::clone(&service);
        let get = Arc::clone(&service);
        let delete = service;
        Self {
            list: Endpoint::new(
                "contacts.list",
                RequestContract::new().paginated(listing),
                HandlerFn::new(move |input| {
                    let service = Arc::clone(&list);
                    async move { service.list(input).await }
                }),
            ),
            create: Endpoint::new(
                "contacts.create",
                RequestContract::new().body(create_schema()),
                HandlerFn::new(move |input| {
                    let service = Arc::clone(&create);
                    async move { service.create(input).await }
                }),
            ),
            get: Endpoint::new(
                "contacts.get",
                RequestContract::new().params(id_schema()),
                HandlerFn::new(move |input| {
                    let service = Arc::clone(&get);
                    async move { service.get(input).await }
                }),
            ),
            delete: Endpoint::new(
                "contacts.delete",
                RequestContract::new().params(id_schema()),
                HandlerFn::new(move |input| {
                    let service = Arc::clone(&delete);
                    async move { service.delete(input).await }
                }),
            ),
        }
    }
}

fn not_found(id: Uuid) -> Failure {
    OperationalFailure::domain(CONTACT_NOT_FOUND, format!("Contact {id} does not exist")).into()
}

fn storage_failure(error: ContactsRepositoryError) -> Failure {
    match error {
        ContactsRepositoryError::DuplicateEmail { .. } => {
            OperationalFailure::domain(EMAIL_TAKEN, "Email address is already registered").into()
        }
        ContactsRepositoryError::Unavailable { .. } => Failure::internal(error),
    }
}
