//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the pipeline and the declared endpoints, and remain testable
//! without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::config::ProtocolConfig;
use crate::domain::ports::{ContactsRepository, ObservabilitySink};
use crate::domain::{
    CONTACT_CODES, CONTACTS_ORDERING, CatalogueError, ContactEndpoints, ContactsService,
    Pipeline,
};

/// Parameter object bundling the port implementations behind the routes.
pub struct HttpStatePorts<R> {
    /// Contact storage.
    pub contacts: Arc<R>,
    /// Time source for creation timestamps.
    pub clock: Arc<dyn Clock>,
    /// Receiver of every failure report.
    pub sink: Arc<dyn ObservabilitySink>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Debug, Clone)]
pub struct HttpState {
    /// Request pipeline shared by every route.
    pub pipeline: Arc<Pipeline>,
    /// Contact endpoint declarations.
    pub contacts: ContactEndpoints,
}

impl HttpState {
    /// Bundle a pipeline with the endpoints it serves.
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline>, contacts: ContactEndpoints) -> Self {
        Self { pipeline, contacts }
    }

    /// Wire the pipeline and contact endpoints from configuration and ports.
    ///
    /// # Errors
    /// Returns [`CatalogueError`] when the contact codes cannot be registered.
    pub fn build<R>(config: &ProtocolConfig, ports: HttpStatePorts<R>) -> Result<Self, CatalogueError>
    where
        R: ContactsRepository + 'static,
    {
        let HttpStatePorts {
            contacts,
            clock,
            sink,
        } = ports;
        let catalogue = config.catalogue().register_all(CONTACT_CODES)?;
        let pipeline = Pipeline::new(config, Arc::new(catalogue), sink);
        let codec = config.cursor_codec(CONTACTS_ORDERING);
        let service = Arc::new(ContactsService::new(contacts, clock, codec));
        Ok(Self::new(Arc::new(pipeline), ContactEndpoints::new(service)))
    }
}
