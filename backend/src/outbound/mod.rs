//! Outbound adapters implementing domain ports.
//!
//! - **observability**: writes failure reports to `tracing`
//! - **memory_contacts**: in-process contact storage
//!
//! Adapters are thin translators between domain types and their backing
//! mechanism. They contain no business logic.

pub mod memory_contacts;
pub mod observability;

pub use memory_contacts::InMemoryContactsRepository;
pub use observability::TracingSink;
