//! Inbound request validation.
//!
//! Endpoints describe what they accept with a [`RequestContract`] built from
//! [`Schema`]s. The [`ValidationGate`] checks a raw request against the
//! contract before the handler is invoked; any failure short-circuits the
//! pipeline with a [`ValidationFailure`](crate::domain::ValidationFailure)
//! listing every offending field in schema order.

mod gate;
mod schema;

pub use gate::{RequestContract, ValidatedInput, ValidationGate};
pub use schema::{ArrayRule, Format, IntegerRule, NumberRule, Rule, Schema, StringRule};

#[cfg(test)]
mod tests;
