//! Handler success values.

use actix_web::http::StatusCode;
use color_eyre::eyre::eyre;
use pagination::Page;
use serde::Serialize;
use serde_json::Value;

use super::envelope::Envelope;
use super::failure::Failure;
use super::trace_id::TraceId;

/// What a handler produced on success.
///
/// Items are stored as JSON objects; the typed constructors reject values
/// that do not serialise to one, since envelopes only ever carry objects.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// An existing resource, `200 OK`.
    Item(Value),
    /// A newly created resource, `201 Created`.
    Created(Value),
    /// One page of resources, `200 OK`.
    List(Page<Value>),
}

impl Reply {
    /// Reply with a single resource.
    ///
    /// # Errors
    /// Returns an internal fault when `item` does not serialise to a JSON
    /// object.
    pub fn item<T: Serialize>(item: &T) -> Result<Self, Failure> {
        to_object(item).map(Self::Item)
    }

    /// Reply with a created resource.
    ///
    /// # Errors
    /// Returns an internal fault when `item` does not serialise to a JSON
    /// object.
    pub fn created<T: Serialize>(item: &T) -> Result<Self, Failure> {
        to_object(item).map(Self::Created)
    }

    /// Reply with one page.
    ///
    /// # Errors
    /// Returns an internal fault when any item does not serialise to a JSON
    /// object.
    pub fn list<T: Serialize>(page: Page<T>) -> Result<Self, Failure> {
        page.try_map(|item| to_object(&item)).map(Self::List)
    }

    /// Success status for this reply.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Created(_) => StatusCode::CREATED,
            Self::Item(_) | Self::List(_) => StatusCode::OK,
        }
    }

    /// Build the success envelope.
    #[must_use]
    pub fn into_envelope(self, trace_id: TraceId) -> Envelope {
        match self {
            Self::Item(item) | Self::Created(item) => Envelope::item(trace_id, item),
            Self::List(page) => Envelope::list(trace_id, page),
        }
    }
}

fn to_object<T: Serialize>(item: &T) -> Result<Value, Failure> {
    match serde_json::to_value(item).map_err(Failure::internal)? {
        object @ Value::Object(_) => Ok(object),
        other => Err(Failure::from(eyre!(
            "reply items must serialise to JSON objects, got {}",
            kind_of(&other)
        ))),
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[derive(Serialize)]
    struct Note {
        id: u32,
    }

    #[rstest]
    fn created_replies_use_201() {
        let reply = Reply::created(&Note { id: 1 }).expect("object");
        assert_eq!(reply.status(), StatusCode::CREATED);
        assert_eq!(reply, Reply::Created(json!({"id": 1})));
    }

    #[rstest]
    #[case(json!(5))]
    #[case(json!("text"))]
    #[case(json!([1, 2]))]
    #[case(Value::Null)]
    fn non_object_items_are_internal_faults(#[case] value: Value) {
        let failure = Reply::item(&value).expect_err("not an object");
        assert!(failure.is_unknown());
    }

    #[rstest]
    fn list_replies_map_every_item() {
        let page = Page::last(vec![Note { id: 1 }, Note { id: 2 }]);
        let Reply::List(page) = Reply::list(page).expect("objects") else {
            panic!("list reply");
        };
        assert_eq!(page.items(), &[json!({"id": 1}), json!({"id": 2})]);
        assert!(page.is_last());
    }
}
