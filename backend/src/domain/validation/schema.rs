//! Declarative request schemas.
//!
//! A [`Schema`] lists fields in the order their errors are reported. Each
//! field carries a [`Rule`] describing its type and constraints. Checking a
//! value yields either a cleaned copy (unknown fields removed) or field
//! errors with dot/bracket paths.

use chrono::DateTime;
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::{ValidateEmail, ValidateUrl};

use crate::domain::error::FieldError;

pub(crate) const REQUIRED: &str = "Required";
pub(crate) const UNKNOWN_FIELD: &str = "Unknown field";

/// Recognised string formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// An email address.
    Email,
    /// A hyphenated UUID.
    Uuid,
    /// An absolute URL.
    Url,
    /// An RFC 3339 timestamp.
    Timestamp,
}

impl Format {
    fn accepts(self, value: &str) -> bool {
        match self {
            Self::Email => value.validate_email(),
            Self::Uuid => Uuid::parse_str(value).is_ok(),
            Self::Url => value.validate_url(),
            Self::Timestamp => DateTime::parse_from_rfc3339(value).is_ok(),
        }
    }

    const fn message(self) -> &'static str {
        match self {
            Self::Email => "Invalid email format",
            Self::Uuid => "Invalid UUID format",
            Self::Url => "Invalid URL format",
            Self::Timestamp => "Invalid RFC 3339 timestamp",
        }
    }
}

/// Constraints for a string field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringRule {
    format: Option<Format>,
    min_len: Option<usize>,
    max_len: Option<usize>,
    one_of: Option<Vec<String>>,
}

impl StringRule {
    /// Any string.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a specific format.
    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Shorthand for [`Format::Email`].
    #[must_use]
    pub fn email(self) -> Self {
        self.format(Format::Email)
    }

    /// Shorthand for [`Format::Uuid`].
    #[must_use]
    pub fn uuid(self) -> Self {
        self.format(Format::Uuid)
    }

    /// Minimum length in characters.
    #[must_use]
    pub fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    /// Maximum length in characters.
    #[must_use]
    pub fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    /// Restrict to an enumeration of values.
    #[must_use]
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.one_of = Some(values.into_iter().map(Into::into).collect());
        self
    }

    fn check(&self, value: &str) -> Option<String> {
        let len = value.chars().count();
        if let Some(min) = self.min_len.filter(|min| len < *min) {
            return Some(format!("Must be at least {min} characters"));
        }
        if let Some(max) = self.max_len.filter(|max| len > *max) {
            return Some(format!("Must be at most {max} characters"));
        }
        if let Some(allowed) = &self.one_of {
            if !allowed.iter().any(|candidate| candidate == value) {
                return Some(format!("Must be one of: {}", allowed.join(", ")));
            }
        }
        match self.format {
            Some(format) if !format.accepts(value) => Some(format.message().to_owned()),
            _ => None,
        }
    }
}

/// Bounds for an integer field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegerRule {
    min: Option<i64>,
    max: Option<i64>,
}

impl IntegerRule {
    /// Any integer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound.
    #[must_use]
    pub const fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    /// Inclusive range.
    #[must_use]
    pub const fn range(self, min: i64, max: i64) -> Self {
        self.min(min).max(max)
    }

    fn check(self, value: i64) -> Option<String> {
        if let Some(min) = self.min.filter(|min| value < *min) {
            return Some(format!("Must be at least {min}"));
        }
        self.max
            .filter(|max| value > *max)
            .map(|max| format!("Must be at most {max}"))
    }
}

/// Bounds for a floating-point field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumberRule {
    min: Option<f64>,
    max: Option<f64>,
}

impl NumberRule {
    /// Any finite number.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inclusive lower bound.
    #[must_use]
    pub const fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound.
    #[must_use]
    pub const fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    fn check(self, value: f64) -> Option<String> {
        if let Some(min) = self.min.filter(|min| value < *min) {
            return Some(format!("Must be at least {min}"));
        }
        self.max
            .filter(|max| value > *max)
            .map(|max| format!("Must be at most {max}"))
    }
}

/// Constraints for an array field.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayRule {
    items: Box<Rule>,
    min_items: Option<usize>,
    max_items: Option<usize>,
}

impl ArrayRule {
    /// Array whose elements each satisfy `items`.
    pub fn of(items: impl Into<Rule>) -> Self {
        Self {
            items: Box::new(items.into()),
            min_items: None,
            max_items: None,
        }
    }

    /// Minimum number of elements.
    #[must_use]
    pub const fn min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    /// Maximum number of elements.
    #[must_use]
    pub const fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }
}

/// Type and constraints of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// A JSON string.
    String(StringRule),
    /// A JSON number without a fractional part.
    Integer(IntegerRule),
    /// Any JSON number.
    Number(NumberRule),
    /// A JSON boolean.
    Boolean,
    /// A JSON array.
    Array(ArrayRule),
    /// A nested JSON object.
    Object(Schema),
}

impl From<StringRule> for Rule {
    fn from(rule: StringRule) -> Self {
        Self::String(rule)
    }
}

impl From<IntegerRule> for Rule {
    fn from(rule: IntegerRule) -> Self {
        Self::Integer(rule)
    }
}

impl From<NumberRule> for Rule {
    fn from(rule: NumberRule) -> Self {
        Self::Number(rule)
    }
}

impl From<ArrayRule> for Rule {
    fn from(rule: ArrayRule) -> Self {
        Self::Array(rule)
    }
}

impl From<Schema> for Rule {
    fn from(schema: Schema) -> Self {
        Self::Object(schema)
    }
}

impl Rule {
    /// Check `value` at `path`, returning the cleaned value when it passes.
    fn check(&self, path: &str, value: &Value, errors: &mut Vec<FieldError>) -> Option<Value> {
        let mismatch = |expected: &str, errors: &mut Vec<FieldError>| {
            errors.push(FieldError::new(path, format!("Expected {expected}")));
            None
        };
        match (self, value) {
            (Self::String(rule), Value::String(text)) => {
                report(path, rule.check(text), value, errors)
            }
            (Self::String(_), _) => mismatch("a string", errors),
            (Self::Integer(rule), Value::Number(number)) => match number.as_i64() {
                Some(int) => report(path, rule.check(int), value, errors),
                None => mismatch("an integer", errors),
            },
            (Self::Integer(_), _) => mismatch("an integer", errors),
            (Self::Number(rule), Value::Number(number)) => match number.as_f64() {
                Some(float) => report(path, rule.check(float), value, errors),
                None => mismatch("a number", errors),
            },
            (Self::Number(_), _) => mismatch("a number", errors),
            (Self::Boolean, Value::Bool(_)) => Some(value.clone()),
            (Self::Boolean, _) => mismatch("a boolean", errors),
            (Self::Array(rule), Value::Array(elements)) => check_array(rule, path, elements, errors),
            (Self::Array(_), _) => mismatch("an array", errors),
            (Self::Object(schema), Value::Object(map)) => schema
                .check_object(path, map, schema.strict, errors)
                .map(Value::Object),
            (Self::Object(_), _) => mismatch("an object", errors),
        }
    }
}

fn report(
    path: &str,
    problem: Option<String>,
    value: &Value,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    match problem {
        Some(message) => {
            errors.push(FieldError::new(path, message));
            None
        }
        None => Some(value.clone()),
    }
}

fn check_array(
    rule: &ArrayRule,
    path: &str,
    elements: &[Value],
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    if let Some(min) = rule.min_items.filter(|min| elements.len() < *min) {
        errors.push(FieldError::new(
            path,
            format!("Must contain at least {min} items"),
        ));
        return None;
    }
    if let Some(max) = rule.max_items.filter(|max| elements.len() > *max) {
        errors.push(FieldError::new(
            path,
            format!("Must contain at most {max} items"),
        ));
        return None;
    }
    let before = errors.len();
    let cleaned: Vec<Value> = elements
        .iter()
        .enumerate()
        .filter_map(|(index, element)| {
            rule.items
                .check(&format!("{path}[{index}]"), element, errors)
        })
        .collect();
    (errors.len() == before).then_some(Value::Array(cleaned))
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_owned()
    } else {
        format!("{parent}.{name}")
    }
}

/// Object schema: ordered fields plus the unknown-field policy.
///
/// # Examples
/// ```
/// use api_protocol::domain::validation::{IntegerRule, Schema, StringRule};
///
/// let schema = Schema::new()
///     .required("email", StringRule::new().email())
///     .optional("age", IntegerRule::new().range(0, 150));
/// assert_eq!(schema.field_names().collect::<Vec<_>>(), ["email", "age"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    strict: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct FieldSpec {
    name: String,
    rule: Rule,
    required: bool,
}

impl Schema {
    /// Empty permissive schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field that must be present and non-null.
    #[must_use]
    pub fn required(mut self, name: impl Into<String>, rule: impl Into<Rule>) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            rule: rule.into(),
            required: true,
        });
        self
    }

    /// Add a field that may be absent or null.
    #[must_use]
    pub fn optional(mut self, name: impl Into<String>, rule: impl Into<Rule>) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            rule: rule.into(),
            required: false,
        });
        self
    }

    /// Reject unknown fields regardless of the gate policy.
    #[must_use]
    pub const fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Whether the schema itself declares strictness.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    /// Check an object, collecting errors in schema order followed by any
    /// rejected unknown fields.
    pub(crate) fn check_object(
        &self,
        path: &str,
        input: &Map<String, Value>,
        reject_unknown: bool,
        errors: &mut Vec<FieldError>,
    ) -> Option<Map<String, Value>> {
        let before = errors.len();
        let mut cleaned = Map::new();
        for field in &self.fields {
            let field_path = join(path, &field.name);
            match input.get(&field.name) {
                None | Some(Value::Null) if field.required => {
                    errors.push(FieldError::new(field_path, REQUIRED));
                }
                None | Some(Value::Null) => {}
                Some(value) => {
                    if let Some(valid) = field.rule.check(&field_path, value, errors) {
                        cleaned.insert(field.name.clone(), valid);
                    }
                }
            }
        }
        if reject_unknown || self.strict {
            for key in input.keys() {
                if !self.fields.iter().any(|field| &field.name == key) {
                    errors.push(FieldError::new(join(path, key), UNKNOWN_FIELD));
                }
            }
        }
        (errors.len() == before).then_some(cleaned)
    }
}
