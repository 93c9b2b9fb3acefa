//! Shape checks applied to named fields of response bodies.

use crate::error::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref TIMESTAMP: Regex =
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z$").unwrap();
}

/// Expected shape of a field's value.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FieldRule {
    Integer,
    /// `YYYY-MM-DDThh:mm:ss.sssZ`
    Timestamp,
    NonEmptyString,
    Boolean,
    /// Only presence is required.
    Present,
}

impl FieldRule {
    pub fn for_field(field: &str) -> Self {
        match field {
            "pages" => FieldRule::Integer,
            "publish_date" | "created_date" | "expires" => FieldRule::Timestamp,
            "isbn" | "title" | "subTitle" | "author" | "publisher" | "description" | "website"
            | "token" => FieldRule::NonEmptyString,
            "isActive" => FieldRule::Boolean,
            _ => FieldRule::Present,
        }
    }

    pub fn check(self, field: &str, value: &Value) -> Result<()> {
        let valid = match self {
            FieldRule::Integer => value.is_i64() || value.is_u64(),
            FieldRule::Timestamp => value.as_str().map_or(false, |s| TIMESTAMP.is_match(s)),
            FieldRule::NonEmptyString => value.as_str().map_or(false, |s| !s.is_empty()),
            FieldRule::Boolean => value.is_boolean(),
            FieldRule::Present => true,
        };

        if valid {
            Ok(())
        } else {
            Err(Error::assertion(format!(
                "field '{}' expected {:?}, got {}",
                field, self, value
            )))
        }
    }
}

/// Whether an empty `books` array is acceptable.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Collection {
    MayBeEmpty,
    NonEmpty,
}

/// Require `field` on `object` and validate it against its [`FieldRule`].
pub fn check_field<'a>(object: &'a Value, field: &str) -> Result<&'a Value> {
    let value = object.get(field).ok_or_else(|| {
        Error::assertion(format!("expected {} to contain key '{}'", object, field))
    })?;
    FieldRule::for_field(field).check(field, value)?;
    Ok(value)
}

/// The `books` array of a response body.
pub fn books(body: &Value) -> Result<&Vec<Value>> {
    body.get("books")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::assertion(format!("expected a 'books' array in {}", body)))
}

/// Like [`books`], but an empty collection is an assertion failure.
pub fn require_books(body: &Value) -> Result<&Vec<Value>> {
    let books = books(body)?;
    if books.is_empty() {
        return Err(Error::assertion("expected at least one book, got none"));
    }
    Ok(books)
}

/// Check `field` on every book. With [`Collection::MayBeEmpty`] an empty list passes.
pub fn check_each_book(body: &Value, field: &str, collection: Collection) -> Result<()> {
    let books = match collection {
        Collection::MayBeEmpty => books(body)?,
        Collection::NonEmpty => require_books(body)?,
    };

    books
        .iter()
        .try_for_each(|book| check_field(book, field).map(|_| ()))
}

pub fn book_isbns(body: &Value) -> Result<Vec<&str>> {
    Ok(books(body)?
        .iter()
        .filter_map(|book| book.get("isbn").and_then(Value::as_str))
        .collect())
}
