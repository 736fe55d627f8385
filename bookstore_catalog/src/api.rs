use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Identifier of a book, assigned by the store when the book is added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(ObjectId);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid book_id format: {0:?}")]
pub struct InvalidBookId(pub String);

impl BookId {
    /// Generates a fresh id, used by stores that do not assign ids on their own
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for BookId {
    fn from(value: ObjectId) -> Self {
        Self(value)
    }
}

impl FromStr for BookId {
    type Err = InvalidBookId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| InvalidBookId(s.to_string()))
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
/// Struct representing a book as accepted on create and update and returned by the listing
pub struct BookModel {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
/// Single book together with its identifier in string form
pub struct BookResponse {
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub price: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Apiv2Schema)]
/// Optional filters accepted by the books listing, all of them are combined together
pub struct BookQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
pub struct CreateBookResponse {
    pub message: String,
    pub book_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
