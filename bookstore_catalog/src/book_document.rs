use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::api::{BookId, BookModel, BookResponse};

/// Book as stored in the collection, with the native `_id` attached
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub price: f64,
}

impl BookDocument {
    pub fn new(book_id: BookId, book: BookModel) -> Self {
        Self {
            id: book_id.as_object_id(),
            title: book.title,
            author: book.author,
            genre: book.genre,
            price: book.price,
        }
    }

    pub fn book_id(&self) -> BookId {
        BookId::from(self.id)
    }

    /// Drops the identifier, this is the shape returned by the listing
    pub fn into_model(self) -> BookModel {
        BookModel {
            title: self.title,
            author: self.author,
            genre: self.genre,
            price: self.price,
        }
    }
}

impl From<BookDocument> for BookResponse {
    fn from(document: BookDocument) -> Self {
        Self {
            id: document.book_id().to_string(),
            title: document.title,
            author: document.author,
            genre: document.genre,
            price: document.price,
        }
    }
}
